use super::figure::Figure;
use crate::config::{PlotlyJs, PLOTLY_CDN_URL};
use crate::error::Result;
use serde_json::json;
use std::path::Path;

const DIV_ID: &str = "dashboard";

/// Render a standalone page drawing `figure` with Plotly.
pub fn render_html(figure: &Figure, plotly: &PlotlyJs) -> Result<String> {
    let script = match plotly {
        PlotlyJs::Cdn => format!(
            r#"<script src="{}" charset="utf-8"></script>"#,
            PLOTLY_CDN_URL
        ),
        PlotlyJs::Inline(path) => {
            let bundle = std::fs::read_to_string(path)?;
            format!(r#"<script type="text/javascript">{}</script>"#, bundle)
        }
    };

    let data = script_safe(&serde_json::to_string(&figure.data)?);
    let layout = script_safe(&serde_json::to_string(&figure.layout)?);
    let config = json!({ "displayModeBar": true, "displaylogo": false, "responsive": true });

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8" /><title>{title}</title></head>
<body>
    <div>
        {script}
        <div id="{id}" class="plotly-graph-div" style="height:{height}px; width:100%;"></div>
        <script type="text/javascript">
            Plotly.newPlot("{id}", {data}, {layout}, {config});
        </script>
    </div>
</body>
</html>
"#,
        title = html_escape(&figure.layout.title.text),
        script = script,
        id = DIV_ID,
        height = figure.layout.height,
        data = data,
        layout = layout,
        config = config,
    ))
}

/// Write the page, creating parent directories as needed.
pub fn write_html(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

/// Keep embedded JSON from closing the surrounding script element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
