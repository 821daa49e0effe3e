//! Document export: standalone HTML, clipboard, and plain markdown files.

use anyhow::{Context, Result};
use std::path::Path;

/// Wrap rendered body HTML in a standalone page. The body is expected to
/// be already sanitized.
pub fn export_document(title: &str, body_html: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
body {{
    max-width: 48rem;
    margin: 2rem auto;
    padding: 0 1rem;
    font-family: -apple-system, "Segoe UI", sans-serif;
    line-height: 1.6;
}}
pre {{
    background: #f6f8fa;
    padding: 1rem;
    overflow-x: auto;
}}
code {{
    font-family: "SF Mono", Consolas, monospace;
}}
blockquote {{
    border-left: 4px solid #d0d7de;
    margin-left: 0;
    padding-left: 1rem;
    color: #57606a;
}}
table {{
    border-collapse: collapse;
}}
th, td {{
    border: 1px solid #d0d7de;
    padding: 0.4rem 0.8rem;
}}
</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = title,
        body = body_html,
    )
}

pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("Failed to access system clipboard")?;
    clipboard
        .set_text(text.to_string())
        .context("Failed to write to system clipboard")?;
    Ok(())
}

pub async fn write_markdown(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write markdown file: {}", path.display()))?;
    log::info!("Wrote markdown file: {}", path.display());
    Ok(())
}
