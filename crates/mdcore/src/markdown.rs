use comrak::{markdown_to_html, ComrakOptions};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DIAGRAM_BLOCK: Regex =
        Regex::new(r#"<pre><code class="language-mermaid">([^<]*)</code></pre>"#)
            .expect("Invalid DIAGRAM_BLOCK regex pattern");
}

/// Convert markdown to HTML and replace diagram code fences with
/// renderable containers.
pub fn to_html(src: &str) -> String {
    let opt = create_comrak_options();
    let html = markdown_to_html(src, &opt);
    patch_diagram_blocks(&html)
}

fn create_comrak_options() -> ComrakOptions<'static> {
    let mut opt = ComrakOptions::default();

    // Extension options
    opt.extension.strikethrough = true;
    opt.extension.table = true;
    opt.extension.autolink = true;
    opt.extension.tasklist = true;

    // Parse options
    opt.parse.smart = true;

    // Render options - SECURITY: Enable safe HTML rendering
    opt.render.unsafe_ = false; // Disable unsafe HTML execution
    opt.render.escape = true; // Enable HTML escaping to prevent XSS

    opt
}

/// Replace `language-mermaid` code blocks with a container div carrying
/// the diagram source in a `data-diagram` attribute. A diagram renderer
/// draws into the container; the literal source never shows in the
/// preview.
pub fn patch_diagram_blocks(html: &str) -> String {
    DIAGRAM_BLOCK
        .replace_all(html, |caps: &regex::Captures<'_>| {
            let source = decode_entities(&caps[1]);
            format!(
                r#"<div class="mermaid-container" data-diagram="{}"></div>"#,
                escape_attribute(&source)
            )
        })
        .into_owned()
}

// comrak escapes the fence body; the diagram source must be restored
// before it is stored on the container.
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn escape_attribute(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
