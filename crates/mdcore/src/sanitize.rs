use ammonia::Builder;

pub fn sanitize_html(html: &str) -> String {
    // Use safe defaults - no script tags allowed
    Builder::new().clean(html).to_string()
}

/// Sanitize HTML destined for the live preview. Diagram containers keep
/// their class and `data-diagram` payload so a renderer can pick them up.
pub fn sanitize_preview(html: &str) -> String {
    Builder::new()
        .add_allowed_classes("div", &["mermaid-container"])
        .add_tag_attributes("div", &["data-diagram"])
        .clean(html)
        .to_string()
}
