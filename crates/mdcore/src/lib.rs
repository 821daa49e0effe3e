pub mod analytics;
pub mod markdown;
pub mod sanitize;

pub use markdown::to_html;
