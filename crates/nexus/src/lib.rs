pub mod app;
pub mod config;
pub mod draft;
pub mod editor;
pub mod export;
pub mod highlight;
pub mod session;
pub mod timer;
pub mod token_store;
pub mod ui;
pub mod ui_state;

pub use app::App;
pub use config::{PreviewMode, Settings, Theme};
pub use editor::Editor;
pub use session::DocumentSession;
