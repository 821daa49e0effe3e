//! Application orchestrator: wires the document session to settings,
//! draft persistence, the gist client, and key handling.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;
use tokio::sync::mpsc;

use gist_client::{Gist, GistClient, GistResult, PendingWrite, DEFAULT_API_URL};

use crate::config::Settings;
use crate::draft::DraftStore;
use crate::export;
use crate::highlight::Highlighter;
use crate::session::DocumentSession;
use crate::token_store::FileTokenStore;
use crate::ui_state::{Mode, UIState};

const EXPORT_PATH: &str = "document.md";

/// Completions of background gist operations, delivered to the main loop.
#[derive(Debug)]
pub enum AppEvent {
    RemoteLoaded(GistResult<Gist>),
    Saved {
        result: GistResult<Gist>,
        was_update: bool,
    },
}

pub struct App {
    pub session: DocumentSession,
    pub settings: Settings,
    pub ui_state: UIState,
    pub highlighter: Highlighter,
    drafts: DraftStore,
    gist: GistClient<FileTokenStore>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    saving: bool,
}

impl App {
    pub async fn new() -> Result<Self> {
        let settings = Settings::load().await?;
        let highlighter = Highlighter::new(settings.theme);

        let api_url =
            std::env::var("NEXUS_GIST_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let gist = GistClient::with_api_url(api_url, FileTokenStore::new())?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(Self {
            session: DocumentSession::new(),
            settings,
            ui_state: UIState::new(),
            highlighter,
            drafts: DraftStore::new(),
            gist,
            events_tx,
            events_rx,
            saving: false,
        })
    }

    /// Startup: restore the local draft immediately, then load the remote
    /// document in the background. Remote content, when it arrives, wins.
    pub async fn initialize(&mut self, remote_id: Option<&str>) {
        match self.drafts.load().await {
            Ok(Some(draft)) => {
                if self.session.apply_draft(&draft, Instant::now()) {
                    self.ui_state.set_info("Restored draft from last session");
                }
            }
            Ok(None) => {}
            Err(e) => {
                log::error!("Failed to load draft: {}", e);
                self.ui_state.set_warning(format!("Could not load draft: {}", e));
            }
        }

        if let Some(id) = remote_id {
            self.spawn_remote_load(id.to_string());
        }
    }

    fn spawn_remote_load(&self, id: String) {
        let client = self.gist.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.read(&id).await;
            let _ = tx.send(AppEvent::RemoteLoaded(result));
        });
    }

    /// One main-loop iteration: advance debounce timers, persist a due
    /// draft, drain background completions, expire status messages.
    pub async fn tick(&mut self) {
        if let Some(content) = self.session.poll(Instant::now()) {
            match self.drafts.save(&content).await {
                Ok(_) => {}
                Err(e) => {
                    log::error!("Draft save failed: {}", e);
                    self.ui_state.set_error(format!("Draft save failed: {}", e));
                }
            }
        }

        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_app_event(event);
        }

        self.ui_state.update();
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::RemoteLoaded(Ok(gist)) => match gist.markdown_content() {
                Ok(content) if !content.is_empty() => {
                    let id = gist.id.clone();
                    let content = content.to_string();
                    self.session.apply_remote(&content, Instant::now());
                    self.session.associate_gist(gist);
                    self.ui_state.set_info(format!("Loaded gist {}", id));
                }
                Ok(_) => {
                    // Keep whatever the draft restored.
                    self.session.associate_gist(gist);
                    self.ui_state.set_warning("Remote document is empty");
                }
                Err(e) => {
                    log::error!("Gist has no usable file: {}", e);
                    self.ui_state.set_error(format!("Could not load gist: {}", e));
                }
            },
            AppEvent::RemoteLoaded(Err(e)) => {
                log::error!("Remote load failed: {}", e);
                self.ui_state.set_error(format!("Could not load gist: {}", e));
            }
            AppEvent::Saved { result, was_update } => {
                self.saving = false;
                match result {
                    Ok(gist) => {
                        let url = gist.html_url.clone();
                        self.session.associate_gist(gist);
                        self.session.editor.mark_saved();

                        let verb = if was_update { "updated" } else { "created" };
                        match export::copy_to_clipboard(&url) {
                            Ok(()) => self.ui_state.set_success(format!(
                                "Gist {} - URL copied to clipboard",
                                verb
                            )),
                            Err(_) => self
                                .ui_state
                                .set_success(format!("Gist {}: {}", verb, url)),
                        }
                    }
                    Err(e) => {
                        log::error!("Gist save failed: {}", e);
                        self.ui_state.set_error(format!("Save failed: {}", e));
                    }
                }
            }
        }
    }

    /// Save to the gist. Without a cached token the write is suspended
    /// and the token prompt opens; supplying a token resumes it.
    pub fn request_save(&mut self) {
        if self.saving {
            self.ui_state.set_warning("A save is already in progress");
            return;
        }

        let write = self.session.save_request();
        match self.gist.has_token() {
            Ok(true) => self.spawn_write(write),
            Ok(false) => {
                self.session.suspend_write(write);
                self.ui_state.enter_token_prompt();
                self.ui_state
                    .set_info("Enter a GitHub access token to save gists");
            }
            Err(e) => {
                log::error!("Token lookup failed: {}", e);
                self.ui_state.set_error(format!("Token storage error: {}", e));
            }
        }
    }

    fn spawn_write(&mut self, write: PendingWrite) {
        self.saving = true;
        let was_update = matches!(write, PendingWrite::Update { .. });
        let client = self.gist.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.resume(write).await;
            let _ = tx.send(AppEvent::Saved { result, was_update });
        });
    }

    /// Token prompt confirmed: cache the token and resume the suspended
    /// write with its original parameters.
    fn supply_token(&mut self) {
        let token = self.ui_state.take_token_buffer();
        let token = token.trim();
        if token.is_empty() {
            self.decline_token();
            return;
        }

        if let Err(e) = self.gist.save_token(token) {
            log::error!("Failed to store token: {}", e);
            self.ui_state.leave_token_prompt();
            self.ui_state.set_error(format!("Could not store token: {}", e));
            return;
        }

        self.ui_state.leave_token_prompt();
        if let Some(write) = self.session.take_pending_write() {
            self.spawn_write(write);
        }
    }

    /// Token prompt cancelled: the suspended write is discarded.
    fn decline_token(&mut self) {
        self.ui_state.leave_token_prompt();
        self.session.discard_pending_write();
        self.ui_state
            .set_error("Save cancelled: no access token provided");
    }

    fn export_html(&mut self) {
        let body = self.session.preview_html_now().to_string();
        let html = export::export_document("Nexus document", &body);
        match export::copy_to_clipboard(&html) {
            Ok(()) => self.ui_state.set_success("HTML copied to clipboard"),
            Err(e) => {
                log::error!("Clipboard export failed: {}", e);
                self.ui_state.set_error(format!("Export failed: {}", e));
            }
        }
    }

    async fn export_markdown(&mut self) {
        let content = self.session.editor.get_content();
        match export::write_markdown(EXPORT_PATH, &content).await {
            Ok(()) => self
                .ui_state
                .set_success(format!("Saved markdown to {}", EXPORT_PATH)),
            Err(e) => {
                log::error!("Markdown export failed: {}", e);
                self.ui_state.set_error(format!("Export failed: {}", e));
            }
        }
    }

    fn mark_edit(&mut self) {
        self.session
            .on_edit(Instant::now(), self.settings.auto_save_enabled);
    }

    pub fn draft_last_saved(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.drafts.last_saved()
    }

    pub fn quit(&mut self) {
        self.session.cancel_pending();
        self.ui_state.quit();
    }

    pub fn should_quit(&self) -> bool {
        self.ui_state.should_quit()
    }

    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        match self.ui_state.mode {
            Mode::TokenPrompt => self.handle_token_prompt_key(key),
            Mode::Help => self.handle_help_key(key),
            Mode::Edit => self.handle_edit_key(key).await?,
        }
        Ok(())
    }

    fn handle_token_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.supply_token(),
            KeyCode::Esc => self.decline_token(),
            KeyCode::Backspace => self.ui_state.pop_token_char(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.ui_state.push_token_char(c);
            }
            _ => {}
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') => self.ui_state.toggle_help(),
            _ => {}
        }
    }

    async fn handle_edit_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('q') | KeyCode::Char('c') => self.quit(),
                KeyCode::Char('s') => self.request_save(),
                KeyCode::Char('e') => self.export_html(),
                KeyCode::Char('o') => self.export_markdown().await,
                KeyCode::Char('t') => {
                    self.settings.toggle_theme().await?;
                    self.highlighter.set_theme(self.settings.theme);
                    self.ui_state
                        .set_info(format!("Theme: {:?}", self.settings.theme));
                }
                KeyCode::Char('a') => {
                    self.settings.toggle_auto_save().await?;
                    let state = if self.settings.auto_save_enabled {
                        "enabled"
                    } else {
                        "disabled"
                    };
                    self.ui_state.set_info(format!("Auto-save {}", state));
                    // A disabled auto-save also cancels any scheduled draft.
                    self.mark_edit();
                }
                KeyCode::Char('p') => {
                    self.settings.cycle_preview_mode().await?;
                }
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::F(1) => self.ui_state.toggle_help(),
            KeyCode::Char(c) => {
                self.session.editor.insert_char(c);
                self.mark_edit();
            }
            KeyCode::Enter => {
                self.session.editor.insert_newline();
                self.mark_edit();
            }
            KeyCode::Tab => {
                self.session.editor.insert_tab();
                self.mark_edit();
            }
            KeyCode::Backspace => {
                self.session.editor.delete_char_backward();
                self.mark_edit();
            }
            KeyCode::Delete => {
                self.session.editor.delete_char_forward();
                self.mark_edit();
            }
            KeyCode::Up => self.session.editor.move_cursor_up(),
            KeyCode::Down => self.session.editor.move_cursor_down(),
            KeyCode::Left => self.session.editor.move_cursor_left(),
            KeyCode::Right => self.session.editor.move_cursor_right(),
            KeyCode::Home => self.session.editor.move_to_line_start(),
            KeyCode::End => self.session.editor.move_to_line_end(),
            KeyCode::PageUp => self.session.editor.page_up(),
            KeyCode::PageDown => self.session.editor.page_down(),
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env_test_lock;
    use gist_client::GistError;
    use tempfile::TempDir;

    // Points all persistence at temp dirs and the API at an unroutable
    // host so tests never touch the real environment or network.
    fn isolate_env() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        std::env::set_var("NEXUS_CONFIG_DIR", temp_dir.path().join("config"));
        std::env::set_var("NEXUS_DATA_DIR", temp_dir.path().join("data"));
        std::env::remove_var("NEXUS_CONFIG_PATH");
        std::env::set_var("NEXUS_GIST_API_URL", "http://invalid.invalid");
        temp_dir
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[tokio::test]
    async fn test_typing_updates_document() {
        let _guard = env_test_lock().lock().unwrap();
        let _temp = isolate_env();
        let mut app = App::new().await.unwrap();
        app.session.editor.set_content(String::new());

        app.handle_key_event(key(KeyCode::Char('h'))).await.unwrap();
        app.handle_key_event(key(KeyCode::Char('i'))).await.unwrap();
        assert_eq!(app.session.editor.get_content(), "hi");
    }

    #[tokio::test]
    async fn test_save_without_token_opens_prompt_and_suspends_write() {
        let _guard = env_test_lock().lock().unwrap();
        let _temp = isolate_env();
        let mut app = App::new().await.unwrap();

        app.handle_key_event(ctrl('s')).await.unwrap();
        assert_eq!(app.ui_state.mode, Mode::TokenPrompt);
        assert!(app.session.has_pending_write());
    }

    #[tokio::test]
    async fn test_escape_in_token_prompt_discards_write() {
        let _guard = env_test_lock().lock().unwrap();
        let _temp = isolate_env();
        let mut app = App::new().await.unwrap();

        app.handle_key_event(ctrl('s')).await.unwrap();
        app.handle_key_event(key(KeyCode::Esc)).await.unwrap();

        assert_eq!(app.ui_state.mode, Mode::Edit);
        assert!(!app.session.has_pending_write());
        let message = app.ui_state.status_message().unwrap();
        assert!(message.content.contains("cancelled"));
    }

    #[tokio::test]
    async fn test_empty_token_counts_as_decline() {
        let _guard = env_test_lock().lock().unwrap();
        let _temp = isolate_env();
        let mut app = App::new().await.unwrap();

        app.handle_key_event(ctrl('s')).await.unwrap();
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();

        assert_eq!(app.ui_state.mode, Mode::Edit);
        assert!(!app.session.has_pending_write());
    }

    #[tokio::test]
    async fn test_supplied_token_is_cached_and_write_resumes() {
        let _guard = env_test_lock().lock().unwrap();
        let _temp = isolate_env();
        let mut app = App::new().await.unwrap();

        app.handle_key_event(ctrl('s')).await.unwrap();
        for c in "ghp_example".chars() {
            app.handle_key_event(key(KeyCode::Char(c))).await.unwrap();
        }
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();

        assert_eq!(app.ui_state.mode, Mode::Edit);
        assert!(app.gist.has_token().unwrap());
        assert!(!app.session.has_pending_write());
        // The write was handed to a background task against an
        // unroutable host; the resulting error comes back as an event.
    }

    #[tokio::test]
    async fn test_settings_toggles_persist() {
        let _guard = env_test_lock().lock().unwrap();
        let _temp = isolate_env();
        let mut app = App::new().await.unwrap();

        let before = app.settings.theme;
        app.handle_key_event(ctrl('t')).await.unwrap();
        assert_eq!(app.settings.theme, before.toggled());

        app.handle_key_event(ctrl('a')).await.unwrap();
        assert!(!app.settings.auto_save_enabled);

        let reloaded = Settings::load().await.unwrap();
        assert_eq!(reloaded.theme, before.toggled());
        assert!(!reloaded.auto_save_enabled);
    }

    #[tokio::test]
    async fn test_quit_cancels_scheduled_work() {
        let _guard = env_test_lock().lock().unwrap();
        let _temp = isolate_env();
        let mut app = App::new().await.unwrap();

        app.handle_key_event(key(KeyCode::Char('x'))).await.unwrap();
        app.handle_key_event(ctrl('q')).await.unwrap();
        assert!(app.should_quit());

        // No draft save fires after teardown.
        assert!(app
            .session
            .poll(Instant::now() + std::time::Duration::from_secs(10))
            .is_none());
    }

    #[tokio::test]
    async fn test_remote_load_event_overrides_draft() {
        let _guard = env_test_lock().lock().unwrap();
        let _temp = isolate_env();
        let mut app = App::new().await.unwrap();

        app.session.apply_draft("# Local draft", Instant::now());

        let mut files = std::collections::BTreeMap::new();
        files.insert(
            "document.md".to_string(),
            gist_client::GistFile {
                filename: "document.md".to_string(),
                content: "# Remote".to_string(),
            },
        );
        let gist = Gist {
            id: "abc123".to_string(),
            html_url: "https://gist.github.com/abc123".to_string(),
            description: None,
            files,
            created_at: None,
            updated_at: None,
        };

        app.handle_app_event(AppEvent::RemoteLoaded(Ok(gist)));
        assert_eq!(app.session.editor.get_content(), "# Remote");
        assert_eq!(app.session.gist_id(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_failed_remote_load_surfaces_error() {
        let _guard = env_test_lock().lock().unwrap();
        let _temp = isolate_env();
        let mut app = App::new().await.unwrap();

        app.handle_app_event(AppEvent::RemoteLoaded(Err(GistError::Api {
            status: 404,
            message: "Not Found".to_string(),
        })));

        let message = app.ui_state.status_message().unwrap();
        assert!(message.content.contains("404"));
    }

    #[tokio::test]
    async fn test_save_guard_rejects_concurrent_saves() {
        let _guard = env_test_lock().lock().unwrap();
        let _temp = isolate_env();
        let mut app = App::new().await.unwrap();
        app.saving = true;

        app.request_save();
        let message = app.ui_state.status_message().unwrap();
        assert!(message.content.contains("in progress"));
        assert!(!app.session.has_pending_write());
    }
}
