use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Edit,
    TokenPrompt,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    fn display_duration(self) -> Duration {
        match self {
            Severity::Info => Duration::from_secs(3),
            Severity::Success => Duration::from_secs(2),
            Severity::Warning => Duration::from_secs(5),
            Severity::Error => Duration::from_secs(7),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub content: String,
    pub severity: Severity,
    created_at: Instant,
}

impl StatusMessage {
    fn new(content: String, severity: Severity) -> Self {
        Self {
            content,
            severity,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.severity.display_duration()
    }
}

#[derive(Clone)]
pub struct UIState {
    pub mode: Mode,
    status: Option<StatusMessage>,
    token_buffer: String,
    should_quit: bool,
}

impl UIState {
    pub fn new() -> Self {
        Self {
            mode: Mode::Edit,
            status: None,
            token_buffer: String::new(),
            should_quit: false,
        }
    }

    pub fn status_message(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn set_info(&mut self, message: impl Into<String>) {
        self.status = Some(StatusMessage::new(message.into(), Severity::Info));
    }

    pub fn set_success(&mut self, message: impl Into<String>) {
        self.status = Some(StatusMessage::new(message.into(), Severity::Success));
    }

    pub fn set_warning(&mut self, message: impl Into<String>) {
        self.status = Some(StatusMessage::new(message.into(), Severity::Warning));
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status = Some(StatusMessage::new(message.into(), Severity::Error));
    }

    /// Expire the visible status message once its display window passes.
    pub fn update(&mut self) {
        if self.status.as_ref().is_some_and(|m| m.is_expired()) {
            self.status = None;
        }
    }

    pub fn enter_token_prompt(&mut self) {
        self.mode = Mode::TokenPrompt;
        self.token_buffer.clear();
    }

    pub fn leave_token_prompt(&mut self) {
        if self.mode == Mode::TokenPrompt {
            self.mode = Mode::Edit;
        }
        self.token_buffer.clear();
    }

    pub fn token_buffer(&self) -> &str {
        &self.token_buffer
    }

    pub fn push_token_char(&mut self, c: char) {
        self.token_buffer.push(c);
    }

    pub fn pop_token_char(&mut self) {
        self.token_buffer.pop();
    }

    pub fn take_token_buffer(&mut self) -> String {
        std::mem::take(&mut self.token_buffer)
    }

    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            Mode::Help => Mode::Edit,
            _ => Mode::Help,
        };
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

impl Default for UIState {
    fn default() -> Self {
        Self::new()
    }
}
