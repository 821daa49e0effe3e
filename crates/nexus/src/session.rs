//! Document session: editor state, derived preview, draft scheduling, and
//! gist association.
//!
//! The session owns the debounce timers and the startup precedence rule:
//! remote content, once applied, wins over the local draft no matter which
//! one arrives first.

use std::time::{Duration, Instant};

use gist_client::{Gist, PendingWrite};
use mdcore::sanitize::sanitize_preview;

use crate::editor::Editor;
use crate::timer::Debounce;

pub const PREVIEW_DEBOUNCE: Duration = Duration::from_millis(200);
pub const DRAFT_DEBOUNCE: Duration = Duration::from_millis(2000);

pub const DEFAULT_DOCUMENT: &str = "\
# Welcome to Nexus

Start typing to see the live preview.

```mermaid
graph TD
    A[\"Idea\"] --> B[\"Draft\"]
    B --> C[\"Published gist\"]
```

- Markdown renders as you type
- Drafts are saved locally while you work
- Ctrl+S publishes the document as a gist
";

pub struct DocumentSession {
    pub editor: Editor,
    preview_html: String,
    preview_timer: Debounce,
    draft_timer: Debounce,
    gist: Option<Gist>,
    remote_applied: bool,
    pending_write: Option<PendingWrite>,
}

impl DocumentSession {
    pub fn new() -> Self {
        let mut editor = Editor::new();
        editor.set_content(DEFAULT_DOCUMENT.to_string());
        let preview_html = render_preview(DEFAULT_DOCUMENT);

        Self {
            editor,
            preview_html,
            preview_timer: Debounce::new(PREVIEW_DEBOUNCE),
            draft_timer: Debounce::new(DRAFT_DEBOUNCE),
            gist: None,
            remote_applied: false,
            pending_write: None,
        }
    }

    pub fn preview_html(&self) -> &str {
        &self.preview_html
    }

    /// Preview reflecting the current text even mid-quiet-period, for
    /// export paths that must not serve a stale render.
    pub fn preview_html_now(&mut self) -> &str {
        if self.preview_timer.is_pending() {
            self.preview_timer.cancel();
            self.preview_html = render_preview(&self.editor.get_content());
        }
        &self.preview_html
    }

    /// Record an edit: restart both quiet periods. The draft timer only
    /// runs when auto-save is enabled.
    pub fn on_edit(&mut self, now: Instant, auto_save_enabled: bool) {
        self.preview_timer.schedule(now);
        if auto_save_enabled {
            self.draft_timer.schedule(now);
        } else {
            self.draft_timer.cancel();
        }
    }

    /// Advance the timers. Regenerates the preview when its quiet period
    /// elapses; returns the document text when the draft save is due.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        if self.preview_timer.fire(now) {
            self.preview_html = render_preview(&self.editor.get_content());
        }

        if self.draft_timer.fire(now) {
            Some(self.editor.get_content())
        } else {
            None
        }
    }

    pub fn cancel_pending(&mut self) {
        self.preview_timer.cancel();
        self.draft_timer.cancel();
    }

    /// Replace the document with a recovered draft. Skipped once remote
    /// content has been applied, and when the draft matches the current
    /// text.
    pub fn apply_draft(&mut self, draft: &str, now: Instant) -> bool {
        if self.remote_applied || draft == self.editor.get_content() {
            return false;
        }

        self.editor.set_content(draft.to_string());
        self.preview_timer.schedule(now);
        true
    }

    /// Replace the document with remotely loaded content. Applied at most
    /// once per session; later draft loads cannot override it.
    pub fn apply_remote(&mut self, content: &str, now: Instant) -> bool {
        if self.remote_applied || content.is_empty() {
            return false;
        }

        self.remote_applied = true;
        self.editor.set_content(content.to_string());
        self.preview_timer.schedule(now);
        true
    }

    pub fn associate_gist(&mut self, gist: Gist) {
        self.gist = Some(gist);
    }

    pub fn gist_id(&self) -> Option<&str> {
        self.gist.as_ref().map(|gist| gist.id.as_str())
    }

    pub fn gist_url(&self) -> Option<&str> {
        self.gist.as_ref().map(|gist| gist.html_url.as_str())
    }

    /// The write this session needs: an update when a gist is already
    /// associated, otherwise a create.
    pub fn save_request(&self) -> PendingWrite {
        let content = self.editor.get_content();
        match self.gist_id() {
            Some(id) => PendingWrite::Update {
                id: id.to_string(),
                content,
            },
            None => PendingWrite::Create {
                content,
                description: None,
            },
        }
    }

    /// Park a write while the credential prompt is outstanding. A newer
    /// suspended write replaces an older one.
    pub fn suspend_write(&mut self, write: PendingWrite) {
        self.pending_write = Some(write);
    }

    pub fn take_pending_write(&mut self) -> Option<PendingWrite> {
        self.pending_write.take()
    }

    pub fn discard_pending_write(&mut self) {
        self.pending_write = None;
    }

    pub fn has_pending_write(&self) -> bool {
        self.pending_write.is_some()
    }
}

impl Default for DocumentSession {
    fn default() -> Self {
        Self::new()
    }
}

fn render_preview(markdown: &str) -> String {
    sanitize_preview(&mdcore::to_html(markdown))
}
