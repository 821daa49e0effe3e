use ropey::Rope;
use std::cmp;

/// Rope-backed text buffer with a cursor and a scrolling viewport.
///
/// Columns are char offsets within a line; the cursor may sit one past
/// the last char of a line for insertion at the end.
#[derive(Clone)]
pub struct Editor {
    rope: Rope,
    cursor_line: usize,
    cursor_col: usize,
    viewport_offset: usize,
    viewport_height: usize,
    modified: bool,
    tab_size: usize,
}

impl Editor {
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            cursor_line: 0,
            cursor_col: 0,
            viewport_offset: 0,
            viewport_height: 24, // Default, updated on first draw
            modified: false,
            tab_size: 4,
        }
    }

    pub fn set_content(&mut self, content: String) {
        self.rope = Rope::from_str(&content);
        self.cursor_line = 0;
        self.cursor_col = 0;
        self.viewport_offset = 0;
        self.modified = false;
    }

    pub fn get_content(&self) -> String {
        self.rope.to_string()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn cursor_position(&self) -> (usize, usize) {
        (self.cursor_line, self.cursor_col)
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height;
    }

    pub fn get_viewport_offset(&self) -> usize {
        self.viewport_offset
    }

    pub fn get_viewport_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let end_line = cmp::min(
            self.viewport_offset + self.viewport_height,
            self.rope.len_lines(),
        );

        for i in self.viewport_offset..end_line {
            if let Some(line) = self.rope.get_line(i) {
                lines.push(line.to_string());
            }
        }

        lines
    }

    pub fn insert_char(&mut self, c: char) {
        let char_idx = self.line_col_to_char_idx(self.cursor_line, self.cursor_col);
        self.rope.insert_char(char_idx, c);
        self.cursor_col += 1;
        self.modified = true;
    }

    pub fn insert_newline(&mut self) {
        let char_idx = self.line_col_to_char_idx(self.cursor_line, self.cursor_col);
        self.rope.insert_char(char_idx, '\n');
        self.cursor_line += 1;
        self.cursor_col = 0;
        self.modified = true;
        self.adjust_viewport();
    }

    pub fn insert_tab(&mut self) {
        for _ in 0..self.tab_size {
            self.insert_char(' ');
        }
    }

    pub fn delete_char_backward(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
            let char_idx = self.line_col_to_char_idx(self.cursor_line, self.cursor_col);
            self.rope.remove(char_idx..char_idx + 1);
            self.modified = true;
        } else if self.cursor_line > 0 {
            // Join with the previous line
            self.cursor_line -= 1;
            self.cursor_col = self.line_len(self.cursor_line);
            let newline_idx = self.rope.line_to_char(self.cursor_line + 1) - 1;
            self.rope.remove(newline_idx..newline_idx + 1);
            self.modified = true;
            self.adjust_viewport();
        }
    }

    pub fn delete_char_forward(&mut self) {
        let char_idx = self.line_col_to_char_idx(self.cursor_line, self.cursor_col);
        if char_idx < self.rope.len_chars() {
            self.rope.remove(char_idx..char_idx + 1);
            self.modified = true;
        }
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.adjust_cursor_col();
            self.adjust_viewport();
        }
    }

    pub fn move_cursor_down(&mut self) {
        if self.cursor_line + 1 < self.rope.len_lines() {
            self.cursor_line += 1;
            self.adjust_cursor_col();
            self.adjust_viewport();
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.line_len(self.cursor_line);
            self.adjust_viewport();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_col < self.line_len(self.cursor_line) {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.rope.len_lines() {
            self.cursor_line += 1;
            self.cursor_col = 0;
            self.adjust_viewport();
        }
    }

    pub fn move_to_line_start(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_to_line_end(&mut self) {
        self.cursor_col = self.line_len(self.cursor_line);
    }

    pub fn page_up(&mut self) {
        self.cursor_line = self.cursor_line.saturating_sub(self.viewport_height);
        self.viewport_offset = self.viewport_offset.saturating_sub(self.viewport_height);
        self.adjust_cursor_col();
    }

    pub fn page_down(&mut self) {
        let max_line = self.rope.len_lines().saturating_sub(1);
        self.cursor_line = cmp::min(self.cursor_line + self.viewport_height, max_line);
        self.viewport_offset = cmp::min(
            self.viewport_offset + self.viewport_height,
            max_line.saturating_sub(self.viewport_height.saturating_sub(1)),
        );
        self.adjust_cursor_col();
    }

    /// Char count of a line, excluding the trailing newline if any.
    fn line_len(&self, line: usize) -> usize {
        match self.rope.get_line(line) {
            Some(text) => {
                let len = text.len_chars();
                if len > 0 && text.char(len - 1) == '\n' {
                    len - 1
                } else {
                    len
                }
            }
            None => 0,
        }
    }

    fn line_col_to_char_idx(&self, line: usize, col: usize) -> usize {
        let line_start = self.rope.line_to_char(line);
        line_start + cmp::min(col, self.line_len(line))
    }

    fn adjust_cursor_col(&mut self) {
        self.cursor_col = cmp::min(self.cursor_col, self.line_len(self.cursor_line));
    }

    fn adjust_viewport(&mut self) {
        if self.cursor_line < self.viewport_offset {
            self.viewport_offset = self.cursor_line;
        } else if self.cursor_line >= self.viewport_offset + self.viewport_height {
            self.viewport_offset = self.cursor_line.saturating_sub(self.viewport_height - 1);
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}
