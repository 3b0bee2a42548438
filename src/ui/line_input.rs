use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// One editing operation on a [`LineInput`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineEdit {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    DeleteWordBack,
    Clear,
}

impl LineEdit {
    /// Map a key press to an edit. Enter, Esc and Tab are not edits and
    /// return `None` so the caller can treat them as submit/blur/focus.
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Left => Some(LineEdit::Left),
            KeyCode::Right => Some(LineEdit::Right),
            KeyCode::Home => Some(LineEdit::Home),
            KeyCode::End => Some(LineEdit::End),
            KeyCode::Backspace => Some(LineEdit::Backspace),
            KeyCode::Delete => Some(LineEdit::Delete),
            KeyCode::Char('a') if ctrl => Some(LineEdit::Home),
            KeyCode::Char('e') if ctrl => Some(LineEdit::End),
            KeyCode::Char('u') if ctrl => Some(LineEdit::Clear),
            KeyCode::Char('w') if ctrl => Some(LineEdit::DeleteWordBack),
            KeyCode::Char(ch) if !ctrl => Some(LineEdit::Insert(ch)),
            _ => None,
        }
    }
}

/// Single-line text field used for short answer entry.
#[derive(Clone, Debug, Default)]
pub struct LineInput {
    text: String,
    /// Cursor position as a char index (0 = before first char).
    cursor: usize,
}

impl LineInput {
    pub fn new(text: &str) -> Self {
        let cursor = text.chars().count();
        Self {
            text: text.to_string(),
            cursor,
        }
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns (before_cursor, cursor_char, after_cursor) for styled rendering.
    /// When cursor is at end of text, cursor_char is None.
    pub fn render_parts(&self) -> (&str, Option<char>, &str) {
        let byte_offset = self.char_to_byte(self.cursor);
        match self.text[byte_offset..].chars().next() {
            Some(ch) => {
                let next_byte = byte_offset + ch.len_utf8();
                (&self.text[..byte_offset], Some(ch), &self.text[next_byte..])
            }
            None => (&self.text, None, ""),
        }
    }

    pub fn apply(&mut self, edit: LineEdit) {
        let len = self.text.chars().count();
        match edit {
            LineEdit::Insert(ch) => {
                let byte_offset = self.char_to_byte(self.cursor);
                self.text.insert(byte_offset, ch);
                self.cursor += 1;
            }
            LineEdit::Backspace => {
                if self.cursor > 0 {
                    self.remove_char(self.cursor - 1);
                    self.cursor -= 1;
                }
            }
            LineEdit::Delete => {
                if self.cursor < len {
                    self.remove_char(self.cursor);
                }
            }
            LineEdit::Left => self.cursor = self.cursor.saturating_sub(1),
            LineEdit::Right => self.cursor = (self.cursor + 1).min(len),
            LineEdit::Home => self.cursor = 0,
            LineEdit::End => self.cursor = len,
            LineEdit::DeleteWordBack => self.delete_word_back(),
            LineEdit::Clear => {
                self.text.clear();
                self.cursor = 0;
            }
        }
    }

    fn remove_char(&mut self, char_idx: usize) {
        let start = self.char_to_byte(char_idx);
        if let Some(ch) = self.text[start..].chars().next() {
            self.text.replace_range(start..start + ch.len_utf8(), "");
        }
    }

    /// Convert char index to byte offset.
    fn char_to_byte(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    /// Delete word before cursor (unix-word-rubout: skip whitespace, then non-whitespace).
    fn delete_word_back(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = self.cursor;

        while pos > 0 && chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && !chars[pos - 1].is_whitespace() {
            pos -= 1;
        }

        let start_byte = self.char_to_byte(pos);
        let end_byte = self.char_to_byte(self.cursor);
        self.text.replace_range(start_byte..end_byte, "");
        self.cursor = pos;
    }
}
