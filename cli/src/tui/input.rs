//! Single-line editor for the instruction box.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditor {
    buffer: String,
    /// Byte offset, always on a char boundary.
    cursor: usize,
}

impl LineEditor {
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters, for placing the terminal cursor.
    pub fn cursor_col(&self) -> usize {
        self.buffer[..self.cursor].chars().count()
    }

    pub fn insert_char(&mut self, ch: char) {
        self.buffer.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_char_boundary(&self.buffer, self.cursor);
        self.buffer.replace_range(prev..self.cursor, "");
        self.cursor = prev;
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.buffer.len() {
            return;
        }
        let next = next_char_boundary(&self.buffer, self.cursor);
        self.buffer.replace_range(self.cursor..next, "");
    }

    pub fn move_left(&mut self) {
        self.cursor = prev_char_boundary(&self.buffer, self.cursor);
    }

    pub fn move_right(&mut self) {
        self.cursor = next_char_boundary(&self.buffer, self.cursor);
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.buffer.len();
    }
}

fn prev_char_boundary(s: &str, idx: usize) -> usize {
    s[..idx].char_indices().next_back().map_or(0, |(i, _)| i)
}

fn next_char_boundary(s: &str, idx: usize) -> usize {
    match s[idx..].chars().next() {
        Some(ch) => idx + ch.len_utf8(),
        None => s.len(),
    }
}
