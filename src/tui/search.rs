/// Search input state for the TUI.
///
/// `cursor_pos` is a byte offset that always sits on a char boundary.
pub struct SearchState {
    pub query: String,
    pub cursor_pos: usize,
    pub focused: bool,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            cursor_pos: 0,
            focused: true,
        }
    }
}

impl SearchState {
    pub fn insert_char(&mut self, c: char) {
        self.query.insert(self.cursor_pos, c);
        self.cursor_pos += c.len_utf8();
    }

    /// Remove the char before the cursor. Returns whether the query changed.
    pub fn backspace(&mut self) -> bool {
        if self.cursor_pos == 0 {
            return false;
        }
        let prev = self.prev_boundary();
        self.query.remove(prev);
        self.cursor_pos = prev;
        true
    }

    /// Remove the char under the cursor. Returns whether the query changed.
    pub fn delete(&mut self) -> bool {
        if self.cursor_pos >= self.query.len() {
            return false;
        }
        self.query.remove(self.cursor_pos);
        true
    }

    pub fn move_left(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos = self.prev_boundary();
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor_pos < self.query.len() {
            self.cursor_pos = self.query[self.cursor_pos..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor_pos + i)
                .unwrap_or(self.query.len());
        }
    }

    pub fn move_home(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_pos = self.query.len();
    }

    /// Replace the whole query and put the cursor at the end
    pub fn set(&mut self, value: &str) {
        self.query = value.to_string();
        self.cursor_pos = self.query.len();
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.cursor_pos = 0;
    }

    /// Display columns between the start of the query and the cursor
    pub fn cursor_column(&self) -> usize {
        unicode_width::UnicodeWidthStr::width(&self.query[..self.cursor_pos])
    }

    fn prev_boundary(&self) -> usize {
        self.query[..self.cursor_pos]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> SearchState {
        let mut state = SearchState::default();
        for c in s.chars() {
            state.insert_char(c);
        }
        state
    }

    #[test]
    fn editing_in_the_middle() {
        let mut s = typed("rng");
        s.move_left();
        s.move_left();
        s.insert_char('i');
        assert_eq!(s.query, "ring");
        assert_eq!(s.cursor_pos, 2);

        assert!(s.delete());
        assert_eq!(s.query, "rig");
        assert!(s.backspace());
        assert_eq!(s.query, "rg");
        assert_eq!(s.cursor_pos, 1);
    }

    #[test]
    fn multibyte_chars_move_whole() {
        let mut s = typed("Café");
        assert_eq!(s.cursor_pos, 5);
        s.move_left();
        assert_eq!(s.cursor_pos, 3);
        s.move_right();
        assert_eq!(s.cursor_pos, 5);
        assert!(s.backspace());
        assert_eq!(s.query, "Caf");
        assert_eq!(s.cursor_column(), 3);
    }

    #[test]
    fn edits_at_the_edges_are_no_ops() {
        let mut s = typed("ab");
        assert!(!s.delete());
        s.move_home();
        assert!(!s.backspace());
        s.move_left();
        assert_eq!(s.cursor_pos, 0);
        s.move_end();
        s.move_right();
        assert_eq!(s.cursor_pos, 2);
    }

    #[test]
    fn set_places_cursor_at_end() {
        let mut s = SearchState::default();
        s.set("Men's Clothing");
        assert_eq!(s.cursor_pos, s.query.len());
        s.clear();
        assert!(s.query.is_empty());
        assert_eq!(s.cursor_pos, 0);
    }
}
