//! Input field handling for the terminal user interface.

/// A text input field with cursor position and active state management.
/// The cursor counts characters, not bytes.
#[derive(Clone, Default)]
pub struct InputField {
    pub value: String,
    pub cursor: usize,
    pub active: bool,
}

impl InputField {
    /// Create a new empty input field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input field with initial text value.
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
            active: false,
        }
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    /// Insert a character at the current cursor position.
    pub fn handle_char(&mut self, c: char) {
        let idx = self.byte_index(self.cursor);
        self.value.insert(idx, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn handle_backspace(&mut self) {
        if self.cursor > 0 {
            let idx = self.byte_index(self.cursor - 1);
            self.value.remove(idx);
            self.cursor -= 1;
        }
    }

    /// Delete the character at the cursor position.
    pub fn handle_delete(&mut self) {
        if self.cursor < self.char_len() {
            let idx = self.byte_index(self.cursor);
            self.value.remove(idx);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_in_the_middle() {
        let mut field = InputField::with_value("ac");
        field.move_cursor_left();
        field.handle_char('b');
        assert_eq!(field.value, "abc");
        field.handle_backspace();
        assert_eq!(field.value, "ac");
        field.handle_delete();
        assert_eq!(field.value, "a");
        assert_eq!(field.cursor, 1);
    }

    #[test]
    fn test_multibyte_characters() {
        let mut field = InputField::with_value("café");
        assert_eq!(field.cursor, 4);
        field.handle_backspace();
        assert_eq!(field.value, "caf");
        field.handle_char('é');
        field.move_cursor_left();
        field.move_cursor_left();
        field.handle_char('ñ');
        assert_eq!(field.value, "cañfé");
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut field = InputField::new();
        field.move_cursor_left();
        field.handle_backspace();
        field.handle_delete();
        field.move_cursor_right();
        assert_eq!(field.cursor, 0);
        assert!(field.value.is_empty());
    }
}
