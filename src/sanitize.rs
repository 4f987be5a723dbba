// src/sanitize.rs
// Bounds raw conversation text before it reaches the model

use crate::config::VibeConfig;

pub const DEFAULT_MAX_CHARS: usize = 2000;

/// Truncates input to a fixed number of characters. The text is otherwise
/// passed through untouched: it is only ever interpolated, never executed.
#[derive(Debug, Clone, Copy)]
pub struct InputSanitizer {
    max_chars: usize,
}

impl Default for InputSanitizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS)
    }
}

impl InputSanitizer {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn from_config(config: &VibeConfig) -> Self {
        Self::new(config.max_input_chars)
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Keep at most `max_chars` characters, cutting on a char boundary
    pub fn sanitize(&self, text: &str) -> String {
        match text.char_indices().nth(self.max_chars) {
            Some((byte_idx, _)) => text[..byte_idx].to_string(),
            None => text.to_string(),
        }
    }
}
