//! Script classification for line breaking.
//!
//! All Unicode-range checks live here so new scripts only touch this file.

/// Script family of a character, as far as line breaking cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// Hiragana, Katakana, CJK Unified Ideographs: no spaces between words.
    Cjk,
    /// Everything else: words are separated by whitespace.
    Spaced,
}

impl Script {
    /// Classify a single character.
    pub fn of(ch: char) -> Script {
        match ch {
            '\u{3040}'..='\u{309F}' // Hiragana
            | '\u{30A0}'..='\u{30FF}' // Katakana
            | '\u{4E00}'..='\u{9FAF}' => Script::Cjk,
            _ => Script::Spaced,
        }
    }
}

/// How a string is broken into lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakMode {
    /// Break between any two characters.
    Character,
    /// Break only at whitespace.
    Word,
}

impl BreakMode {
    /// Character breaking if any character belongs to a script written
    /// without spaces, word breaking otherwise.
    pub fn detect(text: &str) -> BreakMode {
        if text.chars().any(|ch| Script::of(ch) == Script::Cjk) {
            BreakMode::Character
        } else {
            BreakMode::Word
        }
    }
}
