//! Greedy line wrapping against measured pixel widths.

use super::font::Font;
use super::script::BreakMode;

/// Anything that can report the drawn width of a string.
pub trait Measure {
    fn text_width(&self, text: &str) -> f32;
}

impl Measure for Font {
    fn text_width(&self, text: &str) -> f32 {
        Font::text_width(self, text)
    }
}

/// Wrap `text` into lines no wider than `max_width` pixels.
///
/// With `script_aware`, text containing CJK characters breaks between any two
/// characters and other text breaks at whitespace. Without it, text always
/// breaks between characters. `\n` always starts a new line.
///
/// A word or character wider than `max_width` on its own gets a line to itself.
/// There is no line limit.
pub fn wrap(text: &str, font: &impl Measure, max_width: f32, script_aware: bool) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let mode = if script_aware {
        BreakMode::detect(text)
    } else {
        BreakMode::Character
    };

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let before = lines.len();
        match mode {
            BreakMode::Word => wrap_words(paragraph, font, max_width, &mut lines),
            BreakMode::Character => wrap_chars(paragraph, font, max_width, &mut lines),
        }
        if lines.len() == before {
            lines.push(String::new());
        }
    }
    lines
}

fn wrap_words(paragraph: &str, font: &impl Measure, max_width: f32, lines: &mut Vec<String>) {
    let mut current = String::new();
    for word in paragraph.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if font.text_width(&candidate) <= max_width {
            current = candidate;
        } else if current.is_empty() {
            lines.push(word.to_string());
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
}

fn wrap_chars(paragraph: &str, font: &impl Measure, max_width: f32, lines: &mut Vec<String>) {
    let mut current = String::new();
    for ch in paragraph.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);
        if font.text_width(&candidate) <= max_width {
            current = candidate;
        } else if current.is_empty() {
            lines.push(ch.to_string());
        } else {
            lines.push(std::mem::replace(&mut current, ch.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
}
