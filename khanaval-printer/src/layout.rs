//! Plain-text receipt layout
//!
//! Column-aware helpers for composing receipt text before it is handed to
//! `format_for_printer`. Output contains no control codes, so the same
//! text can be previewed on screen or printed.

use crate::encoding::{pad_text, text_width};

pub struct ReceiptLayout {
    buf: String,
    width: usize,
}

impl ReceiptLayout {
    pub fn new(width: usize) -> Self {
        Self {
            buf: String::new(),
            width,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn line(&mut self, s: &str) -> &mut Self {
        self.buf.push_str(s);
        self.buf.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.buf.push('\n');
        self
    }

    /// Center text by left padding
    pub fn center(&mut self, s: &str) -> &mut Self {
        let w = text_width(s);
        if w >= self.width {
            return self.line(s);
        }
        let pad = (self.width - w) / 2;
        let padded = format!("{}{}", " ".repeat(pad), s);
        self.line(&padded)
    }

    /// Left and right text on the same line
    pub fn pair(&mut self, left: &str, right: &str) -> &mut Self {
        let lw = text_width(left);
        let rw = text_width(right);
        if lw + rw >= self.width {
            return self.line(&format!("{} {}", left, right));
        }
        let gap = self.width - lw - rw;
        let joined = format!("{}{}{}", left, " ".repeat(gap), right);
        self.line(&joined)
    }

    /// Fixed-width columns; the first is left aligned, the rest right aligned
    pub fn columns(&mut self, cells: &[(&str, usize)]) -> &mut Self {
        let mut row = String::new();
        for (idx, (text, width)) in cells.iter().enumerate() {
            if idx > 0 {
                row.push(' ');
            }
            row.push_str(&pad_text(text, *width, idx > 0));
        }
        self.line(row.trim_end())
    }

    /// Word-wrap text to the line width; words longer than a line are split
    pub fn wrapped(&mut self, s: &str) -> &mut Self {
        let mut current = String::new();
        for word in s.split_whitespace() {
            let mut word = word.to_string();
            while text_width(&word) > self.width && self.width > 0 {
                if !current.is_empty() {
                    self.line(&current);
                    current.clear();
                }
                let head: String = word.chars().take(self.width).collect();
                word = word.chars().skip(self.width).collect();
                self.line(&head);
            }
            if word.is_empty() {
                continue;
            }
            if current.is_empty() {
                current = word;
            } else if text_width(&current) + 1 + text_width(&word) <= self.width {
                current.push(' ');
                current.push_str(&word);
            } else {
                self.line(&current);
                current = word;
            }
        }
        if !current.is_empty() {
            self.line(&current);
        }
        self
    }

    pub fn eq_sep(&mut self) -> &mut Self {
        let sep = "=".repeat(self.width);
        self.line(&sep)
    }

    pub fn dash_sep(&mut self) -> &mut Self {
        let sep = "-".repeat(self.width);
        self.line(&sep)
    }

    pub fn finalize(self) -> String {
        self.buf
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }
}

impl Default for ReceiptLayout {
    fn default() -> Self {
        Self::new(32)
    }
}
