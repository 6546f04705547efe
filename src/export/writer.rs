// ABOUTME: Line buffer for .dig output with fixed four-space indentation
// ABOUTME: Used by the exporter and directive renderers to emit keyed lines

use std::fmt::Display;

const INDENT: &str = "    ";

#[derive(Debug, Default)]
pub struct DigWriter {
    buffer: String,
}

impl DigWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, level: usize, text: impl AsRef<str>) {
        for _ in 0..level {
            self.buffer.push_str(INDENT);
        }
        self.buffer.push_str(text.as_ref());
        self.buffer.push('\n');
    }

    /// `key: value` at the given depth
    pub fn entry(&mut self, level: usize, key: &str, value: impl Display) {
        self.line(level, format!("{}: {}", key, value));
    }

    /// Separates directive groups
    pub fn blank(&mut self) {
        self.buffer.push('\n');
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation_is_four_spaces_per_level() {
        let mut writer = DigWriter::new();
        writer.line(0, "+a:");
        writer.entry(2, "sh>", "echo hi");
        writer.blank();
        assert_eq!(writer.finish(), "+a:\n        sh>: echo hi\n\n");
    }
}
