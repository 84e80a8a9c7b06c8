//! Text helpers shared by the emitters.

/// Line-oriented source buffer with two-space indentation.
///
/// Writing into a `String` cannot fail, so the buffer exposes no `Result`.
#[derive(Debug, Default)]
pub struct SourceBuilder {
    out: String,
    depth: usize,
}

impl SourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line at the current depth.
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.out.push_str("  ");
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.out.push('\n');
        self
    }

    /// Append a line, then indent what follows.
    pub fn open(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.line(text);
        self.depth += 1;
        self
    }

    /// Dedent, then append a line.
    pub fn close(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line(text)
    }

    /// Dedent for one line, then indent again (`} else {`).
    pub fn reopen(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
        self.depth += 1;
        self
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Single-quoted TypeScript string literal.
pub fn ts_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Escape text for an HTML text node or attribute.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Collapse all whitespace runs (newlines included) to single spaces.
pub fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
