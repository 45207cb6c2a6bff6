//! Indentation-aware text builder shared by the emitters.

use polybind_core::ServiceDefinition;

/// Builds generated source text line by line.
#[derive(Debug, Clone)]
pub struct CodeWriter {
    out: String,
    level: usize,
    indent: &'static str,
}

impl CodeWriter {
    /// Create a writer with four-space indentation.
    pub fn new() -> Self {
        Self {
            out: String::new(),
            level: 0,
            indent: "    ",
        }
    }

    /// Write one line at the current indentation.
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.level {
                self.out.push_str(self.indent);
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

    /// Write `text` and indent the following lines.
    pub fn open(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.line(text);
        self.level += 1;
        self
    }

    /// Dedent and write `text`.
    pub fn close(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.level = self.level.saturating_sub(1);
        self.line(text)
    }

    pub fn indent(&mut self) -> &mut Self {
        self.level += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.level = self.level.saturating_sub(1);
        self
    }

    /// Write a `/** ... */` block. Nothing is written for empty docs.
    ///
    /// Embedded line breaks start new comment lines and `*/` is written as
    /// `*&#47;` so the text cannot end the comment early.
    pub fn doc_block(&mut self, lines: &[String]) -> &mut Self {
        if lines.is_empty() {
            return self;
        }
        self.line("/**");
        for doc in physical_lines(lines) {
            if doc.is_empty() {
                self.line(" *");
            } else {
                self.line(format!(" * {}", doc.replace("*/", "*&#47;")));
            }
        }
        self.line(" */")
    }

    /// Write `///` comment lines, one per line of each doc entry.
    pub fn line_docs(&mut self, lines: &[String]) -> &mut Self {
        for doc in physical_lines(lines) {
            if doc.is_empty() {
                self.line("///");
            } else {
                self.line(format!("/// {doc}"));
            }
        }
        self
    }

    /// Write the generated-file banner followed by a blank line.
    pub fn banner(&mut self, service: &ServiceDefinition) -> &mut Self {
        self.line(banner_line(service));
        self.line("// DO NOT EDIT - regenerate with: polybind generate");
        self.blank()
    }

    pub fn finish(self) -> String {
        self.out
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Split doc entries on `\r\n`, `\n` and `\r`.
fn physical_lines(lines: &[String]) -> impl Iterator<Item = &str> {
    lines
        .iter()
        .flat_map(|doc| doc.split("\r\n"))
        .flat_map(|line| line.split(['\r', '\n']))
        .map(str::trim_end)
}

/// First banner line, e.g. `// Auto-generated by polybind from Calculator 1.0`.
pub fn banner_line(service: &ServiceDefinition) -> String {
    match service.version {
        Some(version) => format!("// Auto-generated by polybind from {} {version}", service.name),
        None => format!("// Auto-generated by polybind from {}", service.name),
    }
}
