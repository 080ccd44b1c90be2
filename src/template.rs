//! Minimal `{{ placeholder }}` templating for the home page.

use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Template used when no `index.html` is found on disk.
const DEFAULT_INDEX: &str = include_str!("../templates/index.html");

/// A loaded template. Placeholders are `{{ name }}`; values are HTML-escaped
/// and unknown names render as empty strings.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
}

impl Template {
    /// Create a template from source text.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Load `index.html` from `dir`, falling back to the embedded page when the
    /// file does not exist.
    pub fn load_index(dir: &Path) -> std::io::Result<Self> {
        let path = dir.join("index.html");
        match std::fs::read_to_string(&path) {
            Ok(source) => {
                info!(path = %path.display(), "loaded home page template");
                Ok(Self::new(source))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "home page template not found, using built-in page");
                Ok(Self::new(DEFAULT_INDEX))
            }
            Err(e) => Err(e),
        }
    }

    /// Render with the given values.
    pub fn render(&self, values: &HashMap<&str, String>) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source.as_str();

        while let Some(start) = rest.find("{{") {
            let Some(len) = rest[start + 2..].find("}}") else {
                break;
            };
            out.push_str(&rest[..start]);

            let key = rest[start + 2..start + 2 + len].trim();
            if let Some(value) = values.get(key) {
                out.push_str(&escape_html(value));
            }
            rest = &rest[start + 2 + len + 2..];
        }

        out.push_str(rest);
        out
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX)
    }
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
