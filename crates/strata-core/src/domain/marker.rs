//! Generated-file marker protocol.
//!
//! A file is *owned* by strata when its bytes contain [`MARKER`]. Only owned
//! files are deleted by cleanup or overwritten without `--force`; everything
//! else at a path is treated as hand-authored.

/// Tag embedded in every marker-carrying generated file.
pub const MARKER: &str = "~~ Generated by strata. To modify, edit strata.toml and run \"strata synth\".";

/// How a text format spells a line comment, used for the marker header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStyle {
    /// `# ...` (shell, TOML, YAML, gitignore)
    #[default]
    Hash,
    /// `// ...` (C-family, Rust)
    Slash,
    /// `<!-- ... -->` (Markdown, HTML, XML)
    Html,
    /// The format has no comments; the file cannot carry a header.
    None,
}

impl CommentStyle {
    /// Render `text` as a single comment line, if the style supports one.
    pub fn comment(&self, text: &str) -> Option<String> {
        match self {
            Self::Hash => Some(format!("# {text}")),
            Self::Slash => Some(format!("// {text}")),
            Self::Html => Some(format!("<!-- {text} -->")),
            Self::None => None,
        }
    }

    /// The marker header line for this style.
    pub fn marker_header(&self) -> Option<String> {
        self.comment(MARKER)
    }
}

/// `true` when `bytes` contain the generated-file marker.
pub fn contains_marker(bytes: &[u8]) -> bool {
    let needle = MARKER.as_bytes();
    bytes.len() >= needle.len() && bytes.windows(needle.len()).any(|w| w == needle)
}
