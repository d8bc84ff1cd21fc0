use crate::domain::{
    entities::{
        common::RelativePath,
        component::{FileComponent, FileKind, FileSource, RenderContext},
    },
    error::DomainError,
    marker::CommentStyle,
};
use crate::error::StrataResult;

/// A line-oriented text file.
///
/// When marked, the first line is the marker rendered as a comment.
#[derive(Debug, Clone, Default)]
pub struct TextFile {
    lines: Vec<String>,
    comment: CommentStyle,
}

impl TextFile {
    pub fn new(comment: CommentStyle) -> Self {
        Self {
            lines: Vec::new(),
            comment,
        }
    }

    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn add_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Wrap into a file component at `path`.
    pub fn into_component(self, path: impl AsRef<std::path::Path>) -> Result<FileComponent, DomainError> {
        let path = RelativePath::try_new(path)?;
        let kind = FileKind::Text {
            comment: self.comment,
        };
        Ok(FileComponent::new(path, kind, self))
    }
}

impl FileSource for TextFile {
    fn render(&self, ctx: &RenderContext<'_>) -> StrataResult<Option<Vec<u8>>> {
        let mut out = String::new();
        if let Some(header) = ctx.marker().and_then(|m| self.comment.comment(m)) {
            out.push_str(&header);
            out.push('\n');
        }
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        Ok(Some(out.into_bytes()))
    }
}
