use crate::domain::{
    entities::{
        common::RelativePath,
        component::{FileComponent, FileKind, FileSource, RenderContext},
    },
    error::DomainError,
    marker::CommentStyle,
};
use crate::error::StrataResult;

/// `.gitignore` rendered from the owning project's ignore patterns.
///
/// Patterns are read at render time, so anything added in `pre_synthesize`
/// still lands in the file.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFile;

impl IgnoreFile {
    pub fn new() -> Self {
        Self
    }

    pub fn into_component(self, path: impl AsRef<std::path::Path>) -> Result<FileComponent, DomainError> {
        let path = RelativePath::try_new(path)?;
        Ok(FileComponent::new(
            path,
            FileKind::Text {
                comment: CommentStyle::Hash,
            },
            self,
        ))
    }
}

impl FileSource for IgnoreFile {
    fn render(&self, ctx: &RenderContext<'_>) -> StrataResult<Option<Vec<u8>>> {
        let mut out = String::new();
        if let Some(header) = ctx.marker().and_then(|m| CommentStyle::Hash.comment(m)) {
            out.push_str(&header);
            out.push('\n');
        }
        for pattern in ctx.project.gitignore_patterns() {
            out.push_str(pattern);
            out.push('\n');
        }
        Ok(Some(out.into_bytes()))
    }
}
