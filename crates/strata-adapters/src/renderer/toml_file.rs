//! TOML file component backed by the `toml` crate.

use strata_core::{
    domain::{
        CommentStyle, DomainError, FileComponent, FileKind, FileSource, RelativePath,
        RenderContext, StructuredFormat,
    },
    error::StrataResult,
};

/// A TOML document. When marked, the marker is a leading `#` comment.
#[derive(Debug, Clone)]
pub struct TomlFile {
    table: toml::Table,
}

impl TomlFile {
    pub fn new(table: toml::Table) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &toml::Table {
        &self.table
    }

    pub fn into_component(self, path: impl AsRef<std::path::Path>) -> Result<FileComponent, DomainError> {
        let path = RelativePath::try_new(path)?;
        Ok(FileComponent::new(
            path,
            FileKind::Structured {
                format: StructuredFormat::Toml,
            },
            self,
        ))
    }
}

impl FileSource for TomlFile {
    fn render(&self, ctx: &RenderContext<'_>) -> StrataResult<Option<Vec<u8>>> {
        let body = toml::to_string(&self.table).map_err(|e| DomainError::RenderFailed {
            path: ctx.path.to_string(),
            reason: e.to_string(),
        })?;

        let mut out = String::new();
        if let Some(header) = ctx.marker().and_then(|m| CommentStyle::Hash.comment(m)) {
            out.push_str(&header);
            out.push_str("\n\n");
        }
        out.push_str(&body);
        Ok(Some(out.into_bytes()))
    }
}
