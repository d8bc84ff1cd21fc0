use crate::domain::{
    entities::{
        common::RelativePath,
        component::{FileComponent, FileKind, FileSource, RenderContext},
    },
    error::DomainError,
};
use crate::error::StrataResult;

/// Starter content written once and then left to the user.
///
/// Never marked, so cleanup never deletes it and later passes never
/// overwrite it.
#[derive(Debug, Clone)]
pub struct SampleFile {
    contents: String,
}

impl SampleFile {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
        }
    }

    pub fn into_component(self, path: impl AsRef<std::path::Path>) -> Result<FileComponent, DomainError> {
        let path = RelativePath::try_new(path)?;
        Ok(FileComponent::new(path, FileKind::Sample, self))
    }
}

impl FileSource for SampleFile {
    fn render(&self, _ctx: &RenderContext<'_>) -> StrataResult<Option<Vec<u8>>> {
        Ok(Some(self.contents.clone().into_bytes()))
    }
}
