use serde_json::{Map, Value};

use crate::domain::{
    entities::{
        common::RelativePath,
        component::{FileComponent, FileKind, FileSource, RenderContext, StructuredFormat},
    },
    error::DomainError,
};
use crate::error::StrataResult;

/// Key under which JSON documents carry the marker.
pub const JSON_MARKER_KEY: &str = "//";

/// `.strata/tasks.json`: the owning project's task registry as JSON.
///
/// This is the document `strata run` executes from.
#[derive(Debug, Clone, Default)]
pub struct TasksManifest;

impl TasksManifest {
    pub fn new() -> Self {
        Self
    }

    pub fn into_component(self, path: impl AsRef<std::path::Path>) -> Result<FileComponent, DomainError> {
        let path = RelativePath::try_new(path)?;
        Ok(FileComponent::new(
            path,
            FileKind::Structured {
                format: StructuredFormat::Json,
            },
            self,
        ))
    }
}

impl FileSource for TasksManifest {
    fn render(&self, ctx: &RenderContext<'_>) -> StrataResult<Option<Vec<u8>>> {
        let failed = |e: serde_json::Error| DomainError::RenderFailed {
            path: ctx.path.to_string(),
            reason: e.to_string(),
        };

        let mut doc = Map::new();
        if let Some(marker) = ctx.marker() {
            doc.insert(JSON_MARKER_KEY.into(), Value::String(marker.into()));
        }
        if let Value::Object(registry) = serde_json::to_value(ctx.project.tasks()).map_err(failed)? {
            doc.extend(registry);
        }

        let mut out = serde_json::to_string_pretty(&Value::Object(doc)).map_err(failed)?;
        out.push('\n');
        Ok(Some(out.into_bytes()))
    }
}
