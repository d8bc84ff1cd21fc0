//! JSON file component backed by `serde_json`.

use serde::Serialize;
use serde_json::{Map, Value};

use strata_core::{
    domain::{
        DomainError, FileComponent, FileKind, FileSource, JSON_MARKER_KEY, RelativePath,
        RenderContext, StructuredFormat,
    },
    error::StrataResult,
};

/// A JSON document. When marked, the marker is stored under the `"//"` key,
/// so the document must be an object.
#[derive(Debug, Clone)]
pub struct JsonFile {
    value: Value,
}

impl JsonFile {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Build from anything serializable.
    pub fn from_serialize(value: &impl Serialize) -> Result<Self, DomainError> {
        serde_json::to_value(value)
            .map(Self::new)
            .map_err(|e| DomainError::InvalidManifest(format!("value is not valid JSON: {e}")))
    }

    pub fn value(&self) -> &Value {
        &self.value
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

impl FileSource for JsonFile {
    fn render(&self, ctx: &RenderContext<'_>) -> StrataResult<Option<Vec<u8>>> {
        let failed = |reason: String| DomainError::RenderFailed {
            path: ctx.path.to_string(),
            reason,
        };

        let doc = match (ctx.marker(), &self.value) {
            (Some(marker), Value::Object(fields)) => {
                let mut doc = Map::new();
                doc.insert(JSON_MARKER_KEY.into(), Value::String(marker.into()));
                doc.extend(fields.clone());
                Value::Object(doc)
            }
            (Some(_), _) => {
                return Err(failed("only JSON objects can carry the generated-file marker".into()).into());
            }
            (None, value) => value.clone(),
        };

        let mut out = serde_json::to_string_pretty(&doc).map_err(|e| failed(e.to_string()))?;
        out.push('\n');
        Ok(Some(out.into_bytes()))
    }
}
