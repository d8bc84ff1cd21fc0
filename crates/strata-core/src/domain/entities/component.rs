//! Components: the units that take part in synthesis.
//!
//! A project's registry holds [`ComponentEntry`] values, a tagged union of
//! generic lifecycle components and file components. Looking up files is a
//! variant match; there is no runtime type inspection.
//!
//! Ownership moves into the project on registration, so a component belongs
//! to exactly one project and can never be re-parented.

use std::fmt;
use std::path::Path;

use crate::domain::{
    entities::{
        common::{Permissions, RelativePath},
        project::{ProjectId, ProjectState},
    },
    error::DomainError,
    marker::{self, CommentStyle},
};
use crate::error::StrataResult;

/// Lifecycle contract for generic components.
///
/// Hooks run in registration order. `pre_synthesize` may adjust the owning
/// project (tasks, ignore patterns, exclusions); later hooks only observe it.
pub trait Component: Send {
    /// Short label used in logs.
    fn name(&self) -> &str;

    fn pre_synthesize(&mut self, _project: &mut ProjectState) -> StrataResult<()> {
        Ok(())
    }

    fn synthesize(&mut self, _project: &ProjectState) -> StrataResult<()> {
        Ok(())
    }

    fn post_synthesize(&mut self, _project: &ProjectState) -> StrataResult<()> {
        Ok(())
    }
}

/// Stable handle to a registered component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId {
    pub(crate) project: ProjectId,
    pub(crate) seq: u64,
}

impl ComponentId {
    pub fn project(&self) -> ProjectId {
        self.project
    }
}

// ── Files ─────────────────────────────────────────────────────────────────────

/// Structured formats with a dedicated renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredFormat {
    Json,
    Toml,
}

/// Capability tag of a file component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Line-oriented text with a comment syntax.
    Text { comment: CommentStyle },
    /// Serialized data.
    Structured { format: StructuredFormat },
    /// Written once, then owned by the user.
    Sample,
}

/// What a file source sees while rendering.
pub struct RenderContext<'a> {
    pub project: &'a ProjectState,
    pub path: &'a RelativePath,
    marker: Option<&'static str>,
}

impl<'a> RenderContext<'a> {
    /// The marker the rendered bytes must contain, if the file is marked.
    pub fn marker(&self) -> Option<&'static str> {
        self.marker
    }
}

/// Produces the bytes of a file component.
///
/// Returning `Ok(None)` means "nothing to write this pass".
pub trait FileSource: Send {
    fn render(&self, ctx: &RenderContext<'_>) -> StrataResult<Option<Vec<u8>>>;
}

/// A component that owns one file of the project.
pub struct FileComponent {
    path: RelativePath,
    kind: FileKind,
    marker: bool,
    permissions: Permissions,
    force: bool,
    source: Box<dyn FileSource>,
}

impl FileComponent {
    /// Create a file component.
    ///
    /// Marked and read-only by default, except samples (never marked, left
    /// writable) and comment-less text (cannot carry a marker).
    pub fn new(path: RelativePath, kind: FileKind, source: impl FileSource + 'static) -> Self {
        let marker = match kind {
            FileKind::Sample => false,
            FileKind::Text { comment } => comment != CommentStyle::None,
            FileKind::Structured { .. } => true,
        };
        let permissions = if marker {
            Permissions::read_only()
        } else {
            Permissions::read_write()
        };
        Self {
            path,
            kind,
            marker,
            permissions,
            force: false,
            source: Box::new(source),
        }
    }

    pub fn with_marker(mut self, marker: bool) -> Self {
        self.marker = marker && self.kind != FileKind::Sample;
        self
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// Overwrite an existing unmarked file at this path.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn path(&self) -> &RelativePath {
        &self.path
    }

    /// Absolute path under `outdir`.
    pub fn absolute_path(&self, outdir: &Path) -> std::path::PathBuf {
        outdir.join(self.path.as_path())
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn has_marker(&self) -> bool {
        self.marker
    }

    pub fn permissions(&self) -> Permissions {
        self.permissions
    }

    pub fn force(&self) -> bool {
        self.force
    }

    pub fn is_sample(&self) -> bool {
        self.kind == FileKind::Sample
    }

    /// Render the file for `project`, enforcing the marker protocol.
    pub fn render(&self, project: &ProjectState) -> StrataResult<Option<Vec<u8>>> {
        let ctx = RenderContext {
            project,
            path: &self.path,
            marker: self.marker.then_some(marker::MARKER),
        };
        let Some(bytes) = self.source.render(&ctx)? else {
            return Ok(None);
        };
        if self.marker && !marker::contains_marker(&bytes) {
            return Err(DomainError::MissingMarker {
                path: self.path.to_string(),
            }
            .into());
        }
        Ok(Some(bytes))
    }
}

impl fmt::Debug for FileComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileComponent")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("marker", &self.marker)
            .field("permissions", &self.permissions)
            .field("force", &self.force)
            .finish_non_exhaustive()
    }
}

// ── Registry entries ──────────────────────────────────────────────────────────

/// A registered component.
pub enum ComponentEntry {
    Generic(Box<dyn Component>),
    File(FileComponent),
}

impl ComponentEntry {
    pub fn name(&self) -> String {
        match self {
            Self::Generic(c) => c.name().to_string(),
            Self::File(f) => f.path().to_string(),
        }
    }

    pub fn as_file(&self) -> Option<&FileComponent> {
        match self {
            Self::File(f) => Some(f),
            Self::Generic(_) => None,
        }
    }

    pub(crate) fn pre_synthesize(&mut self, project: &mut ProjectState) -> StrataResult<()> {
        match self {
            Self::Generic(c) => c.pre_synthesize(project),
            Self::File(_) => Ok(()),
        }
    }

    pub(crate) fn post_synthesize(&mut self, project: &ProjectState) -> StrataResult<()> {
        match self {
            Self::Generic(c) => c.post_synthesize(project),
            Self::File(_) => Ok(()),
        }
    }
}

impl fmt::Debug for ComponentEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic(c) => f.debug_tuple("Generic").field(&c.name()).finish(),
            Self::File(file) => f.debug_tuple("File").field(file).finish(),
        }
    }
}

/// A component entry together with its handle.
#[derive(Debug)]
pub(crate) struct Registered {
    pub(crate) id: ComponentId,
    pub(crate) entry: ComponentEntry,
}
