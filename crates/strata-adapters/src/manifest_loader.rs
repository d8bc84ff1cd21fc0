//! `strata.toml` manifest loader.
//!
//! Parses a declarative project description and builds the matching
//! [`ProjectTree`], ready for a synthesis pass.
//!
//! # `strata.toml` format
//!
//! ```toml
//! [project]
//! name = "demo"
//! gitignore = ["/target", "*.log"]
//! exclude_from_cleanup = ["vendor/**"]
//!
//! [features]          # optional, both default to true
//! gitignore = true
//! tasks_manifest = true
//!
//! [env]               # environment shared by every task
//! RUST_LOG = "info"
//!
//! [[files]]
//! path = "README.md"
//! type = "text"                  # text | json | toml | sample
//! comment = "html"               # hash | slash | html | none
//! lines = ["# demo"]
//! readonly = true                # optional
//! executable = false             # optional
//! marker = true                  # optional
//!
//! [tasks.build]
//! description = "Compile"
//! steps = [{ exec = "cargo build" }]
//!
//! [tasks.ci]
//! steps = [{ spawn = "build" }, { exec = "cargo test", name = "test" }]
//!
//! [[subprojects]]
//! name = "docs"
//! outdir = "docs"
//! # ...same body keys as the root project
//! ```

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument};

use strata_core::domain::{
    CommentStyle, DomainError, Features, FileComponent, ProjectId, ProjectOptions, ProjectTree,
    SampleFile, Step, SubprojectOptions, TaskOptions, TextFile,
};

use crate::renderer::{JsonFile, TomlFile};

/// Conventional manifest file name.
pub const MANIFEST_FILE: &str = "strata.toml";

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised `strata.toml`.
#[derive(Debug, Deserialize, Clone)]
pub struct ProjectManifest {
    pub project: ProjectSection,
    #[serde(flatten)]
    pub body: ProjectBody,
}

/// `[project]` section.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    pub name: String,
    #[serde(default)]
    pub gitignore: Vec<String>,
    #[serde(default)]
    pub exclude_from_cleanup: Vec<String>,
}

/// Keys shared by the root project and every sub-project.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProjectBody {
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub tasks: BTreeMap<String, TaskEntry>,
    #[serde(default)]
    pub subprojects: Vec<SubprojectManifest>,
}

/// One entry under `[[subprojects]]`.
#[derive(Debug, Deserialize, Clone)]
pub struct SubprojectManifest {
    pub name: String,
    /// Relative to the parent's outdir.
    pub outdir: PathBuf,
    #[serde(default)]
    pub gitignore: Vec<String>,
    #[serde(default)]
    pub exclude_from_cleanup: Vec<String>,
    #[serde(flatten)]
    pub body: ProjectBody,
}

/// One entry under `[[files]]`.
#[derive(Debug, Deserialize, Clone)]
pub struct FileEntry {
    pub path: String,
    #[serde(flatten)]
    pub body: FileBody,
    pub readonly: Option<bool>,
    #[serde(default)]
    pub executable: bool,
    /// Overrides whether the file carries the generated-file marker.
    pub marker: Option<bool>,
    /// Overwrite an unmarked file at the same path.
    #[serde(default)]
    pub force: bool,
}

/// File contents, selected by `type`.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FileBody {
    Text {
        #[serde(default)]
        lines: Vec<String>,
        #[serde(default)]
        comment: CommentStyle,
    },
    Json {
        data: serde_json::Value,
    },
    Toml {
        data: toml::Table,
    },
    Sample {
        contents: String,
    },
}

/// One entry under `[tasks.<name>]`.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct TaskEntry {
    pub description: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
    pub condition: Option<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    pub cwd: Option<PathBuf>,
    #[serde(default)]
    pub required_env: Vec<String>,
}

impl From<TaskEntry> for TaskOptions {
    fn from(entry: TaskEntry) -> Self {
        TaskOptions {
            description: entry.description,
            steps: entry.steps,
            condition: entry.condition,
            env: entry.env,
            cwd: entry.cwd,
            required_env: entry.required_env,
        }
    }
}

impl FileEntry {
    fn into_component(self) -> Result<FileComponent, DomainError> {
        let component = match self.body {
            FileBody::Text { lines, comment } => {
                TextFile::new(comment).with_lines(lines).into_component(&self.path)?
            }
            FileBody::Json { data } => JsonFile::new(data).into_component(&self.path)?,
            FileBody::Toml { data } => TomlFile::new(data).into_component(&self.path)?,
            FileBody::Sample { contents } => SampleFile::new(contents).into_component(&self.path)?,
        };

        let mut permissions = component.permissions().with_executable(self.executable);
        if let Some(readonly) = self.readonly {
            permissions = permissions.with_readonly(readonly);
        }
        let mut component = component.with_permissions(permissions).with_force(self.force);
        if let Some(marker) = self.marker {
            component = component.with_marker(marker);
        }
        Ok(component)
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads a [`ProjectTree`] from a `strata.toml` file.
///
/// The root project's outdir is the directory containing the manifest.
///
/// # Example
///
/// ```no_run
/// use strata_adapters::ManifestLoader;
///
/// let tree = ManifestLoader::new("./strata.toml").load_tree()?;
/// println!("{} project(s)", tree.projects().count());
/// # Ok::<(), strata_core::domain::DomainError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    path: PathBuf,
}

impl ManifestLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loader for `dir/strata.toml`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(MANIFEST_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the manifest without building anything.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidManifest`] if the file is missing,
    /// unreadable, or not a valid manifest.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<ProjectManifest, DomainError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            DomainError::InvalidManifest(format!("failed to read '{}': {e}", self.path.display()))
        })?;
        parse_manifest(&raw).map_err(|e| match e {
            DomainError::InvalidManifest(msg) => {
                DomainError::InvalidManifest(format!("{}: {msg}", self.path.display()))
            }
            other => other,
        })
    }

    /// Load the manifest and build its project tree.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load_tree(&self) -> Result<ProjectTree, DomainError> {
        let manifest = self.load()?;
        let outdir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let cwd = std::env::current_dir().map_err(|e| {
            DomainError::InvalidManifest(format!("cannot determine working directory: {e}"))
        })?;
        build_tree(manifest, outdir, &cwd)
    }
}

/// Parse manifest text.
pub fn parse_manifest(raw: &str) -> Result<ProjectManifest, DomainError> {
    toml::from_str(raw).map_err(|e| DomainError::InvalidManifest(e.to_string()))
}

/// Build a tree from a parsed manifest rooted at `outdir`.
///
/// A relative `outdir` is resolved against `cwd`.
pub fn build_tree(
    manifest: ProjectManifest,
    outdir: &Path,
    cwd: &Path,
) -> Result<ProjectTree, DomainError> {
    let ProjectManifest { project, body } = manifest;

    let options = ProjectOptions::new(project.name)
        .with_outdir(outdir)
        .with_features(body.features);
    let mut tree = ProjectTree::new_in(options, cwd)?;
    let root = tree.root();

    apply_project(&mut tree, root, project.gitignore, project.exclude_from_cleanup, body)?;
    debug!(projects = tree.projects().count(), "built project tree");
    Ok(tree)
}

fn apply_project(
    tree: &mut ProjectTree,
    id: ProjectId,
    gitignore: Vec<String>,
    excludes: Vec<String>,
    body: ProjectBody,
) -> Result<(), DomainError> {
    for pattern in gitignore {
        tree.add_git_ignore(id, pattern)?;
    }
    tree.add_exclude_from_cleanup(id, excludes)?;

    let state = tree.project_mut(id)?;
    for (key, value) in body.env {
        state.tasks_mut().add_environment(key, value);
    }
    for (name, entry) in body.tasks {
        state.add_task(name, entry.into())?;
    }

    for file in body.files {
        tree.add_file(id, file.into_component()?)?;
    }

    for sub in body.subprojects {
        let options = SubprojectOptions::new(sub.name, sub.outdir).with_features(sub.body.features);
        let child = tree.add_subproject(id, options)?;
        apply_project(tree, child, sub.gitignore, sub.exclude_from_cleanup, sub.body)?;
    }
    Ok(())
}
