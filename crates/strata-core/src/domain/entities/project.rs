//! The project tree aggregate.
//!
//! Projects live in an arena owned by [`ProjectTree`]; parent and child links
//! are [`ProjectId`] indices, so there are no owning back-references. Every
//! id carries the id of the tree that minted it, which lets the tree reject
//! handles from a different tree instead of silently indexing into itself.
//!
//! # Outdir rules
//!
//! - The root outdir is explicit, an ephemeral temp directory, or the
//!   working directory, in that order.
//! - A sub-project outdir is relative to its parent, must stay inside it,
//!   must differ from it, and must neither equal nor nest with a sibling's.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::{
        common::{RelativePath, normalize_path},
        component::{Component, ComponentEntry, ComponentId, FileComponent, Registered},
        task::{Task, TaskOptions},
        task_registry::TaskRegistry,
    },
    error::DomainError,
    files::{IgnoreFile, TasksManifest},
    validation::DomainValidator as validator,
};
use crate::error::{StrataError, StrataResult};

/// Where the tasks manifest is written, relative to each project.
pub const TASKS_MANIFEST_PATH: &str = ".strata/tasks.json";

/// Handle to a project inside a [`ProjectTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectId {
    tree: Uuid,
    index: usize,
}

impl ProjectId {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Optional built-in components, each switched on or off explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Register a `.gitignore` rendered from the project's ignore patterns.
    pub gitignore: bool,
    /// Register `.strata/tasks.json` rendered from the task registry.
    pub tasks_manifest: bool,
}

impl Features {
    /// Every built-in switched off.
    pub const fn none() -> Self {
        Self {
            gitignore: false,
            tasks_manifest: false,
        }
    }
}

impl Default for Features {
    fn default() -> Self {
        Self {
            gitignore: true,
            tasks_manifest: true,
        }
    }
}

/// Options for the root project.
#[derive(Debug, Clone)]
pub struct ProjectOptions {
    pub name: String,
    /// Absolute, or relative to the working directory.
    pub outdir: Option<PathBuf>,
    /// Use a fresh directory under the system temp dir when no outdir is given.
    pub ephemeral_outdir: bool,
    pub features: Features,
}

impl ProjectOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outdir: None,
            ephemeral_outdir: false,
            features: Features::default(),
        }
    }

    pub fn with_outdir(mut self, outdir: impl Into<PathBuf>) -> Self {
        self.outdir = Some(outdir.into());
        self
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral_outdir = true;
        self
    }

    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }
}

/// Options for a sub-project.
#[derive(Debug, Clone)]
pub struct SubprojectOptions {
    pub name: String,
    /// Relative to the parent's outdir.
    pub outdir: PathBuf,
    pub features: Features,
}

impl SubprojectOptions {
    pub fn new(name: impl Into<String>, outdir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            outdir: outdir.into(),
            features: Features::default(),
        }
    }

    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }
}

// ── Project state ─────────────────────────────────────────────────────────────

/// Everything about a project except its components.
///
/// This is what component hooks and file sources see.
#[derive(Debug)]
pub struct ProjectState {
    id: ProjectId,
    name: String,
    outdir: PathBuf,
    relative_outdir: Option<RelativePath>,
    parent: Option<ProjectId>,
    children: Vec<ProjectId>,
    features: Features,
    tasks: TaskRegistry,
    cleanup_excludes: Vec<String>,
    gitignore: Vec<String>,
}

impl ProjectState {
    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute output directory.
    pub fn outdir(&self) -> &Path {
        &self.outdir
    }

    /// Outdir relative to the parent; `None` for the root.
    pub fn relative_outdir(&self) -> Option<&RelativePath> {
        self.relative_outdir.as_ref()
    }

    pub fn parent(&self) -> Option<ProjectId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Sub-projects in registration order.
    pub fn children(&self) -> &[ProjectId] {
        &self.children
    }

    pub fn features(&self) -> Features {
        self.features
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut TaskRegistry {
        &mut self.tasks
    }

    pub fn add_task(
        &mut self,
        name: impl Into<String>,
        options: TaskOptions,
    ) -> Result<&mut Task, DomainError> {
        self.tasks.add_task(name, options)
    }

    pub fn remove_task(&mut self, name: &str) -> Result<Option<Task>, DomainError> {
        self.tasks.remove_task(name)
    }

    /// Cleanup exclusion globs, relative to the outdir.
    pub fn cleanup_excludes(&self) -> &[String] {
        &self.cleanup_excludes
    }

    /// Protect paths matching `glob` from cleanup.
    pub fn add_exclude_from_cleanup(&mut self, glob: impl Into<String>) -> Result<(), DomainError> {
        let glob = glob.into();
        validator::validate_glob(&glob)?;
        if !self.cleanup_excludes.contains(&glob) {
            self.cleanup_excludes.push(glob);
        }
        Ok(())
    }

    /// Patterns rendered into `.gitignore`, in insertion order.
    pub fn gitignore_patterns(&self) -> &[String] {
        &self.gitignore
    }

    pub fn add_git_ignore(&mut self, pattern: impl Into<String>) {
        let pattern = pattern.into();
        if !self.gitignore.contains(&pattern) {
            self.gitignore.push(pattern);
        }
    }
}

/// One arena slot.
#[derive(Debug)]
pub(crate) struct ProjectNode {
    pub(crate) state: ProjectState,
    pub(crate) components: Vec<Registered>,
}

// ── Tree ──────────────────────────────────────────────────────────────────────

/// The project tree: root project, nested sub-projects and their components.
#[derive(Debug)]
pub struct ProjectTree {
    id: Uuid,
    nodes: Vec<ProjectNode>,
    next_component: u64,
}

impl ProjectTree {
    /// Create a tree rooted at a new project, resolving a relative or missing
    /// outdir against the process working directory.
    pub fn new(options: ProjectOptions) -> StrataResult<Self> {
        let cwd = std::env::current_dir().map_err(|e| StrataError::Configuration {
            message: format!("cannot determine working directory: {e}"),
        })?;
        Ok(Self::new_in(options, &cwd)?)
    }

    /// Create a tree rooted at a new project, resolving against `cwd`.
    pub fn new_in(options: ProjectOptions, cwd: &Path) -> Result<Self, DomainError> {
        if options.name.trim().is_empty() {
            return Err(DomainError::EmptyProjectName);
        }

        let tree_id = Uuid::new_v4();
        let outdir = match (&options.outdir, options.ephemeral_outdir) {
            (Some(dir), _) => normalize_path(&cwd.join(dir)),
            (None, true) => std::env::temp_dir().join(format!("strata-{}", tree_id.simple())),
            (None, false) => normalize_path(cwd),
        };

        let mut tree = Self {
            id: tree_id,
            nodes: Vec::new(),
            next_component: 0,
        };
        let root = tree.push_node(options.name, outdir, None, None, options.features);
        tree.register_builtins(root)?;
        Ok(tree)
    }

    /// Handle of the root project.
    pub fn root(&self) -> ProjectId {
        ProjectId {
            tree: self.id,
            index: 0,
        }
    }

    /// Register a sub-project under `parent`.
    pub fn add_subproject(
        &mut self,
        parent: ProjectId,
        options: SubprojectOptions,
    ) -> Result<ProjectId, DomainError> {
        if parent.tree != self.id || parent.index >= self.nodes.len() {
            return Err(DomainError::ParentMismatch {
                project: options.name,
            });
        }
        if options.name.trim().is_empty() {
            return Err(DomainError::EmptyProjectName);
        }
        if options.outdir.is_absolute() || options.outdir.has_root() {
            return Err(DomainError::OutdirNotRelative {
                project: options.name,
                path: options.outdir,
            });
        }

        let parent_state = &self.nodes[parent.index].state;
        let relative = match RelativePath::try_new(&options.outdir) {
            Ok(rel) => rel,
            Err(DomainError::InvalidPath { reason, .. }) if reason.contains("escapes") => {
                return Err(DomainError::OutdirEscapesParent {
                    project: options.name,
                    path: options.outdir,
                });
            }
            Err(_) => {
                // "." and friends resolve to the parent's own directory.
                return Err(DomainError::OutdirCollision {
                    project: options.name,
                    existing: parent_state.name.clone(),
                    path: parent_state.outdir.clone(),
                });
            }
        };
        let outdir = parent_state.outdir.join(relative.as_path());

        for sibling in &parent_state.children {
            let sibling = &self.nodes[sibling.index].state;
            if sibling.outdir == outdir {
                return Err(DomainError::OutdirCollision {
                    project: options.name,
                    existing: sibling.name.clone(),
                    path: outdir,
                });
            }
            if sibling.outdir.starts_with(&outdir) || outdir.starts_with(&sibling.outdir) {
                return Err(DomainError::OutdirOverlap {
                    project: options.name,
                    sibling: sibling.name.clone(),
                    path: outdir,
                });
            }
        }

        let id = self.push_node(
            options.name,
            outdir,
            Some(relative),
            Some(parent),
            options.features,
        );
        self.nodes[parent.index].state.children.push(id);
        self.register_builtins(id)?;
        Ok(id)
    }

    pub fn project(&self, id: ProjectId) -> Result<&ProjectState, DomainError> {
        Ok(&self.node(id)?.state)
    }

    pub fn project_mut(&mut self, id: ProjectId) -> Result<&mut ProjectState, DomainError> {
        Ok(&mut self.node_mut(id)?.state)
    }

    /// All projects in registration order, root first.
    pub fn projects(&self) -> impl Iterator<Item = &ProjectState> {
        self.nodes.iter().map(|n| &n.state)
    }

    // ── Components ────────────────────────────────────────────────────────

    /// Register a generic component with `project`.
    pub fn add_component(
        &mut self,
        project: ProjectId,
        component: impl Component + 'static,
    ) -> Result<ComponentId, DomainError> {
        self.register(project, ComponentEntry::Generic(Box::new(component)))
    }

    /// Register a file component with `project`.
    pub fn add_file(
        &mut self,
        project: ProjectId,
        file: FileComponent,
    ) -> Result<ComponentId, DomainError> {
        self.register(project, ComponentEntry::File(file))
    }

    pub fn component(&self, id: ComponentId) -> Option<&ComponentEntry> {
        self.node(id.project)
            .ok()?
            .components
            .iter()
            .find(|r| r.id == id)
            .map(|r| &r.entry)
    }

    /// Components of `project` in registration order.
    pub fn components(
        &self,
        project: ProjectId,
    ) -> Result<impl Iterator<Item = &ComponentEntry>, DomainError> {
        Ok(self.node(project)?.components.iter().map(|r| &r.entry))
    }

    /// File components of `project`, sorted by path.
    pub fn files(&self, project: ProjectId) -> Result<Vec<&FileComponent>, DomainError> {
        let mut files: Vec<_> = self
            .node(project)?
            .components
            .iter()
            .filter_map(|r| r.entry.as_file())
            .collect();
        files.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(files)
    }

    /// Find the file component generating `path`.
    ///
    /// `path` is absolute or relative to `project`'s outdir. Matching is exact
    /// on the resolved absolute path: `project` first, then its sub-projects
    /// recursively in registration order.
    pub fn find_file(
        &self,
        project: ProjectId,
        path: impl AsRef<Path>,
    ) -> Option<(ProjectId, &FileComponent)> {
        let node = self.node(project).ok()?;
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            normalize_path(path)
        } else {
            normalize_path(&node.state.outdir.join(path))
        };
        self.find_absolute(project, &absolute)
    }

    /// Remove the file component generating `path` from `project`, if any.
    ///
    /// The file itself is deleted by the next synthesis pass.
    pub fn try_remove_file(
        &mut self,
        project: ProjectId,
        path: impl AsRef<Path>,
    ) -> Result<Option<FileComponent>, DomainError> {
        let rel = RelativePath::try_new(path)?;
        let node = self.node_mut(project)?;
        let Some(pos) = node
            .components
            .iter()
            .position(|r| r.entry.as_file().is_some_and(|f| f.path() == &rel))
        else {
            return Ok(None);
        };
        match node.components.remove(pos).entry {
            ComponentEntry::File(file) => Ok(Some(file)),
            ComponentEntry::Generic(_) => Ok(None),
        }
    }

    // ── Project-scoped conveniences ───────────────────────────────────────

    pub fn add_task(
        &mut self,
        project: ProjectId,
        name: impl Into<String>,
        options: TaskOptions,
    ) -> Result<&mut Task, DomainError> {
        self.project_mut(project)?.add_task(name, options)
    }

    pub fn remove_task(
        &mut self,
        project: ProjectId,
        name: &str,
    ) -> Result<Option<Task>, DomainError> {
        self.project_mut(project)?.remove_task(name)
    }

    pub fn add_git_ignore(
        &mut self,
        project: ProjectId,
        pattern: impl Into<String>,
    ) -> Result<(), DomainError> {
        self.project_mut(project)?.add_git_ignore(pattern);
        Ok(())
    }

    pub fn add_exclude_from_cleanup<I, S>(
        &mut self,
        project: ProjectId,
        globs: I,
    ) -> Result<(), DomainError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let state = self.project_mut(project)?;
        for glob in globs {
            state.add_exclude_from_cleanup(glob)?;
        }
        Ok(())
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Project-level pre-synthesis check: one file component per path.
    pub(crate) fn validate_file_claims(&self, project: ProjectId) -> Result<(), DomainError> {
        let node = self.node(project)?;
        let mut seen = std::collections::HashSet::new();
        for file in node.components.iter().filter_map(|r| r.entry.as_file()) {
            if !seen.insert(file.path()) {
                return Err(DomainError::DuplicateFilePath {
                    project: node.state.name.clone(),
                    path: file.absolute_path(&node.state.outdir),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn node(&self, id: ProjectId) -> Result<&ProjectNode, DomainError> {
        if id.tree != self.id {
            return Err(DomainError::UnknownProject { index: id.index });
        }
        self.nodes
            .get(id.index)
            .ok_or(DomainError::UnknownProject { index: id.index })
    }

    pub(crate) fn node_mut(&mut self, id: ProjectId) -> Result<&mut ProjectNode, DomainError> {
        if id.tree != self.id {
            return Err(DomainError::UnknownProject { index: id.index });
        }
        self.nodes
            .get_mut(id.index)
            .ok_or(DomainError::UnknownProject { index: id.index })
    }

    fn find_absolute(&self, project: ProjectId, absolute: &Path) -> Option<(ProjectId, &FileComponent)> {
        let node = self.node(project).ok()?;
        let own = node
            .components
            .iter()
            .filter_map(|r| r.entry.as_file())
            .find(|f| f.absolute_path(&node.state.outdir) == absolute);
        if let Some(file) = own {
            return Some((project, file));
        }
        node.state
            .children
            .iter()
            .find_map(|child| self.find_absolute(*child, absolute))
    }

    fn push_node(
        &mut self,
        name: String,
        outdir: PathBuf,
        relative_outdir: Option<RelativePath>,
        parent: Option<ProjectId>,
        features: Features,
    ) -> ProjectId {
        let id = ProjectId {
            tree: self.id,
            index: self.nodes.len(),
        };
        self.nodes.push(ProjectNode {
            state: ProjectState {
                id,
                name,
                outdir,
                relative_outdir,
                parent,
                children: Vec::new(),
                features,
                tasks: TaskRegistry::new(),
                cleanup_excludes: Vec::new(),
                gitignore: Vec::new(),
            },
            components: Vec::new(),
        });
        id
    }

    fn register(
        &mut self,
        project: ProjectId,
        entry: ComponentEntry,
    ) -> Result<ComponentId, DomainError> {
        let id = ComponentId {
            project,
            seq: self.next_component,
        };
        self.node_mut(project)?
            .components
            .push(Registered { id, entry });
        self.next_component += 1;
        Ok(id)
    }

    fn register_builtins(&mut self, project: ProjectId) -> Result<(), DomainError> {
        let features = self.project(project)?.features;
        if features.gitignore {
            self.add_file(project, IgnoreFile::new().into_component(".gitignore")?)?;
        }
        if features.tasks_manifest {
            self.add_file(project, TasksManifest::new().into_component(TASKS_MANIFEST_PATH)?)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::files::TextFile;
    use crate::domain::marker::CommentStyle;

    fn tree() -> ProjectTree {
        ProjectTree::new_in(
            ProjectOptions::new("root").with_outdir("/repo"),
            Path::new("/"),
        )
        .unwrap()
    }

    fn text(path: &str) -> FileComponent {
        TextFile::new(CommentStyle::Hash)
            .with_lines(["hello"])
            .into_component(path)
            .unwrap()
    }

    #[test]
    fn root_outdir_resolves_against_cwd() {
        let t = ProjectTree::new_in(
            ProjectOptions::new("root").with_outdir("out/../gen"),
            Path::new("/work"),
        )
        .unwrap();
        assert_eq!(t.project(t.root()).unwrap().outdir(), Path::new("/work/gen"));

        let t = ProjectTree::new_in(ProjectOptions::new("root"), Path::new("/work")).unwrap();
        assert_eq!(t.project(t.root()).unwrap().outdir(), Path::new("/work"));
    }

    #[test]
    fn ephemeral_outdir_lives_in_temp() {
        let t = ProjectTree::new_in(ProjectOptions::new("root").ephemeral(), Path::new("/work"))
            .unwrap();
        let outdir = t.project(t.root()).unwrap().outdir();
        assert!(outdir.starts_with(std::env::temp_dir()));
    }

    #[test]
    fn empty_name_is_rejected() {
        assert_eq!(
            ProjectTree::new_in(ProjectOptions::new("  "), Path::new("/")).unwrap_err(),
            DomainError::EmptyProjectName
        );
    }

    #[test]
    fn builtins_follow_features() {
        let t = tree();
        let names: Vec<_> = t.files(t.root()).unwrap().iter().map(|f| f.path().to_string()).collect();
        assert_eq!(names, [".gitignore", ".strata/tasks.json"]);

        let bare = ProjectTree::new_in(
            ProjectOptions::new("root")
                .with_outdir("/repo")
                .with_features(Features::none()),
            Path::new("/"),
        )
        .unwrap();
        assert!(bare.files(bare.root()).unwrap().is_empty());
    }

    #[test]
    fn subproject_outdir_is_resolved_under_parent() {
        let mut t = tree();
        let a = t
            .add_subproject(t.root(), SubprojectOptions::new("a", "pkgs/./a"))
            .unwrap();
        let state = t.project(a).unwrap();
        assert_eq!(state.outdir(), Path::new("/repo/pkgs/a"));
        assert_eq!(state.parent(), Some(t.root()));
        assert_eq!(t.project(t.root()).unwrap().children(), &[a]);
    }

    #[test]
    fn subproject_outdir_collision_is_rejected() {
        let mut t = tree();
        t.add_subproject(t.root(), SubprojectOptions::new("a", "pkgs/a"))
            .unwrap();
        let err = t
            .add_subproject(t.root(), SubprojectOptions::new("b", "pkgs/b/../a"))
            .unwrap_err();
        assert!(matches!(err, DomainError::OutdirCollision { ref existing, .. } if existing == "a"));
        assert_eq!(t.project(t.root()).unwrap().children().len(), 1);
    }

    #[test]
    fn nested_sibling_outdirs_are_rejected() {
        let mut t = tree();
        t.add_subproject(t.root(), SubprojectOptions::new("a", "pkgs/a"))
            .unwrap();
        assert!(matches!(
            t.add_subproject(t.root(), SubprojectOptions::new("inner", "pkgs/a/inner")),
            Err(DomainError::OutdirOverlap { .. })
        ));
        assert!(matches!(
            t.add_subproject(t.root(), SubprojectOptions::new("outer", "pkgs")),
            Err(DomainError::OutdirOverlap { .. })
        ));
    }

    #[test]
    fn invalid_subproject_outdirs() {
        let mut t = tree();
        let root = t.root();
        assert!(matches!(
            t.add_subproject(root, SubprojectOptions::new("abs", "/elsewhere")),
            Err(DomainError::OutdirNotRelative { .. })
        ));
        assert!(matches!(
            t.add_subproject(root, SubprojectOptions::new("up", "../sibling")),
            Err(DomainError::OutdirEscapesParent { .. })
        ));
        assert!(matches!(
            t.add_subproject(root, SubprojectOptions::new("same", ".")),
            Err(DomainError::OutdirCollision { .. })
        ));
    }

    #[test]
    fn parent_from_another_tree_is_rejected() {
        let other = tree();
        let mut t = tree();
        let err = t
            .add_subproject(other.root(), SubprojectOptions::new("a", "a"))
            .unwrap_err();
        assert_eq!(err, DomainError::ParentMismatch { project: "a".into() });
    }

    #[test]
    fn grandchildren_may_reuse_sibling_relative_names() {
        let mut t = tree();
        let a = t.add_subproject(t.root(), SubprojectOptions::new("a", "a")).unwrap();
        let b = t.add_subproject(t.root(), SubprojectOptions::new("b", "b")).unwrap();
        t.add_subproject(a, SubprojectOptions::new("a-lib", "lib")).unwrap();
        t.add_subproject(b, SubprojectOptions::new("b-lib", "lib")).unwrap();
        assert_eq!(t.projects().count(), 5);
    }

    #[test]
    fn find_file_searches_self_then_children() {
        let mut t = tree();
        let root = t.root();
        let a = t.add_subproject(root, SubprojectOptions::new("a", "pkgs/a")).unwrap();
        t.add_file(root, text("README.md")).unwrap();
        t.add_file(a, text("src/gen.txt")).unwrap();

        let (owner, file) = t.find_file(root, "README.md").unwrap();
        assert_eq!(owner, root);
        assert_eq!(file.path().to_string(), "README.md");

        let (owner, _) = t.find_file(root, "pkgs/a/src/gen.txt").unwrap();
        assert_eq!(owner, a);
        let (owner, _) = t.find_file(root, "/repo/pkgs/a/src/gen.txt").unwrap();
        assert_eq!(owner, a);
        assert!(t.find_file(a, "README.md").is_none());
        assert!(t.find_file(root, "src/gen.txt").is_none());
    }

    #[test]
    fn duplicate_file_claims_are_reported() {
        let mut t = tree();
        let root = t.root();
        t.add_file(root, text("a/gen.txt")).unwrap();
        t.add_file(root, text("a/./gen.txt")).unwrap();
        assert!(matches!(
            t.validate_file_claims(root),
            Err(DomainError::DuplicateFilePath { .. })
        ));
    }

    #[test]
    fn try_remove_file_detaches_component() {
        let mut t = tree();
        let root = t.root();
        t.add_file(root, text("a/gen.txt")).unwrap();

        assert!(t.try_remove_file(root, "a/gen.txt").unwrap().is_some());
        assert!(t.try_remove_file(root, "a/gen.txt").unwrap().is_none());
        assert!(t.find_file(root, "a/gen.txt").is_none());
    }

    #[test]
    fn task_surface_is_scoped_per_project() {
        let mut t = tree();
        let root = t.root();
        let a = t.add_subproject(root, SubprojectOptions::new("a", "a")).unwrap();
        t.add_task(root, "build", TaskOptions::default()).unwrap();
        t.add_task(a, "build", TaskOptions::default()).unwrap();
        assert!(matches!(
            t.add_task(root, "build", TaskOptions::default()),
            Err(DomainError::DuplicateTask { .. })
        ));
        assert!(t.remove_task(a, "build").unwrap().is_some());
        assert!(t.remove_task(a, "build").unwrap().is_none());
    }

    #[test]
    fn cleanup_excludes_are_validated_and_deduplicated() {
        let mut t = tree();
        let root = t.root();
        t.add_exclude_from_cleanup(root, ["fixtures/**", "fixtures/**"]).unwrap();
        assert_eq!(t.project(root).unwrap().cleanup_excludes(), ["fixtures/**"]);
        assert!(matches!(
            t.add_exclude_from_cleanup(root, ["a/***"]),
            Err(DomainError::InvalidGlob { .. })
        ));
    }

    #[test]
    fn component_ids_stay_valid_after_removal() {
        let mut t = tree();
        let root = t.root();
        t.add_file(root, text("one.txt")).unwrap();
        let two = t.add_file(root, text("two.txt")).unwrap();
        t.try_remove_file(root, "one.txt").unwrap();
        assert_eq!(t.component(two).unwrap().name(), "two.txt");
    }
}
