//! Synth Service - main application orchestrator.
//!
//! This service turns a declarative [`ProjectTree`] into files on disk:
//! 1. Pre-synthesize every component
//! 2. Exclude sub-project outdirs and clean stale generated files
//! 3. Recurse into sub-projects
//! 4. Render and write every file component
//! 5. Post-synthesize
//!
//! It implements the driving port (incoming) and uses driven ports (outgoing).

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::Filesystem,
        services::cleanup::{self, CleanupReport},
    },
    domain::{ComponentEntry, FileComponent, ProjectId, ProjectState, ProjectTree, contains_marker},
    error::StrataResult,
};

/// Knobs for a synthesis pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthOptions {
    /// Overwrite hand-written files that sit at generated paths.
    pub force: bool,
    /// Run the post-synthesis hooks.
    pub post_synthesize: bool,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            force: false,
            post_synthesize: true,
        }
    }
}

/// Outcome of a synthesis pass over the whole tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthReport {
    /// Files whose bytes were (re)written.
    pub written: Vec<PathBuf>,
    /// Files already holding the rendered bytes.
    pub unchanged: Vec<PathBuf>,
    /// Samples that already exist and files whose source rendered nothing.
    pub skipped: Vec<PathBuf>,
    /// Stale generated files deleted by cleanup.
    pub removed: Vec<PathBuf>,
    /// Directories emptied by cleanup.
    pub pruned: Vec<PathBuf>,
}

impl SynthReport {
    fn absorb(&mut self, cleanup: CleanupReport) {
        self.removed.extend(cleanup.removed);
        self.pruned.extend(cleanup.pruned);
    }
}

/// Main synthesis service.
pub struct SynthService {
    filesystem: Box<dyn Filesystem>,
    options: SynthOptions,
}

impl SynthService {
    /// Create a new synth service with the given filesystem adapter.
    pub fn new(filesystem: Box<dyn Filesystem>) -> Self {
        Self {
            filesystem,
            options: SynthOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SynthOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> SynthOptions {
        self.options
    }

    /// Synthesize the whole tree, root first.
    ///
    /// The first error aborts the pass; files already written stay written.
    #[instrument(skip_all, fields(force = self.options.force))]
    pub fn synth(&self, tree: &mut ProjectTree) -> StrataResult<SynthReport> {
        let mut report = SynthReport::default();
        let root = tree.root();
        self.synth_project(tree, root, &mut report)?;

        info!(
            written = report.written.len(),
            unchanged = report.unchanged.len(),
            removed = report.removed.len(),
            "Synthesis complete"
        );
        Ok(report)
    }

    #[instrument(skip_all, fields(project = id.index()))]
    fn synth_project(
        &self,
        tree: &mut ProjectTree,
        id: ProjectId,
        report: &mut SynthReport,
    ) -> StrataResult<()> {
        // 1. Pre-synthesis
        tree.validate_file_claims(id)?;
        {
            let node = tree.node_mut(id)?;
            for registered in &mut node.components {
                registered.entry.pre_synthesize(&mut node.state)?;
            }
        }

        // 2. Sub-project outdirs are theirs to clean
        let children = tree.project(id)?.children().to_vec();
        let mut child_globs = Vec::new();
        for child in &children {
            if let Some(rel) = tree.project(*child)?.relative_outdir() {
                let rel = glob::Pattern::escape(&rel.to_slash_string());
                child_globs.push(format!("{rel}/**"));
                child_globs.push(rel);
            }
        }
        tree.add_exclude_from_cleanup(id, child_globs)?;

        // 3. Cleanup
        {
            let state = tree.project(id)?;
            let generated: HashSet<PathBuf> = tree
                .files(id)?
                .iter()
                .map(|f| f.absolute_path(state.outdir()))
                .collect();
            let removed = cleanup::cleanup(
                self.filesystem.as_ref(),
                state.outdir(),
                &generated,
                state.cleanup_excludes(),
            )?;
            report.absorb(removed);
        }

        // 4. Sub-projects, depth-first
        for child in children {
            self.synth_project(tree, child, report)?;
        }

        // 5. Synthesis
        let node = tree.node_mut(id)?;
        for registered in &mut node.components {
            match &mut registered.entry {
                ComponentEntry::File(file) => self.write_file(file, &node.state, report)?,
                ComponentEntry::Generic(component) => component.synthesize(&node.state)?,
            }
        }

        // 6. Post-synthesis
        if self.options.post_synthesize {
            for registered in &mut node.components {
                registered.entry.post_synthesize(&node.state)?;
            }
        }
        debug!(
            name = node.state.name(),
            outdir = %node.state.outdir().display(),
            "project synthesized"
        );
        Ok(())
    }

    fn write_file(
        &self,
        file: &FileComponent,
        project: &ProjectState,
        report: &mut SynthReport,
    ) -> StrataResult<()> {
        let path = file.absolute_path(project.outdir());
        let existing = self.filesystem.read_file(&path)?;

        if file.is_sample() && existing.is_some() {
            debug!(path = %path.display(), "sample exists, leaving it alone");
            report.skipped.push(path);
            return Ok(());
        }

        let Some(bytes) = file.render(project)? else {
            report.skipped.push(path);
            return Ok(());
        };

        if let Some(existing) = existing {
            if existing == bytes {
                debug!(path = %path.display(), "unchanged");
                report.unchanged.push(path);
                return Ok(());
            }
            if !contains_marker(&existing) && !(self.options.force || file.force()) {
                return Err(ApplicationError::UserFileConflict { path }.into());
            }
        }

        if let Some(parent) = path.parent() {
            self.filesystem.create_dir_all(parent)?;
        }
        self.filesystem.write_file(&path, &bytes)?;
        self.filesystem.set_permissions(&path, file.permissions())?;

        debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
        report.written.push(path);
        Ok(())
    }
}
