//! Built-in file components.

mod ignore;
mod sample;
mod tasks_manifest;
mod text;

pub use ignore::IgnoreFile;
pub use sample::SampleFile;
pub use tasks_manifest::{JSON_MARKER_KEY, TasksManifest};
pub use text::TextFile;

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::domain::{
        entities::{
            project::{ProjectOptions, ProjectTree, TASKS_MANIFEST_PATH},
            task::TaskOptions,
        },
        marker::{CommentStyle, contains_marker},
    };

    fn tree() -> ProjectTree {
        ProjectTree::new_in(ProjectOptions::new("demo").with_outdir("/repo"), Path::new("/"))
            .unwrap()
    }

    fn rendered(tree: &ProjectTree, path: &str) -> String {
        let (owner, file) = tree.find_file(tree.root(), path).unwrap();
        let bytes = file.render(tree.project(owner).unwrap()).unwrap().unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn text_file_starts_with_marker_comment() {
        let mut t = tree();
        let file = TextFile::new(CommentStyle::Slash)
            .with_lines(["fn main() {}"])
            .into_component("src/main.rs")
            .unwrap();
        t.add_file(t.root(), file).unwrap();

        let text = rendered(&t, "src/main.rs");
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("// ~~ Generated by strata."));
        assert_eq!(lines.next(), Some("fn main() {}"));
    }

    #[test]
    fn unmarked_text_has_no_header() {
        let mut t = tree();
        let file = TextFile::new(CommentStyle::Hash)
            .with_lines(["plain"])
            .into_component("plain.txt")
            .unwrap()
            .with_marker(false);
        t.add_file(t.root(), file).unwrap();
        assert_eq!(rendered(&t, "plain.txt"), "plain\n");
    }

    #[test]
    fn gitignore_reads_patterns_at_render_time() {
        let mut t = tree();
        let root = t.root();
        t.add_git_ignore(root, "/target").unwrap();
        t.add_git_ignore(root, "*.log").unwrap();
        t.add_git_ignore(root, "/target").unwrap();

        let text = rendered(&t, ".gitignore");
        assert!(contains_marker(text.as_bytes()));
        assert_eq!(text.lines().skip(1).collect::<Vec<_>>(), ["/target", "*.log"]);
    }

    #[test]
    fn tasks_manifest_is_marked_json() {
        let mut t = tree();
        t.add_task(t.root(), "build", TaskOptions::described("Build it"))
            .unwrap()
            .exec("cargo build")
            .unwrap();

        let text = rendered(&t, TASKS_MANIFEST_PATH);
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(contains_marker(text.as_bytes()));
        assert_eq!(doc["tasks"]["build"]["steps"][0]["exec"], "cargo build");
        assert!(text.trim_start().starts_with("{\n  \"//\""));
    }

    #[test]
    fn sample_is_never_marked() {
        let file = SampleFile::new("hello").into_component("README.md").unwrap();
        assert!(file.is_sample());
        assert!(!file.has_marker());
        assert!(!file.with_marker(true).has_marker());
    }
}
