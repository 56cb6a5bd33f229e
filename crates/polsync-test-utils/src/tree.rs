//! [`PolicyTree`] builder for on-disk source trees.

use std::fs;
use std::path::Path;

use polsync_fs::NormalizedPath;
use polsync_meta::{ExpectedOutcome, Kind};
use tempfile::TempDir;

/// A temporary source directory laid out one subdirectory per kind.
///
/// ```rust,no_run
/// use polsync_meta::{ExpectedOutcome, Kind};
/// use polsync_test_utils::PolicyTree;
///
/// let tree = PolicyTree::new();
/// tree.definition(Kind::Policies, "require-labels", "body: deny {}\n");
/// tree.fixture(Kind::Policies, "require-labels", "case1", ExpectedOutcome::Success, "{}\n");
/// ```
pub struct PolicyTree {
    temp_dir: TempDir,
}

impl Default for PolicyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyTree {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self) -> NormalizedPath {
        NormalizedPath::new(self.root())
    }

    pub fn kind_dir(&self, kind: Kind) -> NormalizedPath {
        self.path().join(kind.as_str())
    }

    /// Write `content` at `rel`, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> &Self {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        self
    }

    /// Create `kind`'s directory with nothing in it.
    pub fn empty_kind(&self, kind: Kind) -> &Self {
        fs::create_dir_all(self.root().join(kind.as_str())).unwrap();
        self
    }

    /// Write `<kind>/<name>.yaml` with `name: <name>` followed by `rest`.
    pub fn definition(&self, kind: Kind, name: &str, rest: &str) -> &Self {
        self.write(
            &format!("{}/{}.yaml", kind.as_str(), name),
            &format!("name: {}\n{}", name, rest),
        )
    }

    /// Write a fixture named by the `<policy>.<case>.<outcome>.yaml` convention.
    pub fn fixture(
        &self,
        kind: Kind,
        policy: &str,
        case_id: &str,
        expected: ExpectedOutcome,
        content: &str,
    ) -> &Self {
        let marker = match expected {
            ExpectedOutcome::Success => "success",
            ExpectedOutcome::Failure => "failure",
            ExpectedOutcome::Unknown => "testcase",
        };
        let file = match expected {
            ExpectedOutcome::Unknown => format!("{}.{}.{}.yaml", policy, marker, case_id),
            _ => format!("{}.{}.{}.yaml", policy, case_id, marker),
        };
        self.write(&format!("{}/{}", kind.as_str(), file), content)
    }

    /// Write `polsync.toml` at the root.
    pub fn config(&self, content: &str) -> &Self {
        self.write("polsync.toml", content)
    }
}
