//! Local scanner: classifies a directory tree into definitions and fixtures
//!
//! ```text
//! policies/
//!   require-labels.yaml                 definition
//!   require-labels.case1.success.yaml   fixture for require-labels
//!   team-a/
//!     disallow-root.yaml                definition (subdirectories are walked)
//! ```
//!
//! A scan either returns everything or fails naming the offending file.
//! An incomplete set must never reach a diff, because whatever is missing
//! locally would be reported as a remote delete.

use std::collections::{BTreeMap, HashMap};

use polsync_fs::document::DocumentFormat;
use polsync_fs::{Document, NormalizedPath, io};

use crate::fixture::{Fixture, FixtureName};
use crate::record::{Record, RecordSet};
use crate::{Error, Result};

/// One definition file with its resolved identity.
#[derive(Debug, Clone)]
pub struct Definition {
    pub name: String,
    pub document: Document,
}

/// Everything found under one kind directory.
#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    pub definitions: Vec<Definition>,
    /// Fixtures by policy name, each list sorted by path.
    pub fixtures: BTreeMap<String, Vec<Fixture>>,
}

impl ScanOutput {
    pub fn definition(&self, name: &str) -> Option<&Definition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn fixtures_for(&self, name: &str) -> &[Fixture] {
        self.fixtures.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fixtures whose policy name matches no definition.
    pub fn orphan_fixtures(&self) -> Vec<&Fixture> {
        self.fixtures
            .iter()
            .filter(|(name, _)| self.definition(name).is_none())
            .flat_map(|(_, fixtures)| fixtures.iter())
            .collect()
    }

    /// Definitions whose name contains a `.`. Fixture file names end the
    /// policy name at the first dot, so these can never own a fixture.
    pub fn dotted_definitions(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.iter().filter(|d| d.name.contains('.'))
    }

    /// Convert the definitions into typed records of kind `R`.
    pub fn records<R: Record>(&self) -> Result<RecordSet<R>> {
        let mut set = RecordSet::new();
        for definition in &self.definitions {
            set.insert(R::from_definition(definition)?)?;
        }
        Ok(set)
    }
}

/// Scans one directory tree.
pub struct Scanner {
    root: NormalizedPath,
}

impl Scanner {
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// Walk the tree and classify every YAML/JSON file.
    ///
    /// Files with other extensions are skipped. A missing directory scans
    /// as empty; callers that care check for it first.
    pub fn scan(&self) -> Result<ScanOutput> {
        let mut output = ScanOutput::default();
        let mut seen: HashMap<String, NormalizedPath> = HashMap::new();

        for path in io::list_files(&self.root)? {
            match DocumentFormat::of(&path) {
                Some(DocumentFormat::Yaml | DocumentFormat::Json) => {}
                _ => {
                    tracing::debug!("Skipping {}: not a YAML or JSON file", path);
                    continue;
                }
            }

            let stem = path.file_stem().unwrap_or_default();
            if let Some(fixture_name) = FixtureName::parse(stem) {
                let document = Document::load(&path)?;
                tracing::debug!(
                    "Fixture {} -> {} ({:?})",
                    path,
                    fixture_name.policy,
                    fixture_name.expected
                );
                output
                    .fixtures
                    .entry(fixture_name.policy.clone())
                    .or_default()
                    .push(Fixture {
                        policy: fixture_name.policy,
                        case_id: fixture_name.case_id,
                        expected: fixture_name.expected,
                        path,
                        content: document.raw,
                    });
                continue;
            }

            let document = Document::load(&path)?;
            let name = resolve_identity(&document).ok_or_else(|| Error::MissingIdentity {
                path: path.to_native(),
            })?;

            if let Some(first) = seen.get(&name) {
                return Err(Error::DuplicateDefinition {
                    name,
                    first: first.to_native(),
                    second: path.to_native(),
                });
            }
            seen.insert(name.clone(), path.clone());
            tracing::debug!("Definition {} -> {}", path, name);
            output.definitions.push(Definition { name, document });
        }

        for orphan in output.orphan_fixtures() {
            tracing::warn!(
                "Fixture {} refers to '{}', which has no definition",
                orphan.path,
                orphan.policy
            );
        }
        for definition in output.dotted_definitions() {
            tracing::warn!(
                "Definition {} is named '{}'; a dotted name cannot own fixtures",
                definition.document.path,
                definition.name
            );
        }

        Ok(output)
    }
}

/// Top-level `name`, else `metadata.name`; blank values do not count.
fn resolve_identity(document: &Document) -> Option<String> {
    ["name", "metadata.name"]
        .into_iter()
        .filter_map(|field| document.str_at(field))
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
}
