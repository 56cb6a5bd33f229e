//! Human-readable diff previews
//!
//! Type-erased view of a [`DiffResult`] so callers can print diffs for
//! every kind the same way.

use serde::Serialize;
use serde_json::Value;
use similar::TextDiff;

use polsync_meta::{Kind, Record, RecordSet};

use super::DiffResult;
use crate::Result;

/// An update, rendered as YAML on both sides.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatePreview {
    pub name: String,
    pub remote: String,
    pub local: String,
}

impl UpdatePreview {
    /// Unified diff from the remote rendering to the local one.
    pub fn unified_diff(&self) -> String {
        TextDiff::from_lines(&self.remote, &self.local)
            .unified_diff()
            .context_radius(3)
            .header("remote", "local")
            .to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffPreview {
    pub kind: Kind,
    pub inserts: Vec<String>,
    pub updates: Vec<UpdatePreview>,
    pub deletes: Vec<String>,
    pub unchanged: usize,
}

impl DiffPreview {
    pub fn new<R: Record>(diff: &DiffResult<R>, remote: &RecordSet<R>) -> Result<Self> {
        let mut updates = Vec::new();
        for record in &diff.to_update {
            let Some(existing) = remote.get(record.name()) else {
                continue;
            };
            updates.push(UpdatePreview {
                name: record.name().to_string(),
                remote: render(existing)?,
                local: render(record)?,
            });
        }

        Ok(Self {
            kind: R::KIND,
            inserts: diff.to_insert.names().map(String::from).collect(),
            updates,
            deletes: diff.to_delete.names().map(String::from).collect(),
            unchanged: diff.unchanged.len(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

/// YAML rendering without the surrogate id, which only ever differs
/// because one side lacks it.
fn render<R: Record>(record: &R) -> Result<String> {
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(map) = &mut value {
        map.remove("id");
    }
    Ok(serde_yaml::to_string(&value)?)
}
