use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{CapsyncError, CapsyncResult};

/// One caption line as authored in the grouping file: word indices plus a
/// human-readable preview.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GroupSpec {
    /// Indices into the word timeline, strictly increasing within a group.
    pub indices: Vec<usize>,
    /// Cached preview of the grouped words. Advisory only: editors keep it
    /// readable, but it carries no timing authority and is never parsed.
    #[serde(default)]
    pub text: String,
}

/// Human-editable grouping of timeline words into caption lines.
///
/// Typically produced by an LLM-assisted generator and then hand-tuned, so
/// nothing here is trusted: the resolver re-validates every index.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Grouping {
    /// Ordered caption line specs.
    pub groups: Vec<GroupSpec>,
}

impl Grouping {
    /// Parse the grouping file format: `{"groups":[{"indices":[..],"text":".."}]}`.
    pub fn from_json_slice(bytes: &[u8]) -> CapsyncResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| CapsyncError::serde(format!("grouping JSON: {e}")))
    }

    /// Read and parse a grouping file.
    pub fn from_json_file(path: impl AsRef<Path>) -> CapsyncResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read grouping from '{}'", path.display()))?;
        Self::from_json_slice(&bytes)
    }

    /// Serialize back to the grouping file format (pretty-printed, since the
    /// file is meant to be edited by hand).
    pub fn to_json_string(&self) -> CapsyncResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CapsyncError::serde(format!("grouping JSON: {e}")))
    }

    /// Number of caption line specs.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when the grouping contains no line specs.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transcript/grouping.rs"]
mod tests;
