use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{CapsyncError, CapsyncResult};

/// One transcribed word with its speech interval in seconds.
///
/// Produced entirely by the transcription collaborator; capsync never edits
/// word text or timing, it only validates and indexes them.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Word {
    /// The spoken word as written by the transcriber.
    #[serde(rename = "word")]
    pub text: String,
    /// Start of the speech interval, seconds from video start.
    #[serde(rename = "start")]
    pub start_sec: f64,
    /// End of the speech interval, seconds from video start.
    #[serde(rename = "end")]
    pub end_sec: f64,
}

impl Word {
    /// Length of the speech interval in seconds.
    pub fn duration_sec(&self) -> f64 {
        self.end_sec - self.start_sec
    }
}

/// Validated, index-addressable word store.
///
/// Invariants enforced at construction: every word has `start_sec <
/// end_sec`, words are sorted by `start_sec`, and no two words overlap.
/// Immutable afterwards; groupings address into it by index. Deserialize
/// deliberately goes through [`WordTimeline::from_json_slice`] so no
/// unvalidated store can exist.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct WordTimeline {
    words: Vec<Word>,
}

impl WordTimeline {
    /// Validate and wrap a word sequence.
    pub fn new(words: Vec<Word>) -> CapsyncResult<Self> {
        for (i, w) in words.iter().enumerate() {
            if !w.start_sec.is_finite() || !w.end_sec.is_finite() {
                return Err(CapsyncError::validation(format!(
                    "word {i} ('{}') has non-finite timestamps",
                    w.text
                )));
            }
            if w.start_sec >= w.end_sec {
                return Err(CapsyncError::validation(format!(
                    "word {i} ('{}') has start_sec {} >= end_sec {}",
                    w.text, w.start_sec, w.end_sec
                )));
            }
        }
        for i in 1..words.len() {
            let prev = &words[i - 1];
            let cur = &words[i];
            if cur.start_sec < prev.start_sec {
                return Err(CapsyncError::validation(format!(
                    "word {i} ('{}') starts before word {} ('{}')",
                    cur.text,
                    i - 1,
                    prev.text
                )));
            }
            if cur.start_sec < prev.end_sec {
                return Err(CapsyncError::validation(format!(
                    "word {i} ('{}') overlaps word {} ('{}')",
                    cur.text,
                    i - 1,
                    prev.text
                )));
            }
        }
        Ok(Self { words })
    }

    /// Parse the transcription collaborator's JSON: a flat array of
    /// `{"word", "start", "end"}` objects.
    pub fn from_json_slice(bytes: &[u8]) -> CapsyncResult<Self> {
        let words: Vec<Word> = serde_json::from_slice(bytes)
            .map_err(|e| CapsyncError::serde(format!("word timestamps JSON: {e}")))?;
        Self::new(words)
    }

    /// Read and parse a word timestamps file.
    pub fn from_json_file(path: impl AsRef<Path>) -> CapsyncResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read word timestamps from '{}'", path.display()))?;
        Self::from_json_slice(&bytes)
    }

    /// Number of words in the store.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when the store holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Word at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&Word> {
        self.words.get(index)
    }

    /// All words in timestamp order.
    pub fn words(&self) -> &[Word] {
        &self.words
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transcript/words.rs"]
mod tests;
