use crate::foundation::core::Fps;
use crate::foundation::error::{CapsyncError, CapsyncResult};
use crate::track::schedule::{LineWindow, schedule};
use crate::transcript::grouping::Grouping;
use crate::transcript::words::{Word, WordTimeline};

/// One resolved caption line: the dereferenced words, in order.
///
/// Non-empty by construction; line timing is derived from the first and last
/// word.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WordGroup {
    words: Vec<Word>,
}

impl WordGroup {
    /// Speech start of the first word, seconds.
    pub fn start_sec(&self) -> f64 {
        self.words[0].start_sec
    }

    /// Speech end of the last word, seconds.
    pub fn end_sec(&self) -> f64 {
        self.words[self.words.len() - 1].end_sec
    }

    /// Line duration in seconds.
    pub fn duration_sec(&self) -> f64 {
        self.end_sec() - self.start_sec()
    }

    /// Words of the line in order.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Number of words in the line.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false; groups are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Dereference a grouping against the word store into ordered word groups.
///
/// Pure transformation. Fails with [`CapsyncError::Grouping`] when any index
/// is out of range, a group is empty, or indices within a group are not
/// strictly increasing. Cross-group temporal overlap is NOT an error here;
/// upstream editors produce it by mistake and the track builder flags it for
/// the compositor's tie-break instead.
pub fn resolve(timeline: &WordTimeline, grouping: &Grouping) -> CapsyncResult<Vec<WordGroup>> {
    let mut groups = Vec::with_capacity(grouping.groups.len());
    for (group_idx, spec) in grouping.groups.iter().enumerate() {
        if spec.indices.is_empty() {
            return Err(CapsyncError::grouping(format!("group {group_idx} is empty")));
        }

        let mut words = Vec::with_capacity(spec.indices.len());
        let mut prev: Option<usize> = None;
        for &index in &spec.indices {
            if let Some(p) = prev
                && index <= p
            {
                return Err(CapsyncError::grouping(format!(
                    "group {group_idx} indices must be strictly increasing (got {index} after {p})"
                )));
            }
            let word = timeline.get(index).ok_or_else(|| {
                CapsyncError::grouping(format!(
                    "group {group_idx} references word {index}, but the timeline has {} words",
                    timeline.len()
                ))
            })?;
            words.push(word.clone());
            prev = Some(index);
        }
        groups.push(WordGroup { words });
    }
    Ok(groups)
}

/// Recorded frame-window overlap between two consecutive caption lines.
///
/// Surfaced as a diagnostic so a human can fix the grouping; rendering
/// recovers with the last-declared-wins tie-break.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OverlapFlag {
    /// Index of the earlier-declared line.
    pub earlier: usize,
    /// Index of the later-declared line.
    pub later: usize,
    /// Number of frames on which both windows claim visibility.
    pub overlap_frames: u64,
}

/// One scheduled caption line: display window plus resolved words.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaptionLine {
    /// Display window at the track's fps.
    pub window: LineWindow,
    /// Resolved words of the line.
    pub words: WordGroup,
}

/// The full caption timeline: ordered lines plus recorded overlap flags.
///
/// Built once ahead of rendering and read-only afterwards; rendering is a
/// pure projection from `(track, frame, fps)`. Consecutive windows are
/// expected to satisfy `end_frame[i] <= start_frame[i+1]`, but upstream data
/// does not guarantee it — violations are recorded, warned about, and left
/// to the compositor's deterministic tie-break.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaptionTrack {
    lines: Vec<CaptionLine>,
    overlaps: Vec<OverlapFlag>,
}

impl CaptionTrack {
    /// Resolve, schedule, and overlap-check a grouping against a word store.
    ///
    /// Fails fast on invalid groupings: no partial track is ever returned.
    /// An empty grouping is fine and yields a track that renders fully
    /// transparent.
    #[tracing::instrument(skip(timeline, grouping), fields(words = timeline.len(), groups = grouping.len()))]
    pub fn build(
        timeline: &WordTimeline,
        grouping: &Grouping,
        fps: Fps,
        effect_threshold_ms: u32,
    ) -> CapsyncResult<Self> {
        let groups = resolve(timeline, grouping)?;

        let lines: Vec<CaptionLine> = groups
            .into_iter()
            .map(|words| CaptionLine {
                window: schedule(&words, fps, effect_threshold_ms),
                words,
            })
            .collect();

        let mut overlaps = Vec::new();
        for i in 1..lines.len() {
            let earlier = &lines[i - 1].window;
            let later = &lines[i].window;
            if earlier.end_frame.0 > later.start_frame.0 {
                let flag = OverlapFlag {
                    earlier: i - 1,
                    later: i,
                    overlap_frames: earlier
                        .end_frame
                        .0
                        .saturating_sub(later.start_frame.0)
                        .min(later.frame_range().len_frames()),
                };
                tracing::warn!(
                    earlier = flag.earlier,
                    later = flag.later,
                    overlap_frames = flag.overlap_frames,
                    "caption lines overlap; later line wins on shared frames"
                );
                overlaps.push(flag);
            }
        }

        if lines.is_empty() {
            tracing::debug!("grouping resolved to zero lines; track renders transparent");
        }

        Ok(Self { lines, overlaps })
    }

    /// Scheduled lines in declaration order.
    pub fn lines(&self) -> &[CaptionLine] {
        &self.lines
    }

    /// Overlap flags recorded at build time (empty for well-formed input).
    pub fn overlaps(&self) -> &[OverlapFlag] {
        &self.overlaps
    }

    /// Number of caption lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when the track has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// One past the last frame on which any line is visible (0 for an empty
    /// track).
    pub fn end_frame(&self) -> u64 {
        self.lines.iter().map(|l| l.window.end_frame.0).max().unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/track/resolve.rs"]
mod tests;
