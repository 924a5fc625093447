use super::*;

use crate::transcript::grouping::{GroupSpec, Grouping};
use crate::transcript::words::{Word, WordTimeline};

fn timeline(words: &[(&str, f64, f64)]) -> WordTimeline {
    WordTimeline::new(
        words
            .iter()
            .map(|&(text, start_sec, end_sec)| Word {
                text: text.to_string(),
                start_sec,
                end_sec,
            })
            .collect(),
    )
    .unwrap()
}

fn grouping(indices: &[&[usize]]) -> Grouping {
    Grouping {
        groups: indices
            .iter()
            .map(|ix| GroupSpec {
                indices: ix.to_vec(),
                text: String::new(),
            })
            .collect(),
    }
}

fn fps30() -> Fps {
    Fps::new(30, 1).unwrap()
}

fn scenario_track() -> CaptionTrack {
    let words = timeline(&[("Great", 0.14, 0.32), ("ideas", 0.32, 0.62), ("change", 0.62, 1.06)]);
    CaptionTrack::build(&words, &grouping(&[&[0, 1, 2]]), fps30(), 500).unwrap()
}

#[test]
fn no_line_outside_any_window() {
    let track = scenario_track();
    let params = EffectParams::default();
    assert!(render_frame(&track, FrameIndex(0), fps30(), &params).is_none());
    assert!(render_frame(&track, FrameIndex(3), fps30(), &params).is_none());
    assert!(render_frame(&track, FrameIndex(31), fps30(), &params).is_none());
    assert!(render_frame(&track, FrameIndex(100_000), fps30(), &params).is_none());
}

#[test]
fn boundary_containment() {
    let track = scenario_track();
    let params = EffectParams::default();
    let w = track.lines()[0].window;

    assert!(render_frame(&track, w.start_frame, fps30(), &params).is_some());
    let last = FrameIndex(w.end_frame.0 - 1);
    assert!(render_frame(&track, last, fps30(), &params).is_some());
    assert!(render_frame(&track, w.end_frame, fps30(), &params).is_none());
}

#[test]
fn rendered_line_carries_per_word_state() {
    let track = scenario_track();
    let params = EffectParams::default();
    let line = render_frame(&track, FrameIndex(4), fps30(), &params).unwrap();

    assert_eq!(line.line_index, 0);
    assert_eq!(line.words.len(), 3);
    assert_eq!(line.words[0].text, "Great");
    // Frame 4 is the drop-in start and the sweep start.
    assert_eq!(line.offset_px, -6.0);
    assert_eq!(line.words[0].opacity, 0.35);
    assert_eq!(line.words[2].opacity, 0.35);
}

#[test]
fn static_line_invariant() {
    let words = timeline(&[("hey", 1.0, 1.4)]);
    let track = CaptionTrack::build(&words, &grouping(&[&[0]]), fps30(), 500).unwrap();
    let params = EffectParams::default();
    let w = track.lines()[0].window;

    for f in w.start_frame.0..w.end_frame.0 {
        let line = render_frame(&track, FrameIndex(f), fps30(), &params).unwrap();
        assert_eq!(line.offset_px, 0.0);
        for word in &line.words {
            assert_eq!(word.opacity, 1.0);
        }
    }
}

#[test]
fn repeated_and_reversed_calls_are_identical() {
    let track = scenario_track();
    let params = EffectParams::default();

    let forward: Vec<_> = (0..40)
        .map(|f| render_frame(&track, FrameIndex(f), fps30(), &params))
        .collect();
    let mut reverse: Vec<_> = (0..40)
        .rev()
        .map(|f| render_frame(&track, FrameIndex(f), fps30(), &params))
        .collect();
    reverse.reverse();
    assert_eq!(forward, reverse);

    for f in [4u64, 17, 30] {
        let a = render_frame(&track, FrameIndex(f), fps30(), &params);
        let b = render_frame(&track, FrameIndex(f), fps30(), &params);
        assert_eq!(a, b);
    }
}

#[test]
fn overlap_tie_break_prefers_later_start() {
    let words = timeline(&[("a", 0.0, 1.0), ("b", 1.0, 2.0), ("c", 2.0, 3.0)]);
    // Line 0 spans [0, 90); line 1 spans [30, 90) inside it.
    let track =
        CaptionTrack::build(&words, &grouping(&[&[0, 1, 2], &[1, 2]]), fps30(), 500).unwrap();
    assert_eq!(track.overlaps().len(), 1);
    let params = EffectParams::default();

    let early = render_frame(&track, FrameIndex(10), fps30(), &params).unwrap();
    assert_eq!(early.line_index, 0);

    let shared = render_frame(&track, FrameIndex(45), fps30(), &params).unwrap();
    assert_eq!(shared.line_index, 1);
}

#[test]
fn overlap_tie_break_on_equal_start_prefers_later_declaration() {
    let words = timeline(&[("a", 0.0, 1.0), ("b", 1.0, 2.0)]);
    // Both lines start at word 0, so both windows start at frame 0.
    let track = CaptionTrack::build(&words, &grouping(&[&[0, 1], &[0]]), fps30(), 500).unwrap();
    let params = EffectParams::default();

    let line = render_frame(&track, FrameIndex(5), fps30(), &params).unwrap();
    assert_eq!(line.line_index, 1);
}

#[test]
fn empty_track_renders_nothing() {
    let words = timeline(&[("a", 0.0, 1.0)]);
    let track = CaptionTrack::build(&words, &Grouping::default(), fps30(), 500).unwrap();
    let params = EffectParams::default();
    assert!(render_frame(&track, FrameIndex(0), fps30(), &params).is_none());
}
