use super::*;

use crate::transcript::grouping::GroupSpec;

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

fn three_words() -> WordTimeline {
    timeline(&[("Great", 0.14, 0.32), ("ideas", 0.32, 0.62), ("change", 0.62, 1.06)])
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

#[test]
fn resolve_round_trips_grouping_indices() {
    let words = three_words();
    let groups = resolve(&words, &grouping(&[&[0], &[1, 2]])).unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].words()[0].text, "Great");
    assert_eq!(groups[1].words()[0].text, "ideas");
    assert_eq!(groups[1].words()[1].text, "change");
    assert_eq!(groups[0].start_sec(), 0.14);
    assert_eq!(groups[1].start_sec(), 0.32);
    assert_eq!(groups[1].end_sec(), 1.06);
}

#[test]
fn out_of_range_index_fails_with_grouping_error() {
    let words = three_words();
    let err = resolve(&words, &grouping(&[&[0], &[99]])).unwrap_err();
    assert!(matches!(err, CapsyncError::Grouping(_)), "{err}");
}

#[test]
fn empty_group_fails() {
    let words = three_words();
    let err = resolve(&words, &grouping(&[&[]])).unwrap_err();
    assert!(matches!(err, CapsyncError::Grouping(_)), "{err}");
}

#[test]
fn non_increasing_indices_fail() {
    let words = three_words();
    for bad in [&[1usize, 1][..], &[2, 1]] {
        let err = resolve(&words, &grouping(&[bad])).unwrap_err();
        assert!(matches!(err, CapsyncError::Grouping(_)), "{err}");
    }
}

#[test]
fn invalid_grouping_leaves_no_partial_track() {
    let words = three_words();
    let fps = Fps::new(30, 1).unwrap();
    // First group is valid; the second is not. The whole build must fail.
    let err = CaptionTrack::build(&words, &grouping(&[&[0], &[99]]), fps, 500).unwrap_err();
    assert!(matches!(err, CapsyncError::Grouping(_)), "{err}");
}

#[test]
fn build_schedules_lines_in_declaration_order() {
    let words = three_words();
    let fps = Fps::new(30, 1).unwrap();
    let track = CaptionTrack::build(&words, &grouping(&[&[0], &[1, 2]]), fps, 500).unwrap();

    assert_eq!(track.len(), 2);
    assert!(track.overlaps().is_empty());
    assert_eq!(track.lines()[0].window.start_frame.0, 4);
    assert_eq!(track.lines()[1].window.end_frame.0, 31);
    assert_eq!(track.end_frame(), 31);
}

#[test]
fn temporal_overlap_is_flagged_not_fatal() {
    let words = timeline(&[("a", 0.0, 1.0), ("b", 1.0, 2.0), ("c", 2.0, 3.0)]);
    let fps = Fps::new(30, 1).unwrap();
    // Sharing word 1 across groups makes the windows overlap in frames.
    let track = CaptionTrack::build(&words, &grouping(&[&[0, 1], &[1, 2]]), fps, 500).unwrap();

    assert_eq!(track.len(), 2);
    assert_eq!(track.overlaps().len(), 1);
    let flag = track.overlaps()[0];
    assert_eq!((flag.earlier, flag.later), (0, 1));
    assert_eq!(flag.overlap_frames, 30);
}

#[test]
fn empty_grouping_builds_an_empty_track() {
    let words = three_words();
    let fps = Fps::new(30, 1).unwrap();
    let track = CaptionTrack::build(&words, &Grouping::default(), fps, 500).unwrap();
    assert!(track.is_empty());
    assert_eq!(track.end_frame(), 0);
}
