use super::*;

fn word(text: &str, start_sec: f64, end_sec: f64) -> Word {
    Word {
        text: text.to_string(),
        start_sec,
        end_sec,
    }
}

#[test]
fn parses_transcriber_field_names() {
    let json = br#"[
        {"word": "Great", "start": 0.14, "end": 0.32},
        {"word": "ideas", "start": 0.32, "end": 0.62}
    ]"#;
    let timeline = WordTimeline::from_json_slice(json).unwrap();
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline.get(0).unwrap().text, "Great");
    assert_eq!(timeline.get(1).unwrap().start_sec, 0.32);
    assert!(timeline.get(2).is_none());
}

#[test]
fn rejects_inverted_interval() {
    let err = WordTimeline::new(vec![word("a", 1.0, 0.5)]).unwrap_err();
    assert!(matches!(err, CapsyncError::Validation(_)), "{err}");
}

#[test]
fn rejects_unsorted_words() {
    let err = WordTimeline::new(vec![word("b", 2.0, 3.0), word("a", 0.0, 1.0)]).unwrap_err();
    assert!(matches!(err, CapsyncError::Validation(_)), "{err}");
}

#[test]
fn rejects_overlapping_words() {
    let err = WordTimeline::new(vec![word("a", 0.0, 1.0), word("b", 0.5, 2.0)]).unwrap_err();
    assert!(matches!(err, CapsyncError::Validation(_)), "{err}");
}

#[test]
fn touching_intervals_are_fine() {
    let timeline = WordTimeline::new(vec![word("a", 0.0, 1.0), word("b", 1.0, 2.0)]).unwrap();
    assert_eq!(timeline.words()[1].duration_sec(), 1.0);
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = WordTimeline::from_json_slice(b"{not json").unwrap_err();
    assert!(matches!(err, CapsyncError::Serde(_)), "{err}");
}

#[test]
fn empty_timeline_is_valid() {
    let timeline = WordTimeline::from_json_slice(b"[]").unwrap();
    assert!(timeline.is_empty());
}
