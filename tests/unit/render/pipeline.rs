use super::*;

use crate::compose::frame::EffectParams;
use crate::foundation::core::{Canvas, Fps, Rgba8Premul};
use crate::layout::line::CaptionStyle;
use crate::track::resolve::CaptionTrack;
use crate::transcript::grouping::Grouping;
use crate::transcript::words::WordTimeline;

fn empty_comp() -> CaptionComposition {
    let fps = Fps::new(30, 1).unwrap();
    let timeline = WordTimeline::new(vec![]).unwrap();
    let track = CaptionTrack::build(&timeline, &Grouping::default(), fps, 500).unwrap();
    CaptionComposition {
        track,
        canvas: Canvas {
            width: 64,
            height: 64,
        },
        fps,
        duration: FrameIndex(8),
        style: CaptionStyle::new("fonts/caption.ttf"),
        effects: EffectParams::default(),
    }
}

#[test]
fn empty_track_prepares_without_io_and_renders_transparent() {
    let comp = empty_comp();
    // The style's font file does not exist; an empty track must not read it.
    let prepared = PreparedCaptions::prepare(&comp, "no/such/root").unwrap();
    assert!(prepared.line_layouts().is_empty());

    let range = FrameRange {
        start: FrameIndex(0),
        end: FrameIndex(8),
    };
    let (frames, stats) =
        render_frames_with_stats(&comp, &prepared, range, &RenderThreading::default()).unwrap();

    assert_eq!(frames.len(), 8);
    assert_eq!(stats.frames_total, 8);
    assert_eq!(stats.frames_rendered, 0);
    assert_eq!(stats.frames_blank, 8);
    for frame in &frames {
        assert_eq!(frame.width, 64);
        assert!(frame.premultiplied);
        assert!(frame.data.iter().all(|&b| b == 0));
    }
    assert_eq!(frames[0].pixel(0, 0), Some(Rgba8Premul::transparent()));
    assert_eq!(frames[0].pixel(64, 0), None);
}

#[test]
fn parallel_matches_sequential_on_blank_frames() {
    let comp = empty_comp();
    let prepared = PreparedCaptions::prepare(&comp, ".").unwrap();
    let range = FrameRange {
        start: FrameIndex(0),
        end: FrameIndex(8),
    };

    let (seq, _) =
        render_frames_with_stats(&comp, &prepared, range, &RenderThreading::default()).unwrap();
    let (par, stats) = render_frames_with_stats(
        &comp,
        &prepared,
        range,
        &RenderThreading {
            parallel: true,
            chunk_size: 3,
            threads: Some(2),
        },
    )
    .unwrap();

    assert_eq!(seq, par);
    assert_eq!(stats.frames_total, 8);
}

#[test]
fn empty_range_is_rejected() {
    let comp = empty_comp();
    let prepared = PreparedCaptions::prepare(&comp, ".").unwrap();
    let range = FrameRange {
        start: FrameIndex(3),
        end: FrameIndex(3),
    };
    let err =
        render_frames_with_stats(&comp, &prepared, range, &RenderThreading::default()).unwrap_err();
    assert!(matches!(err, CapsyncError::Validation(_)), "{err}");
}

#[test]
fn zero_threads_is_rejected() {
    let comp = empty_comp();
    let prepared = PreparedCaptions::prepare(&comp, ".").unwrap();
    let range = FrameRange {
        start: FrameIndex(0),
        end: FrameIndex(1),
    };
    let err = render_frames_with_stats(
        &comp,
        &prepared,
        range,
        &RenderThreading {
            parallel: true,
            chunk_size: 64,
            threads: Some(0),
        },
    )
    .unwrap_err();
    assert!(matches!(err, CapsyncError::Validation(_)), "{err}");
}

#[test]
fn composition_validation_catches_bad_canvas() {
    let mut comp = empty_comp();
    comp.canvas.width = 0;
    assert!(comp.validate().is_err());

    let mut comp = empty_comp();
    comp.canvas.height = 70_000;
    assert!(comp.validate().is_err());
}
