use super::*;
use crate::encode::sink::InMemorySink;
use crate::episode::frame::{FrameImage, LaneRow};
use crate::episode::index::EpisodeBoundaries;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::UmiError;
use crate::stream::source::{InMemorySource, RawFrame};

fn raw(p: u64) -> RawFrame {
    RawFrame {
        image: Some(FrameImage::new(1, 1, 3, vec![1, 2, 3]).unwrap()),
        eef_pos: LaneRow::vector(vec![p as f64, 0.0, 0.0]),
        eef_rot: LaneRow::vector(vec![0.0, 0.0, 0.0]),
        gripper_width: 0.1,
    }
}

fn source(ends: Vec<u64>, frames: Vec<RawFrame>) -> InMemorySource {
    InMemorySource::new(EpisodeBoundaries::new(ends).unwrap(), frames).unwrap()
}

#[test]
fn completed_episode_reaches_the_sink() {
    let mut src = source(vec![2, 5], (0..5).map(raw).collect());
    let mut sink = InMemorySink::new();

    let report =
        visualize_episode(&mut src, EpisodeId(1), RenderSettings::default(), &mut sink).unwrap();
    assert_eq!(report.exit_code(), EXIT_OK);
    assert_eq!(report.range.start, FrameIndex(2));
    assert_eq!(report.stream.delivered, 3);
    assert!(sink.ended());
    assert_eq!(sink.config().unwrap().range, report.range);
    assert_eq!(sink.frames[0].record.eef_pos(), [2.0, 0.0, 0.0]);
}

#[test]
fn unknown_episode_fails_before_the_sink_begins() {
    let mut src = source(vec![2, 5], (0..5).map(raw).collect());
    let mut sink = InMemorySink::new();

    let err = visualize_episode(&mut src, EpisodeId(2), RenderSettings::default(), &mut sink)
        .unwrap_err();
    assert!(matches!(
        err,
        UmiError::EpisodeRange {
            episode: 2,
            episodes: 2
        }
    ));
    assert!(sink.config().is_none());
    assert!(sink.frames.is_empty());
}

#[test]
fn aborted_episode_still_ends_the_sink() {
    let mut frames: Vec<RawFrame> = (0..2).map(raw).collect();
    frames[0].eef_pos = LaneRow::vector(vec![1.0, 2.0]);
    let mut src = source(vec![2], frames);
    let mut sink = InMemorySink::new();

    let report =
        visualize_episode(&mut src, EpisodeId(0), RenderSettings::default(), &mut sink).unwrap();
    assert!(report.is_aborted());
    assert_eq!(report.exit_code(), EXIT_ABORTED);
    assert!(sink.ended());
    assert!(sink.frames.is_empty());
}
