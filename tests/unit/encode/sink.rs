use super::*;
use crate::episode::frame::LaneRow;
use crate::episode::trajectory::Trajectory;
use crate::foundation::math::to_axis_angle;

fn record(i: u64) -> FrameRecord {
    FrameRecord::new(
        FrameImage::new(4, 6, 3, vec![9; 72]).unwrap(),
        &LaneRow::vector(vec![i as f64, 0.0, 0.0]),
        &LaneRow::vector(vec![0.0, 0.0, 0.0]),
        0.04,
        FrameIndex(i),
    )
    .unwrap()
}

fn cfg() -> SinkConfig {
    SinkConfig {
        settings: RenderSettings {
            focal_length: 300.0,
            ..RenderSettings::default()
        },
        episode: EpisodeId(0),
        range: FrameRange::new(FrameIndex(0), FrameIndex(2)).unwrap(),
    }
}

fn push_all(sink: &mut dyn RenderSink, n: u64) {
    let mut trajectory = Trajectory::new();
    for i in 0..n {
        let record = record(i);
        trajectory.push(record.eef_pos());
        sink.push_frame(&StreamedFrame {
            rotation: to_axis_angle(record.eef_rot()),
            record,
            trajectory: &trajectory,
        })
        .unwrap();
    }
}

#[test]
fn in_memory_sink_captures_frames_and_lifecycle() {
    let mut sink = InMemorySink::new();
    assert!(sink.config().is_none());
    sink.begin(cfg()).unwrap();
    push_all(&mut sink, 2);
    sink.end().unwrap();

    assert!(sink.ended());
    assert_eq!(sink.config(), Some(cfg()));
    assert_eq!(sink.indices(), vec![FrameIndex(0), FrameIndex(1)]);
    assert_eq!(sink.frames[1].trajectory_len, 2);
    assert!(sink.frames[0].rotation.is_identity());

    let cam = sink.frames[0].camera;
    assert_eq!(cam.focal_length, 300.0);
    assert_eq!((cam.width, cam.height), (6, 4));
    assert_eq!(cam.principal_point(), [3.0, 2.0]);
    assert_eq!(cam.image_plane_distance, 0.2);
}

#[test]
fn begin_resets_previous_capture() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    push_all(&mut sink, 2);
    sink.end().unwrap();

    sink.begin(cfg()).unwrap();
    assert!(sink.frames.is_empty());
    assert!(!sink.ended());
}

#[test]
fn log_sink_accepts_frames() {
    let mut sink = LogSink::new();
    sink.begin(cfg()).unwrap();
    push_all(&mut sink, 3);
    sink.end().unwrap();
    assert_eq!(sink.frames, 3);
}

#[test]
fn axis_triad_constants() {
    assert_eq!(
        AXIS_COLORS.map(Rgb8::to_array),
        [[255, 0, 0], [0, 255, 0], [0, 0, 255]]
    );
    assert_eq!(AXIS_LENGTH, 0.1);
    assert_eq!(AXIS_RADIUS, 0.002);
}
