use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
    assert_eq!(r.len_frames(), 3);
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    let err = FrameRange::new(FrameIndex(5), FrameIndex(2)).unwrap_err();
    assert!(err.to_string().contains("must be <= end"));
    assert!(FrameRange::new(FrameIndex(3), FrameIndex(3)).unwrap().is_empty());
}

#[test]
fn positions_pair_global_with_local() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    let pos: Vec<_> = r.positions().collect();
    assert_eq!(
        pos,
        vec![
            (FrameIndex(2), FrameIndex(0)),
            (FrameIndex(3), FrameIndex(1)),
            (FrameIndex(4), FrameIndex(2)),
        ]
    );
    assert_eq!(r.positions().len(), 3);
}

#[test]
fn to_local_is_none_outside_range() {
    let r = FrameRange::new(FrameIndex(10), FrameIndex(12)).unwrap();
    assert_eq!(r.to_local(FrameIndex(11)), Some(FrameIndex(1)));
    assert_eq!(r.to_local(FrameIndex(12)), None);
    assert_eq!(r.to_local(FrameIndex(9)), None);
}

#[test]
fn rgb8_serializes_as_triplet() {
    let c = Rgb8::new(100, 149, 237);
    let json = serde_json::to_string(&c).unwrap();
    assert_eq!(json, "[100,149,237]");
    let back: Rgb8 = serde_json::from_str(&json).unwrap();
    assert_eq!(back, c);
}
