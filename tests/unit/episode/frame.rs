use super::*;

fn img() -> FrameImage {
    FrameImage::new(10, 10, 3, vec![0; 300]).unwrap()
}

fn empty_img() -> FrameImage {
    FrameImage::new(0, 0, 3, vec![]).unwrap()
}

fn pos() -> LaneRow {
    LaneRow::vector(vec![1.0, 2.0, 3.0])
}

fn rot() -> LaneRow {
    LaneRow::vector(vec![0.1, 0.2, 0.3])
}

#[test]
fn valid_frame_is_built() {
    let f = FrameRecord::new(img(), &pos(), &rot(), 0.5, FrameIndex(0)).unwrap();
    assert_eq!(f.index(), FrameIndex(0));
    assert_eq!(f.eef_pos(), [1.0, 2.0, 3.0]);
    assert_eq!(f.eef_rot(), [0.1, 0.2, 0.3]);
    assert_eq!(f.gripper_width(), 0.5);
    assert_eq!(f.image().size(), 300);
}

#[test]
fn short_position_is_a_shape_error() {
    let bad = LaneRow::vector(vec![1.0, 2.0]);
    let err = FrameRecord::new(img(), &bad, &rot(), 0.5, FrameIndex(4)).unwrap_err();
    assert_eq!(
        err,
        FrameError::Shape {
            index: FrameIndex(4),
            field: "eef_pos",
            expected: vec![3],
            actual: vec![2],
        }
    );
    assert!(err.to_string().contains("eef_pos must be shape"));
}

#[test]
fn rotation_shape_is_checked() {
    let bad = LaneRow::vector(vec![0.0; 4]);
    let err = FrameRecord::new(img(), &pos(), &bad, 0.5, FrameIndex(1)).unwrap_err();
    assert!(matches!(err, FrameError::Shape { field: "eef_rot", .. }));
}

#[test]
fn two_dimensional_row_is_rejected_even_with_three_values() {
    let bad = LaneRow {
        shape: vec![3, 1],
        values: vec![1.0, 2.0, 3.0],
    };
    let err = FrameRecord::new(img(), &bad, &rot(), 0.5, FrameIndex(0)).unwrap_err();
    assert!(err.to_string().contains("got (3, 1)"));
}

#[test]
fn empty_image_is_rejected() {
    let err = FrameRecord::new(empty_img(), &pos(), &rot(), 0.5, FrameIndex(2)).unwrap_err();
    assert_eq!(
        err,
        FrameError::EmptyImage {
            index: FrameIndex(2)
        }
    );
    assert!(err.to_string().contains("image data is empty"));
}

#[test]
fn position_is_checked_before_image() {
    let bad = LaneRow::vector(vec![1.0]);
    let err = FrameRecord::new(empty_img(), &bad, &rot(), 0.5, FrameIndex(0)).unwrap_err();
    assert!(matches!(err, FrameError::Shape { field: "eef_pos", .. }));
}

#[test]
fn image_length_must_match_dimensions() {
    assert!(FrameImage::new(2, 2, 3, vec![0; 11]).is_err());
    assert!(FrameImage::new(2, 2, 1, vec![0; 4]).is_ok());
}
