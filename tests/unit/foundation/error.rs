use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        UmiError::config("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        UmiError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(UmiError::store("x").to_string().contains("store error:"));
    assert!(
        UmiError::unsupported("x")
            .to_string()
            .contains("unsupported:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = UmiError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn episode_range_names_both_numbers() {
    let err = UmiError::EpisodeRange {
        episode: 4,
        episodes: 2,
    };
    let msg = err.to_string();
    assert!(msg.contains("episode 4"));
    assert!(msg.contains("2 episode(s)"));
}

#[test]
fn shape_error_reports_expected_and_actual() {
    let err = FrameError::Shape {
        index: FrameIndex(7),
        field: "eef_pos",
        expected: vec![3],
        actual: vec![2],
    };
    assert_eq!(
        err.to_string(),
        "frame 7: eef_pos must be shape (3,), got (2,)"
    );
    assert_eq!(err.index(), FrameIndex(7));
}

#[test]
fn empty_image_error_names_frame() {
    let err = UmiError::from(FrameError::EmptyImage {
        index: FrameIndex(0),
    });
    assert_eq!(err.to_string(), "frame 0: image data is empty");
}

#[test]
fn shapes_format_like_array_libraries() {
    assert_eq!(fmt_shape(&[]), "()");
    assert_eq!(fmt_shape(&[3]), "(3,)");
    assert_eq!(fmt_shape(&[3, 1]), "(3, 1)");
}
