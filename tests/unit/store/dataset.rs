use super::*;
use crate::foundation::core::FrameIndex;

fn project_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target")
        .join("unit_store_dataset")
        .join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write an uncompressed lane chunked along the frame axis only.
#[allow(clippy::too_many_arguments)]
fn write_lane(
    root: &Path,
    name: &str,
    shape: &[u64],
    rows_per_chunk: u64,
    dtype: &str,
    fill: &str,
    data: &[u8],
    absent: &[u64],
) {
    let dir = name.split('/').fold(root.to_path_buf(), |p, s| p.join(s));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let mut chunks: Vec<u64> = shape.iter().map(|&d| d.max(1)).collect();
    chunks[0] = rows_per_chunk;
    std::fs::write(
        dir.join(".zarray"),
        format!(
            r#"{{"zarr_format": 2, "shape": {shape:?}, "chunks": {chunks:?}, "dtype": "{dtype}",
                "compressor": null, "fill_value": {fill}, "order": "C", "filters": null}}"#
        ),
    )
    .unwrap();

    let row_bytes = data.len() / shape[0] as usize;
    let tail = ".0".repeat(shape.len() - 1);
    for c in 0..shape[0].div_ceil(rows_per_chunk) {
        if absent.contains(&c) || row_bytes == 0 {
            continue;
        }
        let start = (c * rows_per_chunk) as usize * row_bytes;
        let end = (start + rows_per_chunk as usize * row_bytes).min(data.len());
        let mut chunk = data[start..end].to_vec();
        chunk.resize(rows_per_chunk as usize * row_bytes, 0);
        std::fs::write(dir.join(format!("{c}{tail}")), chunk).unwrap();
    }
}

fn f64_bytes(values: impl IntoIterator<Item = f64>) -> Vec<u8> {
    values.into_iter().flat_map(f64::to_le_bytes).collect()
}

/// Five-frame dataset with two episodes (`[2, 5]`); frame `p` carries `p` in every lane.
fn write_dataset(root: &Path, camera_shape: &[u64]) {
    std::fs::create_dir_all(root).unwrap();
    std::fs::write(root.join(".zgroup"), r#"{"zarr_format": 2}"#).unwrap();
    let ends: Vec<u8> = [2i64, 5].iter().flat_map(|v| v.to_le_bytes()).collect();
    write_lane(root, EPISODE_ENDS, &[2], 2, "<i8", "0", &ends, &[]);

    let n = camera_shape[0];
    let pixels: u64 = camera_shape[1..].iter().product();
    let cam: Vec<u8> = (0..n)
        .flat_map(|p| vec![p as u8 + 1; pixels as usize])
        .collect();
    write_lane(root, CAMERA, camera_shape, 1, "|u1", "0", &cam, &[]);

    let vec3 = f64_bytes((0..n).flat_map(|p| [p as f64, 0.0, 0.0]));
    write_lane(root, EEF_POS, &[n, 3], 2, "<f8", "0.0", &vec3, &[]);
    write_lane(root, EEF_ROT, &[n, 3], 2, "<f8", "0.0", &vec3, &[]);
    let grip = f64_bytes((0..n).map(|p| p as f64 * 0.01));
    write_lane(root, GRIPPER, &[n, 1], 4, "<f8", "0.0", &grip, &[]);
}

#[test]
fn opens_project_folder_and_reads_global_rows() {
    let project = project_dir("project");
    write_dataset(&project.join(DATASET_DIR_NAME), &[5, 2, 3, 3]);

    let mut ds = ZarrDataset::open(&project).unwrap();
    assert!(ds.root().ends_with(DATASET_DIR_NAME));
    assert_eq!(ds.num_frames(), 5);
    assert_eq!(ds.num_episodes(), 2);
    assert_eq!(ds.episode_boundaries().ends(), &[2, 5]);

    let img = ds.image(3).unwrap().unwrap();
    assert_eq!((img.height, img.width, img.channels), (2, 3, 3));
    assert!(img.data.iter().all(|&b| b == 4));

    let pos = ds.eef_pos(4).unwrap();
    assert_eq!(pos.shape, vec![3]);
    assert_eq!(pos.values, vec![4.0, 0.0, 0.0]);
    assert_eq!(ds.eef_rot(2).unwrap().values, vec![2.0, 0.0, 0.0]);
    assert!((ds.gripper_width(3).unwrap() - 0.03).abs() < 1e-12);

    let range = ds
        .episode_boundaries()
        .resolve(crate::episode::index::EpisodeId(1))
        .unwrap();
    assert_eq!((range.start, range.end), (FrameIndex(2), FrameIndex(5)));
}

#[test]
fn accepts_store_root_and_grayscale_camera() {
    let root = project_dir("gray");
    write_dataset(&root, &[5, 4, 4]);

    let mut ds = ZarrDataset::open(&root).unwrap();
    let img = ds.image(0).unwrap().unwrap();
    assert_eq!(img.channels, 1);
    assert_eq!(img.size(), 16);
}

#[test]
fn missing_dataset_is_a_config_error() {
    let dir = project_dir("empty");
    assert!(matches!(ZarrDataset::open(&dir), Err(UmiError::Config(_))));
}

#[test]
fn lane_length_mismatch_is_rejected() {
    let root = project_dir("mismatch");
    write_dataset(&root, &[5, 2, 2, 3]);
    let grip = f64_bytes([0.0; 4]);
    write_lane(&root, GRIPPER, &[4, 1], 4, "<f8", "0.0", &grip, &[]);

    let err = ZarrDataset::open(&root).unwrap_err();
    assert!(matches!(err, UmiError::Store(_)), "{err}");
    assert!(err.to_string().contains(GRIPPER));
}

#[test]
fn episode_ends_past_data_are_rejected() {
    let root = project_dir("overrun");
    write_dataset(&root, &[5, 2, 2, 3]);
    let ends: Vec<u8> = [2i64, 9].iter().flat_map(|v| v.to_le_bytes()).collect();
    write_lane(&root, EPISODE_ENDS, &[2], 2, "<i8", "0", &ends, &[]);

    assert!(matches!(ZarrDataset::open(&root), Err(UmiError::Store(_))));
}

#[test]
fn absent_image_chunk_without_fill_is_missing() {
    let root = project_dir("nofill");
    write_dataset(&root, &[5, 2, 2, 3]);
    let cam = vec![7u8; 5 * 12];
    write_lane(&root, CAMERA, &[5, 2, 2, 3], 1, "|u1", "null", &cam, &[1]);

    let mut ds = ZarrDataset::open(&root).unwrap();
    assert!(ds.image(0).unwrap().is_some());
    assert!(ds.image(1).unwrap().is_none());
}

#[test]
fn zero_sized_images_decode_as_empty() {
    let root = project_dir("zero");
    write_dataset(&root, &[5, 0, 4, 3]);

    let mut ds = ZarrDataset::open(&root).unwrap();
    let img = ds.image(0).unwrap().unwrap();
    assert!(img.is_empty());
}

#[test]
fn float_camera_is_unsupported() {
    let root = project_dir("floatcam");
    write_dataset(&root, &[5, 1, 1, 3]);
    let cam = f64_bytes([0.0; 15]);
    write_lane(&root, CAMERA, &[5, 1, 1, 3], 1, "<f8", "0.0", &cam, &[]);

    assert!(matches!(ZarrDataset::open(&root), Err(UmiError::Unsupported(_))));
}
