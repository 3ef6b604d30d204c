mod common;

use imgpre::{BatchEntry, PipelineConfig, PipelineError, Size, process_batch};

#[test]
fn batch_records_every_image_and_keeps_going_after_failures() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out").join("nested");
    std::fs::create_dir(&input).unwrap();
    common::textured(640, 480).save(input.join("a.png")).unwrap();
    common::textured(300, 200).save(input.join("b.jpg")).unwrap();
    common::write_corrupt(&input.join("c.png"));
    std::fs::write(input.join("notes.txt"), "not an image").unwrap();

    let report = process_batch(&input, &output, &PipelineConfig::default()).unwrap();
    assert_eq!(report.len(), 3);
    assert_eq!((report.succeeded(), report.failed()), (2, 1));
    assert_eq!(report.get("a.png").and_then(BatchEntry::size), Some(Size::new(640, 480)));
    assert_eq!(report.get("b.jpg").and_then(BatchEntry::size), Some(Size::new(300, 200)));
    assert!(report.get("c.png").and_then(BatchEntry::error).is_some());
    assert!(report.get("notes.txt").is_none());

    assert!(output.join("a.png").is_file());
    assert!(output.join("b.jpg").is_file());
    assert!(!output.join("c.png").exists());
}

#[test]
fn batch_report_json_shape() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    std::fs::create_dir(&input).unwrap();
    common::textured(120, 90).save(input.join("x.png")).unwrap();
    common::write_corrupt(&input.join("y.jpeg"));

    let report = process_batch(&input, dir.path().join("out"), &PipelineConfig::default()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
    assert_eq!(json["x.png"], serde_json::json!({"status": "ok", "size": [120, 90]}));
    assert_eq!(json["y.jpeg"]["status"], "error");
    assert!(json["y.jpeg"]["error"].as_str().unwrap().contains("y.jpeg"));
}

#[test]
fn missing_input_dir_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let err = process_batch(dir.path().join("absent"), dir.path().join("out"), &PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, PipelineError::Io { .. }), "{err}");
}

#[test]
fn empty_dir_gives_empty_report() {
    let dir = tempfile::tempdir().unwrap();
    let report = process_batch(dir.path(), dir.path().join("out"), &PipelineConfig::default()).unwrap();
    assert!(report.is_empty());
}

#[cfg(unix)]
#[test]
fn non_utf8_names_keep_separate_entries_and_outputs() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    std::fs::create_dir(&input).unwrap();
    let names = [OsStr::from_bytes(b"a\xff.png"), OsStr::from_bytes(b"a\xfe.png")];
    common::textured(64, 48).save(input.join(names[0])).unwrap();
    common::textured(80, 60).save(input.join(names[1])).unwrap();

    let report = process_batch(&input, &output, &PipelineConfig::default()).unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report.succeeded(), 2);
    let mut sizes: Vec<_> = report.iter().filter_map(|(_, e)| e.size()).collect();
    sizes.sort_by_key(|s| s.w);
    assert_eq!(sizes, [Size::new(64, 48), Size::new(80, 60)]);

    let first = image::open(output.join(names[0])).unwrap();
    let second = image::open(output.join(names[1])).unwrap();
    assert_eq!((first.width(), second.width()), (64, 80));
}
