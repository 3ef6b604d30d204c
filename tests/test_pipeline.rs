mod common;

use imgpre::{
    PipelineConfig, PipelineError, Prepared, Preprocessor, ProcessedImage, ScreenFitConfig, Size, StopReason, process_image,
};

#[test]
fn blurred_scan_shrinks_toward_floor_and_records_dpi() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scan.png");
    let output = dir.path().join("scan.jpg");
    common::blurred(800, 600, 3.0).save(&input).unwrap();

    let report = process_image(&input, &output, &PipelineConfig::default()).unwrap();
    assert_eq!(report.source_size, Size::new(800, 600));
    assert!(!report.prescaled);
    assert!(report.steps >= 1);
    let short = report.size.short_side();
    assert!((500..600).contains(&short), "{}", report.size);
    let aspect = f64::from(report.size.w) / f64::from(report.size.h);
    assert!((aspect - 4.0 / 3.0).abs() < 0.05, "{aspect}");
    assert!(report.baseline_score > 0.0);

    let written = image::open(&output).unwrap();
    assert_eq!((written.width(), written.height()), (report.size.w, report.size.h));
    assert_eq!(common::jfif_density(&output), (1, 300, 300));
}

/// Checks the blurred-photo outcome: floor respected before the fit, the fit
/// applied whenever a side exceeds the threshold, and the aspect ratio kept.
fn assert_blurred_photo_outcome(report: &ProcessedImage, config: &PipelineConfig) {
    let source = report.source_size;
    let optimized = report.optimized_size;
    assert!(report.steps >= 1);
    assert!(optimized.short_side() >= config.optimizer.min_short_side, "{optimized}");
    if optimized.long_side() > config.screen.threshold {
        assert!(
            report.size.w <= config.screen.max_width && report.size.h <= config.screen.max_height,
            "{optimized} -> {}",
            report.size
        );
    } else {
        assert_eq!(report.size, optimized);
    }
    let aspect = |s: Size| f64::from(s.w) / f64::from(s.h);
    assert!((aspect(report.size) - aspect(source)).abs() / aspect(source) < 0.05, "{}", report.size);
}

#[test]
fn blurred_photo_scaled_down_fits_screen() {
    // 4000x3000 with a 1920x1080 box, every length divided by five.
    let mut config = PipelineConfig::default();
    config.optimizer.min_short_side = 100;
    config.screen = ScreenFitConfig {
        max_width: 384,
        max_height: 216,
        threshold: 400,
    };
    let mut preprocessor = Preprocessor::new(config.clone()).unwrap();
    let Prepared { image, report } = preprocessor.prepare(common::blurred(800, 600, 0.8)).unwrap();

    assert_eq!(report.source_size, Size::new(800, 600));
    assert_eq!(report.size, Size::new(image.width(), image.height()));
    assert_blurred_photo_outcome(&report, &config);
}

#[test]
#[ignore = "decodes, resamples and encodes a 12 MP image"]
fn full_size_blurred_photo() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("photo.png");
    let output = dir.path().join("photo.jpg");
    common::blurred(4000, 3000, 4.0).save(&input).unwrap();

    let config = PipelineConfig::default();
    let report = process_image(&input, &output, &config).unwrap();
    assert_eq!(report.source_size, Size::new(4000, 3000));
    assert_blurred_photo_outcome(&report, &config);
}

#[test]
fn small_image_is_written_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("small.png");
    let output = dir.path().join("small_out.png");
    let source = common::textured(400, 300);
    source.save(&input).unwrap();

    let report = process_image(&input, &output, &PipelineConfig::default()).unwrap();
    assert_eq!(report.size, Size::new(400, 300));
    assert_eq!(report.steps, 0);
    assert_eq!(report.stop, StopReason::Floor);
    assert_eq!(image::open(&output).unwrap().to_rgb8(), source);
}

#[test]
fn screen_fit_caps_wide_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("wide.png");
    let output = dir.path().join("wide_out.png");
    common::textured(900, 300).save(&input).unwrap();

    let mut config = PipelineConfig::default();
    config.screen.max_width = 400;
    config.screen.max_height = 400;
    config.screen.threshold = 500;
    let report = process_image(&input, &output, &config).unwrap();
    // 300 short side is under the floor, so only screen fit changes the size.
    assert_eq!(report.steps, 0);
    assert_eq!(report.size, Size::new(400, 133));
}

#[test]
fn errors_surface_with_their_stage() {
    let dir = tempfile::tempdir().unwrap();
    let corrupt = dir.path().join("broken.jpg");
    common::write_corrupt(&corrupt);
    let err = process_image(&corrupt, dir.path().join("out.jpg"), &PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, PipelineError::Decode { .. }), "{err}");
    assert_eq!(err.stage(), "decode");

    let good = dir.path().join("good.png");
    common::textured(64, 48).save(&good).unwrap();
    let err = process_image(&good, dir.path().join("out.unknown"), &PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, PipelineError::Encode { .. }), "{err}");

    let mut bad = PipelineConfig::default();
    bad.optimizer.step_ratio = 1.5;
    let err = process_image(&good, dir.path().join("out.png"), &bad).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)), "{err}");
}
