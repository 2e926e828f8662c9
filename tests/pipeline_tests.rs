//! Integration tests for the batch pipeline.

use std::fs;
use std::path::Path;

use capture_spectrum::listener::{PipelineEvent, RecordingListener};
use capture_spectrum::pipeline::{
    analyze_capture_file, run, run_with, CaptureSource, PipelineConfig, PipelineError,
};
use capture_spectrum::{ParseError, SynthError, WaveformKind};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn write_capture(path: &Path, sample_rate: u64, samples: &[f32]) {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"<SALEAE>");
    bytes.extend_from_slice(&0i32.to_le_bytes());
    bytes.extend_from_slice(&1i32.to_le_bytes());
    bytes.extend_from_slice(&0.0f64.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&1u64.to_le_bytes());
    bytes.extend_from_slice(&(samples.len() as u64).to_le_bytes());
    for s in samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    fs::write(path, bytes).unwrap();
}

#[test]
fn test_failures_are_isolated_per_source() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.bin");
    let bad = dir.path().join("bad.bin");
    write_capture(&good, 1000, &[1.0, 0.0, -1.0, 0.0]);
    fs::write(&bad, b"<SALEAX>garbage").unwrap();

    let config = PipelineConfig {
        sources: vec![
            CaptureSource::synth(WaveformKind::Square, 30.0e6),
            CaptureSource::file(&bad),
            CaptureSource::file(dir.path().join("missing.bin")),
            CaptureSource::file(&good),
            CaptureSource::synth(WaveformKind::Sine, 1.0e6),
        ],
        seed: Some(1),
        ..Default::default()
    };

    let outcomes = run(&config);
    assert_eq!(outcomes.len(), 5);

    assert!(matches!(
        outcomes[0].result,
        Err(PipelineError::Synth(SynthError::BelowNyquist { .. }))
    ));
    assert!(matches!(
        outcomes[1].result,
        Err(PipelineError::Parse(ParseError::BadMagic { .. }))
    ));
    assert!(matches!(
        outcomes[2].result,
        Err(PipelineError::Parse(ParseError::Open { .. }))
    ));

    let parsed = outcomes[3].result.as_ref().unwrap();
    assert_eq!(parsed.label, good.display().to_string());
    assert_eq!(parsed.spectrum.len(), 4);
    assert_eq!(parsed.spectrum.sample_rate, 1000);

    let generated = outcomes[4].result.as_ref().unwrap();
    assert_eq!(generated.label, "generated_sine_wave");
    assert_eq!(generated.capture.sample_rate(), 50_000_000);
    assert_eq!(generated.spectrum.len(), 1024);
}

#[test]
fn test_seeded_pipeline_is_reproducible() {
    let config = PipelineConfig {
        sources: vec![
            CaptureSource::synth(WaveformKind::Square, 2.0e6),
            CaptureSource::synth(WaveformKind::Sine, 5.0e6),
        ],
        noise_scale: 0.3,
        seed: Some(1234),
        ..Default::default()
    };

    let first = run(&config);
    let second = run(&config);
    for (a, b) in first.iter().zip(&second) {
        let a = a.result.as_ref().unwrap();
        let b = b.result.as_ref().unwrap();
        assert_eq!(a.spectrum, b.spectrum);
    }
}

#[test]
fn test_listener_sees_every_source() {
    let config = PipelineConfig {
        sources: vec![
            CaptureSource::synth(WaveformKind::Square, 1.0e6),
            CaptureSource::synth(WaveformKind::Square, 40.0e6),
        ],
        noise_scale: 0.1,
        ..Default::default()
    };

    let mut listener = RecordingListener::new();
    let mut rng = StdRng::seed_from_u64(0);
    run_with(&config, &mut rng, &mut listener);

    let kinds: Vec<&str> = listener
        .events
        .iter()
        .map(|e| match e {
            PipelineEvent::Synthesized { .. } => "synthesized",
            PipelineEvent::SynthFailed { .. } => "synth_failed",
            PipelineEvent::NoiseApplied { .. } => "noise",
            PipelineEvent::Analyzed { .. } => "analyzed",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["synthesized", "noise", "analyzed", "synth_failed"]);
}

#[test]
fn test_config_file_and_sample_rate_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.json");
    fs::write(
        &path,
        r#"{
            "sources": [{"type": "synth", "kind": "square", "frequency": 100.0}],
            "synth_sample_rate": 1000,
            "high_level": 5.0,
            "low_level": 0.0
        }"#,
    )
    .unwrap();

    let config = PipelineConfig::from_json_file(&path).unwrap();
    let outcomes = run(&config);
    let analyzed = outcomes[0].result.as_ref().unwrap();

    assert_eq!(analyzed.capture.sample_rate(), 1000);
    assert!(analyzed
        .capture
        .samples()
        .iter()
        .all(|&s| s == 5.0 || s == 0.0));
    assert_eq!(analyzed.spectrum.bins[1].frequency, 1000.0 / 1024.0);
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        PipelineConfig::from_json_file(dir.path().join("none.json")),
        Err(PipelineError::Io(_))
    ));
}

#[test]
fn test_analyze_capture_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.bin");
    write_capture(&path, 8, &[1.0; 8]);

    let analyzed = analyze_capture_file(&path).unwrap();
    assert_eq!(analyzed.capture.num_samples(), 8);
    assert_eq!(analyzed.spectrum.bins[0].magnitude, 8.0);

    let json = serde_json::to_string(&analyzed).unwrap();
    assert!(json.contains("\"label\""));
    assert!(json.contains("\"spectrum\""));
}
