//! Tests for picking a crop box out of detector output.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::*;
use insectcrop::detector::{locate, select_candidate};

fn candidate(x: u32, y: u32, w: u32, h: u32, confidence: f32) -> Candidate {
    Candidate {
        bbox: BoundingBox::new(x, y, w, h),
        confidence,
        class_id: 0,
    }
}

fn by_confidence() -> DetectorConfig {
    DetectorConfig {
        order: CandidateOrder::ByConfidence,
        ..DetectorConfig::default()
    }
}

#[test]
fn test_no_candidates_is_not_found() -> anyhow::Result<()> {
    let img = uniform_image(100, 100, WHITE);
    let detector = JsonDetector::default();

    assert_eq!(locate(&detector, &img, &DetectorConfig::default())?, None);
    assert_eq!(select_candidate(&[], &by_confidence()), None);
    Ok(())
}

#[test]
fn test_as_returned_takes_first() {
    let candidates = [
        candidate(0, 0, 10, 10, 0.3),
        candidate(20, 20, 10, 10, 0.9),
    ];
    let chosen = select_candidate(&candidates, &DetectorConfig::default());
    assert_eq!(chosen, Some(candidates[0]));
}

#[test]
fn test_by_confidence_takes_best() {
    let candidates = [
        candidate(0, 0, 10, 10, 0.3),
        candidate(20, 20, 10, 10, 0.9),
        candidate(40, 40, 10, 10, 0.5),
    ];
    let chosen = select_candidate(&candidates, &by_confidence());
    assert_eq!(chosen, Some(candidates[1]));
}

#[test]
fn test_confidence_tie_keeps_earliest() {
    let candidates = [
        candidate(0, 0, 10, 10, 0.2),
        candidate(20, 20, 10, 10, 0.8),
        candidate(40, 40, 10, 10, 0.8),
    ];
    let chosen = select_candidate(&candidates, &by_confidence());
    assert_eq!(chosen.map(|c| c.bbox.x), Some(20));
}

#[test]
fn test_min_confidence_filters() {
    let candidates = [
        candidate(0, 0, 10, 10, 0.1),
        candidate(20, 20, 10, 10, 0.6),
    ];
    let config = DetectorConfig {
        min_confidence: 0.5,
        ..DetectorConfig::default()
    };
    assert_eq!(select_candidate(&candidates, &config), Some(candidates[1]));

    let strict = DetectorConfig {
        min_confidence: 0.95,
        ..DetectorConfig::default()
    };
    assert_eq!(select_candidate(&candidates, &strict), None);
}

#[test]
fn test_locate_clamps_to_image() -> anyhow::Result<()> {
    let img = uniform_image(100, 80, WHITE);
    let detector = JsonDetector::from_candidates(vec![candidate(90, 70, 50, 50, 0.9)]);

    let bbox = locate(&detector, &img, &DetectorConfig::default())?;
    assert_eq!(bbox, Some(BoundingBox::new(90, 70, 10, 10)));
    Ok(())
}

#[test]
fn test_candidate_outside_image_is_not_found() -> anyhow::Result<()> {
    let img = uniform_image(100, 80, WHITE);
    let detector = JsonDetector::from_candidates(vec![candidate(150, 10, 20, 20, 0.9)]);

    assert_eq!(locate(&detector, &img, &DetectorConfig::default())?, None);
    Ok(())
}

#[test]
fn test_json_detections_parse() -> anyhow::Result<()> {
    let detector = JsonDetector::from_json(
        r#"[
            {"x1": 10.7, "y1": 20.2, "x2": 50.9, "y2": 60.0, "confidence": 0.75, "class_id": 3},
            {"x1": 40, "y1": 30, "x2": 5, "y2": 2, "confidence": 0.5}
        ]"#,
    )?;

    let candidates = detector.candidates();
    assert_eq!(candidates.len(), 2);

    assert_eq!(candidates[0].bbox, BoundingBox::new(10, 20, 40, 40));
    assert_eq!(candidates[0].class_id, 3);
    assert_eq!(candidates[0].confidence, 0.75);

    // Reversed corners are normalised; class_id defaults to zero.
    assert_eq!(candidates[1].bbox, BoundingBox::new(5, 2, 35, 28));
    assert_eq!(candidates[1].class_id, 0);
    Ok(())
}

#[test]
fn test_malformed_json_is_an_error() {
    let result = JsonDetector::from_json(r#"[{"x1": 1}]"#);
    assert!(matches!(result, Err(CropError::Json(_))));
}

#[test]
fn test_lazy_detector_loads_once() -> anyhow::Result<()> {
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = loads.clone();
    let detector = LazyDetector::new("counted", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(JsonDetector::from_candidates(vec![candidate(
            5, 5, 10, 10, 0.9,
        )]))
    });
    assert!(!detector.is_loaded());

    let img = uniform_image(50, 50, WHITE);
    for _ in 0..3 {
        let bbox = locate(&detector, &img, &DetectorConfig::default())?;
        assert_eq!(bbox, Some(BoundingBox::new(5, 5, 10, 10)));
    }

    assert!(detector.is_loaded());
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_lazy_detector_retries_failed_load() -> anyhow::Result<()> {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let detector = LazyDetector::new("flaky", move || {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(CropError::Detector("model file missing".into()))
        } else {
            Ok(JsonDetector::default())
        }
    });

    let img = uniform_image(20, 20, WHITE);
    let first = locate(&detector, &img, &DetectorConfig::default());
    assert!(matches!(first, Err(CropError::Detector(_))));
    assert!(!detector.is_loaded());

    assert_eq!(locate(&detector, &img, &DetectorConfig::default())?, None);
    assert!(detector.is_loaded());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    Ok(())
}

#[test]
fn test_lazy_detector_is_shared_across_threads() -> anyhow::Result<()> {
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = loads.clone();
    let detector = Arc::new(LazyDetector::new("shared", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(JsonDetector::default())
    }));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let detector = detector.clone();
            std::thread::spawn(move || detector.get().map(|_| ()))
        })
        .collect();
    for handle in handles {
        handle.join().expect("detector thread panicked")?;
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    Ok(())
}
