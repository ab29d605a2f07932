use std::path::Path;
use std::sync::{Arc, Mutex};

use image::RgbImage;
use serde::Deserialize;

use crate::config::{CandidateOrder, DetectorConfig};
use crate::error::Result;
use crate::models::{BoundingBox, Candidate};

/// Pluggable object detection backend.
///
/// Implementations return candidates in their own order; see
/// [`CandidateOrder`] for how one is picked.
pub trait Detector: Send + Sync {
    fn detect(&self, image: &RgbImage) -> Result<Vec<Candidate>>;

    /// Human-readable name (used in log output)
    fn name(&self) -> &str;
}

/// Pick the candidate to crop, or `None` when there is nothing usable.
pub fn select_candidate(candidates: &[Candidate], config: &DetectorConfig) -> Option<Candidate> {
    let mut usable = candidates
        .iter()
        .filter(|c| c.confidence >= config.min_confidence);

    match config.order {
        CandidateOrder::AsReturned => usable.next().copied(),
        CandidateOrder::ByConfidence => usable
            .fold(None::<&Candidate>, |best, c| match best {
                Some(b) if c.confidence <= b.confidence => Some(b),
                _ => Some(c),
            })
            .copied(),
    }
}

/// Run `detector` and reduce its output to one in-bounds box.
///
/// An empty candidate list, or a chosen box that falls outside the image,
/// gives `Ok(None)` just like a segmentation miss.
pub fn locate(
    detector: &dyn Detector,
    image: &RgbImage,
    config: &DetectorConfig,
) -> Result<Option<BoundingBox>> {
    let candidates = detector.detect(image)?;
    tracing::debug!(
        detector = detector.name(),
        count = candidates.len(),
        "detector returned candidates"
    );

    let Some(chosen) = select_candidate(&candidates, config) else {
        tracing::info!("No detection");
        return Ok(None);
    };

    let bbox = chosen.bbox.clamp_to(image.width(), image.height());
    if bbox.is_empty() {
        tracing::warn!(bbox = %chosen.bbox, "selected detection lies outside the image");
        return Ok(None);
    }

    tracing::debug!(
        %bbox,
        confidence = chosen.confidence,
        class_id = chosen.class_id,
        "selected detection"
    );
    Ok(Some(bbox))
}

type Loader<D> = Box<dyn Fn() -> Result<D> + Send + Sync>;

/// Detector whose model is loaded on first use and then reused.
///
/// A failed load is reported and attempted again on the next call.
pub struct LazyDetector<D> {
    name: String,
    loader: Loader<D>,
    // Arc so the handle can be cloned out and the lock released before inference
    detector: Mutex<Option<Arc<D>>>,
}

impl<D: Detector> LazyDetector<D> {
    pub fn new<F>(name: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Result<D> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            loader: Box::new(loader),
            detector: Mutex::new(None),
        }
    }

    /// The loaded detector, loading it if this is the first call.
    pub fn get(&self) -> Result<Arc<D>> {
        let mut guard = self.detector.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(detector) = guard.as_ref() {
            return Ok(detector.clone());
        }

        tracing::info!("Loading detector {}...", self.name);
        let detector = Arc::new((self.loader)()?);
        tracing::info!("Detector {} loaded", self.name);
        *guard = Some(detector.clone());
        Ok(detector)
    }

    pub fn is_loaded(&self) -> bool {
        self.detector
            .lock()
            .map(|g| g.is_some())
            .unwrap_or_else(|e| e.into_inner().is_some())
    }
}

impl<D: Detector> Detector for LazyDetector<D> {
    fn detect(&self, image: &RgbImage) -> Result<Vec<Candidate>> {
        self.get()?.detect(image)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// One detection in `x1, y1, x2, y2` corner form.
#[derive(Debug, Clone, Deserialize)]
struct RawDetection {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    confidence: f32,
    #[serde(default)]
    class_id: u32,
}

impl From<RawDetection> for Candidate {
    fn from(raw: RawDetection) -> Self {
        Candidate {
            bbox: BoundingBox::from_corners(
                raw.x1 as i64,
                raw.y1 as i64,
                raw.x2 as i64,
                raw.y2 as i64,
            ),
            confidence: raw.confidence,
            class_id: raw.class_id,
        }
    }
}

/// Serves candidates exported by an external detector as a JSON array.
#[derive(Debug, Clone, Default)]
pub struct JsonDetector {
    candidates: Vec<Candidate>,
}

impl JsonDetector {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let raw: Vec<RawDetection> = serde_json::from_str(text)?;
        Ok(Self {
            candidates: raw.into_iter().map(Candidate::from).collect(),
        })
    }

    pub fn from_candidates(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }
}

impl Detector for JsonDetector {
    fn detect(&self, _image: &RgbImage) -> Result<Vec<Candidate>> {
        Ok(self.candidates.clone())
    }

    fn name(&self) -> &str {
        "json"
    }
}
