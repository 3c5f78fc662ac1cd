use serde::{Deserialize, Serialize};

/// A detected face, in the coordinate space of the frame the detector
/// was given (for identification that is the downscaled frame).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    /// Five-point facial landmarks: [left_eye, right_eye, nose, left_mouth, right_mouth].
    pub landmarks: [(f32, f32); 5],
}

/// Integer face bounding box in CSS order: top, right, bottom, left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceLocation {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl FaceLocation {
    /// Truncate a detection box to integer CSS-order coordinates.
    pub fn from_detection(det: &Detection) -> Self {
        Self {
            top: det.y as i32,
            right: (det.x + det.width) as i32,
            bottom: (det.y + det.height) as i32,
            left: det.x as i32,
        }
    }

    /// Map coordinates from a frame downscaled by `factor` back to the
    /// original frame, truncating toward zero.
    pub fn upscale(&self, factor: f32) -> Self {
        let map = |v: i32| (v as f32 / factor) as i32;
        Self {
            top: map(self.top),
            right: map(self.right),
            bottom: map(self.bottom),
            left: map(self.left),
        }
    }
}

/// Face embedding vector (512-dimensional for ArcFace), L2-normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    /// Euclidean distance to another embedding. Lower = more similar.
    pub fn distance(&self, other: &Embedding) -> f32 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

/// A registered face: the label derived from its reference image and
/// the embedding extracted from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnownFace {
    pub label: String,
    pub embedding: Embedding,
}

/// Result of matching a probe embedding against the known-face gallery.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub matched: bool,
    /// Euclidean distance of the nearest gallery entry; infinite when
    /// the gallery is empty.
    pub distance: f32,
    /// Label of the nearest entry when it matched.
    pub label: Option<String>,
}

/// Strategy for matching a probe embedding against the gallery.
pub trait Matcher {
    fn compare(&self, probe: &Embedding, gallery: &[KnownFace], threshold: f32) -> MatchResult;
}

/// Nearest-neighbor matcher: the gallery entry at minimum Euclidean
/// distance wins, and counts as a match when within `threshold`.
pub struct EuclideanMatcher;

impl Matcher for EuclideanMatcher {
    fn compare(&self, probe: &Embedding, gallery: &[KnownFace], threshold: f32) -> MatchResult {
        let mut best_dist = f32::INFINITY;
        let mut best_idx: Option<usize> = None;

        for (i, known) in gallery.iter().enumerate() {
            let dist = probe.distance(&known.embedding);
            if dist < best_dist {
                best_dist = dist;
                best_idx = Some(i);
            }
        }

        match best_idx {
            Some(idx) if best_dist <= threshold => MatchResult {
                matched: true,
                distance: best_dist,
                label: Some(gallery[idx].label.clone()),
            },
            _ => MatchResult {
                matched: false,
                distance: best_dist,
                label: None,
            },
        }
    }
}
