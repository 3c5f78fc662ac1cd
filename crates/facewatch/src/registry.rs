//! The known-face registry and frame identification.

use std::cmp::Ordering;

use facewatch_core::{
    EuclideanMatcher, FaceLocation, Frame, KnownFace, Matcher,
};
use serde::Serialize;
use thiserror::Error;

use crate::analyzer::{AnalyzerError, FaceAnalyzer};
use crate::config::{self, Config};
use crate::fetch::{self, FetchError, ImageSource};

/// Label assigned to detected faces that match no registry entry.
pub const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("no face found in reference image {url}")]
    NoFaceFound { url: String },
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
}

/// One identified face in a frame: its bounding box in original-frame
/// coordinates and the matched label (or [`UNKNOWN_LABEL`]).
#[derive(Debug, Clone, Serialize)]
pub struct IdentifiedFace {
    pub location: FaceLocation,
    pub label: String,
}

/// Known-face registry and matcher.
///
/// Registration appends to the registry; entries are never removed or
/// reordered. Identification reads the registry and never mutates it
/// (the `&mut self` receiver exists only because ONNX sessions require
/// mutable access).
pub struct FaceRegistry {
    analyzer: Box<dyn FaceAnalyzer>,
    source: Box<dyn ImageSource>,
    matcher: EuclideanMatcher,
    known: Vec<KnownFace>,
    resize_factor: f32,
    match_threshold: f32,
}

impl FaceRegistry {
    pub fn new(
        analyzer: Box<dyn FaceAnalyzer>,
        source: Box<dyn ImageSource>,
        config: &Config,
    ) -> Self {
        Self {
            analyzer,
            source,
            matcher: EuclideanMatcher,
            known: Vec::new(),
            resize_factor: config::checked_resize_factor(config.resize_factor),
            match_threshold: config.match_threshold,
        }
    }

    /// Number of registered faces.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Registered labels, in registration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.known.iter().map(|k| k.label.as_str())
    }

    /// Register a known face from a reference image URL.
    ///
    /// The label is the URL's trailing path segment. Detection runs at
    /// full resolution; when the image contains several faces, the
    /// highest-confidence detection is registered. Any failure (fetch,
    /// decode, no face) leaves the registry untouched.
    pub fn register_url(&mut self, url: &str) -> Result<String, RegistryError> {
        let label = fetch::label_from_url(url)?;
        let frame = self.source.fetch(url)?.into_rgb();

        let detections = self.analyzer.detect(&frame)?;
        let best = detections
            .iter()
            .max_by(|a, b| {
                a.confidence
                    .partial_cmp(&b.confidence)
                    .unwrap_or(Ordering::Equal)
            })
            .ok_or_else(|| RegistryError::NoFaceFound {
                url: url.to_string(),
            })?;

        let embedding = self.analyzer.encode(&frame, best)?;

        tracing::info!(
            label = %label,
            faces = detections.len(),
            confidence = best.confidence,
            "registered known face"
        );

        self.known.push(KnownFace {
            label: label.clone(),
            embedding,
        });
        Ok(label)
    }

    /// Locate faces in a frame and identify each against the registry.
    ///
    /// The frame is downscaled by the resize factor and converted to
    /// RGB before detection; returned boxes are mapped back to
    /// original-frame coordinates. Faces whose nearest registered
    /// embedding is farther than the match threshold — and every face
    /// when the registry is empty — are labeled [`UNKNOWN_LABEL`].
    pub fn identify(&mut self, frame: &Frame) -> Result<Vec<IdentifiedFace>, RegistryError> {
        let small = frame.downscale(self.resize_factor).into_rgb();

        let detections = self.analyzer.detect(&small)?;
        if detections.is_empty() {
            return Ok(Vec::new());
        }

        // An empty registry is not an error: every face is Unknown and
        // no embedding or distance work runs.
        if self.known.is_empty() {
            tracing::warn!(
                faces = detections.len(),
                "identify called with an empty registry"
            );
            return Ok(detections
                .iter()
                .map(|det| IdentifiedFace {
                    location: FaceLocation::from_detection(det).upscale(self.resize_factor),
                    label: UNKNOWN_LABEL.to_string(),
                })
                .collect());
        }

        let mut identified = Vec::with_capacity(detections.len());
        for det in &detections {
            let embedding = self.analyzer.encode(&small, det)?;
            let result = self
                .matcher
                .compare(&embedding, &self.known, self.match_threshold);

            let label = if result.matched {
                result.label.unwrap_or_else(|| UNKNOWN_LABEL.to_string())
            } else {
                UNKNOWN_LABEL.to_string()
            };

            identified.push(IdentifiedFace {
                location: FaceLocation::from_detection(det).upscale(self.resize_factor),
                label,
            });
        }

        tracing::debug!(faces = identified.len(), "identified frame");
        Ok(identified)
    }
}
