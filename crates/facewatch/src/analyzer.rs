//! The face-analysis capability: detection plus embedding extraction.

use facewatch_core::detector::{DetectorError, FaceDetector};
use facewatch_core::recognizer::{FaceRecognizer, RecognizerError};
use facewatch_core::{Detection, Embedding, Frame};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("detector error: {0}")]
    Detector(#[from] DetectorError),
    #[error("recognizer error: {0}")]
    Recognizer(#[from] RecognizerError),
}

/// Face detection and embedding extraction behind one seam, so the
/// model backend can be swapped or scripted in tests without touching
/// the registry's orchestration.
///
/// Both operations expect RGB frames; the registry converts before
/// calling.
pub trait FaceAnalyzer {
    /// Locate faces in a frame, in the frame's own coordinate space.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, AnalyzerError>;

    /// Extract the embedding for one face previously detected in `frame`.
    fn encode(&mut self, frame: &Frame, face: &Detection) -> Result<Embedding, AnalyzerError>;
}

/// Production analyzer: SCRFD detection + ArcFace embeddings via ONNX.
pub struct OnnxAnalyzer {
    detector: FaceDetector,
    recognizer: FaceRecognizer,
}

impl OnnxAnalyzer {
    /// Load both models. Fails fast if either file is missing or invalid.
    pub fn load(scrfd_path: &str, arcface_path: &str) -> Result<Self, AnalyzerError> {
        let detector = FaceDetector::load(scrfd_path)?;
        let recognizer = FaceRecognizer::load(arcface_path)?;
        Ok(Self {
            detector,
            recognizer,
        })
    }
}

impl FaceAnalyzer for OnnxAnalyzer {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, AnalyzerError> {
        Ok(self.detector.detect(frame)?)
    }

    fn encode(&mut self, frame: &Frame, face: &Detection) -> Result<Embedding, AnalyzerError> {
        Ok(self.recognizer.extract(frame, face)?)
    }
}
