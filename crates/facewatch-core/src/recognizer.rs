//! ArcFace face embedder via ONNX Runtime.
//!
//! Extracts 512-dimensional embeddings from aligned RGB face crops.

use crate::alignment;
use crate::frame::{ChannelOrder, Frame};
use crate::types::{Detection, Embedding};
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

const ARCFACE_INPUT_SIZE: usize = 112;
const ARCFACE_MEAN: f32 = 127.5;
const ARCFACE_STD: f32 = 127.5; // NOT 128.0 — ArcFace uses symmetric normalization
const ARCFACE_EMBEDDING_DIM: usize = 512;

#[derive(Error, Debug)]
pub enum RecognizerError {
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("embedder requires RGB frames, got {0:?}")]
    WrongChannelOrder(ChannelOrder),
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// ArcFace-based face embedder.
pub struct FaceRecognizer {
    session: Session,
}

impl FaceRecognizer {
    /// Load the ArcFace ONNX model from the given path.
    pub fn load(model_path: &str) -> Result<Self, RecognizerError> {
        if !Path::new(model_path).exists() {
            return Err(RecognizerError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        tracing::info!(
            path = model_path,
            inputs = ?session.inputs().iter().map(|i| (i.name(), i.dtype())).collect::<Vec<_>>(),
            outputs = ?session.outputs().iter().map(|o| o.name()).collect::<Vec<_>>(),
            "loaded ArcFace model"
        );

        Ok(Self { session })
    }

    /// Extract an L2-normalized embedding for one detected face.
    ///
    /// The face is warped to the canonical 112×112 position using its
    /// landmarks before extraction. `frame` must be the same frame the
    /// detection came from.
    pub fn extract(
        &mut self,
        frame: &Frame,
        face: &Detection,
    ) -> Result<Embedding, RecognizerError> {
        if frame.order != ChannelOrder::Rgb {
            return Err(RecognizerError::WrongChannelOrder(frame.order));
        }

        let aligned = alignment::align_face(frame, &face.landmarks);
        let input = Self::preprocess(&aligned);

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (_, raw_data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| RecognizerError::InferenceFailed(format!("embedding extraction: {e}")))?;

        let raw: Vec<f32> = raw_data.to_vec();

        if raw.len() != ARCFACE_EMBEDDING_DIM {
            return Err(RecognizerError::InferenceFailed(format!(
                "expected {ARCFACE_EMBEDDING_DIM}-dim embedding, got {}",
                raw.len()
            )));
        }

        // L2-normalize the embedding
        let norm: f32 = raw.iter().map(|x| x * x).sum::<f32>().sqrt();
        let values = if norm > 0.0 {
            raw.iter().map(|x| x / norm).collect()
        } else {
            raw
        };

        Ok(Embedding { values })
    }

    /// Preprocess a 112×112 interleaved RGB crop into a NCHW float tensor.
    fn preprocess(aligned: &[u8]) -> Array4<f32> {
        let size = ARCFACE_INPUT_SIZE;
        let mut tensor = Array4::<f32>::zeros((1, 3, size, size));

        for y in 0..size {
            for x in 0..size {
                for c in 0..3 {
                    let pixel = aligned
                        .get((y * size + x) * 3 + c)
                        .copied()
                        .unwrap_or(0) as f32;
                    tensor[[0, c, y, x]] = (pixel - ARCFACE_MEAN) / ARCFACE_STD;
                }
            }
        }

        tensor
    }
}
