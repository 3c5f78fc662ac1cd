//! facewatch-core — face detection and embedding primitives.
//!
//! Uses SCRFD for face detection and ArcFace for face embeddings, both
//! running via ONNX Runtime for CPU inference. Frames are interleaved
//! 8-bit color buffers with an explicit channel order; both models
//! expect RGB input.

pub mod alignment;
pub mod detector;
pub mod frame;
pub mod recognizer;
pub mod types;

pub use frame::{ChannelOrder, Frame};
pub use types::{Detection, Embedding, EuclideanMatcher, FaceLocation, KnownFace, MatchResult, Matcher};
