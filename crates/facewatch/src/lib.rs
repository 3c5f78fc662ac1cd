//! facewatch — known-face registry and frame identification.
//!
//! A thin orchestration layer for a CCTV-style pipeline: reference
//! faces are registered from images fetched over HTTP, then frames are
//! scanned and every detected face is matched against the registered
//! set. All vision work (detection, embedding extraction, distance
//! matching) lives behind injected capabilities so backends can be
//! swapped or mocked; the production backends are in
//! [`facewatch_core`].

pub mod analyzer;
pub mod config;
pub mod fetch;
pub mod models;
pub mod registry;

pub use analyzer::{AnalyzerError, FaceAnalyzer, OnnxAnalyzer};
pub use config::Config;
pub use fetch::{FetchError, HttpImageSource, ImageSource};
pub use registry::{FaceRegistry, IdentifiedFace, RegistryError, UNKNOWN_LABEL};

pub use facewatch_core::{ChannelOrder, Detection, Embedding, FaceLocation, Frame, KnownFace};
