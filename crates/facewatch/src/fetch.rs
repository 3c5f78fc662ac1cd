//! Reference image retrieval: HTTP fetch, decode, label derivation.

use std::time::Duration;

use facewatch_core::frame::FrameError;
use facewatch_core::Frame;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("{url} is not a valid image: {source}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },
    #[error("decoded frame is malformed: {0}")]
    Frame(#[from] FrameError),
    #[error("cannot derive a label from {0}")]
    BadUrl(String),
}

/// Retrieval of reference images by locator, injectable so the
/// registry can be exercised without a network.
pub trait ImageSource {
    /// Fetch and decode the image at `url` into an RGB frame.
    fn fetch(&self, url: &str) -> Result<Frame, FetchError>;
}

/// Blocking HTTP image source. Fetch errors, non-success statuses and
/// decode errors surface as distinct [`FetchError`] variants.
pub struct HttpImageSource {
    client: reqwest::blocking::Client,
}

impl HttpImageSource {
    /// Build a source whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl ImageSource for HttpImageSource {
    fn fetch(&self, url: &str) -> Result<Frame, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let bytes = response.bytes().map_err(|e| FetchError::Request {
            url: url.to_string(),
            source: e,
        })?;

        tracing::debug!(url, bytes = bytes.len(), "fetched reference image");

        let img = image::load_from_memory(&bytes).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            source: e,
        })?;

        Ok(frame_from_image(img)?)
    }
}

/// Convert a decoded image into an RGB frame.
pub fn frame_from_image(img: image::DynamicImage) -> Result<Frame, FrameError> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    Frame::from_rgb(rgb.into_raw(), width, height)
}

/// Derive a registry label from the trailing path segment of a URL.
///
/// Query string and fragment are ignored; a URL with no usable trailing
/// segment (e.g. ending in `/`) is rejected rather than producing an
/// empty label.
pub fn label_from_url(url: &str) -> Result<String, FetchError> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or("");
    if segment.is_empty() || segment.ends_with(':') {
        return Err(FetchError::BadUrl(url.to_string()));
    }
    Ok(segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_plain_url() {
        assert_eq!(
            label_from_url("https://cdn.example.com/patients/jane_doe.png").unwrap(),
            "jane_doe.png"
        );
    }

    #[test]
    fn test_label_strips_query() {
        assert_eq!(
            label_from_url("https://cdn.example.com/p/jane.png?v=3&w=640").unwrap(),
            "jane.png"
        );
    }

    #[test]
    fn test_label_strips_fragment() {
        assert_eq!(
            label_from_url("https://cdn.example.com/p/jane.png#crop").unwrap(),
            "jane.png"
        );
    }

    #[test]
    fn test_label_trailing_slash_rejected() {
        assert!(matches!(
            label_from_url("https://cdn.example.com/patients/"),
            Err(FetchError::BadUrl(_))
        ));
    }

    #[test]
    fn test_label_scheme_only_rejected() {
        assert!(label_from_url("https://").is_err());
    }

    #[test]
    fn test_fetch_invalid_url_is_request_error() {
        let source = HttpImageSource::new(Duration::from_secs(2)).unwrap();
        let result = source.fetch("http://invalid.nonexistent.example.com/face.png");
        assert!(matches!(result, Err(FetchError::Request { .. })));
    }

    #[test]
    fn test_frame_from_image_dimensions() {
        let img = image::DynamicImage::new_rgb8(6, 4);
        let frame = frame_from_image(img).unwrap();
        assert_eq!((frame.width, frame.height), (6, 4));
        assert_eq!(frame.data.len(), 6 * 4 * 3);
        assert_eq!(frame.order, facewatch_core::ChannelOrder::Rgb);
    }

    #[test]
    fn test_frame_from_image_converts_luma() {
        // Non-RGB decode output is expanded to 3 channels.
        let img = image::DynamicImage::new_luma8(2, 2);
        let frame = frame_from_image(img).unwrap();
        assert_eq!(frame.data.len(), 2 * 2 * 3);
    }
}
