//! SCRFD face detector via ONNX Runtime.
//!
//! Runs the SCRFD detection model (3-stride anchor-free decoding, NMS
//! post-processing) over interleaved RGB frames, returning boxes and
//! five-point landmarks in the coordinate space of the input frame.

use crate::frame::{resize_bilinear, ChannelOrder, Frame};
use crate::types::Detection;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

const SCRFD_INPUT_SIZE: usize = 640;
const SCRFD_MEAN: f32 = 127.5;
const SCRFD_STD: f32 = 128.0;
const SCRFD_CONFIDENCE_THRESHOLD: f32 = 0.5;
const SCRFD_NMS_THRESHOLD: f32 = 0.4;
const SCRFD_STRIDES: [usize; 3] = [8, 16, 32];
const SCRFD_ANCHORS_PER_CELL: usize = 2;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("detector requires RGB frames, got {0:?}")]
    WrongChannelOrder(ChannelOrder),
    #[error("malformed frame: expected {expected} bytes, got {actual}")]
    MalformedFrame { expected: usize, actual: usize },
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Metadata for coordinate de-mapping after letterbox resize.
struct LetterboxInfo {
    scale: f32,
    pad_x: f32,
    pad_y: f32,
}

/// Output tensor indices for one stride: (score_idx, bbox_idx, kps_idx).
type StrideOutputIndices = (usize, usize, usize);

/// SCRFD-based face detector.
pub struct FaceDetector {
    session: Session,
    input_height: usize,
    input_width: usize,
    /// Per-stride output indices [(score, bbox, kps)] for strides [8, 16, 32].
    /// Discovered by name at load time; falls back to positional ordering.
    stride_indices: [StrideOutputIndices; 3],
}

impl FaceDetector {
    /// Load the SCRFD ONNX model from the given path.
    pub fn load(model_path: &str) -> Result<Self, DetectorError> {
        if !Path::new(model_path).exists() {
            return Err(DetectorError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        let output_names: Vec<String> =
            session.outputs().iter().map(|o| o.name().to_string()).collect();
        let num_outputs = output_names.len();

        tracing::info!(
            path = model_path,
            inputs = ?session.inputs().iter().map(|i| (i.name(), i.dtype())).collect::<Vec<_>>(),
            outputs = ?output_names,
            "loaded SCRFD model"
        );

        if num_outputs < 9 {
            return Err(DetectorError::InferenceFailed(format!(
                "SCRFD model requires 9 outputs (3 strides × score/bbox/kps), got {num_outputs}"
            )));
        }

        let stride_indices = discover_output_indices(&output_names);
        tracing::debug!(?stride_indices, "SCRFD output tensor mapping");

        Ok(Self {
            session,
            input_height: SCRFD_INPUT_SIZE,
            input_width: SCRFD_INPUT_SIZE,
            stride_indices,
        })
    }

    /// Detect faces in an RGB frame, sorted by descending confidence.
    ///
    /// Coordinates are in the space of `frame` — callers that downscale
    /// before detecting rescale the results themselves.
    pub fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, DetectorError> {
        if frame.order != ChannelOrder::Rgb {
            return Err(DetectorError::WrongChannelOrder(frame.order));
        }
        let expected = frame.expected_len();
        if frame.data.len() != expected {
            return Err(DetectorError::MalformedFrame {
                expected,
                actual: frame.data.len(),
            });
        }

        let (input, letterbox) = self.preprocess(frame);

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let mut all_detections = Vec::new();

        for (stride_pos, &stride) in SCRFD_STRIDES.iter().enumerate() {
            let (score_idx, bbox_idx, kps_idx) = self.stride_indices[stride_pos];

            let (_, scores) = outputs[score_idx]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectorError::InferenceFailed(format!("scores stride {stride}: {e}")))?;
            let (_, bboxes) = outputs[bbox_idx]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectorError::InferenceFailed(format!("bboxes stride {stride}: {e}")))?;
            let (_, kps) = outputs[kps_idx]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectorError::InferenceFailed(format!("kps stride {stride}: {e}")))?;

            all_detections.extend(decode_stride(
                scores,
                bboxes,
                kps,
                stride,
                self.input_width,
                &letterbox,
                SCRFD_CONFIDENCE_THRESHOLD,
            ));
        }

        let mut result = nms(all_detections, SCRFD_NMS_THRESHOLD);
        result.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(result)
    }

    /// Preprocess an RGB frame into a NCHW float tensor with letterbox
    /// padding (fit within the model input, pad symmetrically).
    fn preprocess(&self, frame: &Frame) -> (Array4<f32>, LetterboxInfo) {
        let width = frame.width as usize;
        let height = frame.height as usize;

        let scale_w = self.input_width as f32 / width as f32;
        let scale_h = self.input_height as f32 / height as f32;
        let scale = scale_w.min(scale_h);

        let new_w = ((width as f32 * scale).round() as usize).max(1);
        let new_h = ((height as f32 * scale).round() as usize).max(1);
        let pad_x = (self.input_width - new_w) as f32 / 2.0;
        let pad_y = (self.input_height - new_h) as f32 / 2.0;

        let letterbox = LetterboxInfo { scale, pad_x, pad_y };

        let resized = resize_bilinear(&frame.data, width, height, new_w, new_h);

        let pad_x_start = pad_x.floor() as usize;
        let pad_y_start = pad_y.floor() as usize;

        let mut tensor = Array4::<f32>::zeros((1, 3, self.input_height, self.input_width));

        for y in 0..self.input_height {
            for x in 0..self.input_width {
                let inside = y >= pad_y_start
                    && y < pad_y_start + new_h
                    && x >= pad_x_start
                    && x < pad_x_start + new_w;
                for c in 0..3 {
                    let pixel = if inside {
                        resized[((y - pad_y_start) * new_w + (x - pad_x_start)) * 3 + c] as f32
                    } else {
                        SCRFD_MEAN // pad value normalizes to 0.0
                    };
                    tensor[[0, c, y, x]] = (pixel - SCRFD_MEAN) / SCRFD_STD;
                }
            }
        }

        (tensor, letterbox)
    }
}

/// Discover output tensor ordering by name.
///
/// SCRFD exports either name tensors per stride ("score_8", "bbox_16",
/// "kps_32", ...) or use generic numeric names. When the named pattern
/// is present it is mapped to stride slots; otherwise the standard
/// positional ordering is assumed:
///   [0-2] = scores (strides 8, 16, 32)
///   [3-5] = bboxes (strides 8, 16, 32)
///   [6-8] = kps    (strides 8, 16, 32)
fn discover_output_indices(names: &[String]) -> [StrideOutputIndices; 3] {
    let find = |prefix: &str, stride: usize| -> Option<usize> {
        let target = format!("{prefix}_{stride}");
        names.iter().position(|n| n == &target)
    };

    let named = SCRFD_STRIDES.iter().all(|&stride| {
        find("score", stride).is_some()
            && find("bbox", stride).is_some()
            && find("kps", stride).is_some()
    });

    if named {
        tracing::info!("SCRFD: using name-based output tensor mapping");
        std::array::from_fn(|i| {
            let stride = SCRFD_STRIDES[i];
            (
                find("score", stride).unwrap(),
                find("bbox", stride).unwrap(),
                find("kps", stride).unwrap(),
            )
        })
    } else {
        tracing::info!(
            ?names,
            "SCRFD: output names not recognized, using positional mapping [0-2]=scores, [3-5]=bboxes, [6-8]=kps"
        );
        [(0, 3, 6), (1, 4, 7), (2, 5, 8)]
    }
}

/// Decode detections for a single stride level, de-mapping from the
/// letterboxed input back to source-frame coordinates.
fn decode_stride(
    scores: &[f32],
    bboxes: &[f32],
    kps: &[f32],
    stride: usize,
    input_size: usize,
    letterbox: &LetterboxInfo,
    threshold: f32,
) -> Vec<Detection> {
    let grid_w = input_size / stride;
    let grid_h = input_size / stride;
    let num_anchors = grid_h * grid_w * SCRFD_ANCHORS_PER_CELL;

    let demap = |v: f32, pad: f32| (v - pad) / letterbox.scale;

    let mut detections = Vec::new();

    for idx in 0..num_anchors {
        let score = scores.get(idx).copied().unwrap_or(0.0);
        if score <= threshold {
            continue;
        }

        let bbox_off = idx * 4;
        let kps_off = idx * 10;
        // Skip anchors whose bbox/kps slots fall outside the tensors.
        if bbox_off + 3 >= bboxes.len() || kps_off + 9 >= kps.len() {
            continue;
        }

        let anchor_idx = idx / SCRFD_ANCHORS_PER_CELL;
        let ax = (anchor_idx % grid_w) as f32 * stride as f32;
        let ay = (anchor_idx / grid_w) as f32 * stride as f32;

        // Box offsets are [left, top, right, bottom] distances from the
        // anchor center, in stride units.
        let x1 = demap(ax - bboxes[bbox_off] * stride as f32, letterbox.pad_x);
        let y1 = demap(ay - bboxes[bbox_off + 1] * stride as f32, letterbox.pad_y);
        let x2 = demap(ax + bboxes[bbox_off + 2] * stride as f32, letterbox.pad_x);
        let y2 = demap(ay + bboxes[bbox_off + 3] * stride as f32, letterbox.pad_y);

        let mut landmarks = [(0.0f32, 0.0f32); 5];
        for (i, lm) in landmarks.iter_mut().enumerate() {
            *lm = (
                demap(ax + kps[kps_off + i * 2] * stride as f32, letterbox.pad_x),
                demap(ay + kps[kps_off + i * 2 + 1] * stride as f32, letterbox.pad_y),
            );
        }

        detections.push(Detection {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
            confidence: score,
            landmarks,
        });
    }

    detections
}

/// Non-Maximum Suppression: drop detections overlapping a
/// higher-confidence one beyond `iou_threshold`.
fn nms(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; detections.len()];

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(detections[i].clone());

        for j in (i + 1)..detections.len() {
            if !suppressed[j] && iou(&detections[i], &detections[j]) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    keep
}

/// Intersection-over-Union of two detection boxes.
fn iou(a: &Detection, b: &Detection) -> f32 {
    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = (a.x + a.width).min(b.x + b.width);
    let y2 = (a.y + a.height).min(b.y + b.height);

    let inter_area = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union_area = a.width * a.height + b.width * b.height - inter_area;

    if union_area > 0.0 {
        inter_area / union_area
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_det(x: f32, y: f32, w: f32, h: f32, conf: f32) -> Detection {
        Detection {
            x,
            y,
            width: w,
            height: h,
            confidence: conf,
            landmarks: [(0.0, 0.0); 5],
        }
    }

    #[test]
    fn test_iou_identical() {
        let a = make_det(0.0, 0.0, 100.0, 100.0, 1.0);
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_no_overlap() {
        let a = make_det(0.0, 0.0, 10.0, 10.0, 1.0);
        let b = make_det(20.0, 20.0, 10.0, 10.0, 1.0);
        assert!(iou(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_iou_partial() {
        let a = make_det(0.0, 0.0, 10.0, 10.0, 1.0);
        let b = make_det(5.0, 0.0, 10.0, 10.0, 1.0);
        // Overlap: 5x10 = 50, union: 100+100-50 = 150
        let expected = 50.0 / 150.0;
        assert!((iou(&a, &b) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_nms_suppresses_overlapping() {
        let detections = vec![
            make_det(0.0, 0.0, 100.0, 100.0, 0.9),
            make_det(5.0, 5.0, 100.0, 100.0, 0.8),
            make_det(200.0, 200.0, 50.0, 50.0, 0.7),
        ];
        let result = nms(detections, 0.4);
        assert_eq!(result.len(), 2);
        assert!((result[0].confidence - 0.9).abs() < 1e-6);
        assert!((result[1].confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_nms_no_suppression() {
        let detections = vec![
            make_det(0.0, 0.0, 10.0, 10.0, 0.9),
            make_det(50.0, 50.0, 10.0, 10.0, 0.8),
        ];
        let result = nms(detections, 0.4);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_nms_empty() {
        assert!(nms(vec![], 0.4).is_empty());
    }

    #[test]
    fn test_letterbox_coordinate_roundtrip() {
        let width = 320.0f32;
        let height = 240.0f32;
        let scale = (640.0 / width).min(640.0 / height);
        let new_w = (width * scale).round();
        let new_h = (height * scale).round();
        let letterbox = LetterboxInfo {
            scale,
            pad_x: (640.0 - new_w) / 2.0,
            pad_y: (640.0 - new_h) / 2.0,
        };

        let orig_x = 100.0f32;
        let orig_y = 50.0f32;
        let boxed_x = orig_x * scale + letterbox.pad_x;
        let boxed_y = orig_y * scale + letterbox.pad_y;

        let recovered_x = (boxed_x - letterbox.pad_x) / letterbox.scale;
        let recovered_y = (boxed_y - letterbox.pad_y) / letterbox.scale;

        assert!((recovered_x - orig_x).abs() < 0.1, "x: {recovered_x} vs {orig_x}");
        assert!((recovered_y - orig_y).abs() < 0.1, "y: {recovered_y} vs {orig_y}");
    }

    #[test]
    fn test_discover_output_indices_named() {
        let names: Vec<String> = [
            "score_8", "score_16", "score_32",
            "bbox_8", "bbox_16", "bbox_32",
            "kps_8", "kps_16", "kps_32",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let indices = discover_output_indices(&names);

        assert_eq!(indices[0], (0, 3, 6));
        assert_eq!(indices[1], (1, 4, 7));
        assert_eq!(indices[2], (2, 5, 8));
    }

    #[test]
    fn test_discover_output_indices_shuffled_named() {
        // Named but in non-standard order
        let names: Vec<String> = [
            "bbox_8", "kps_8", "score_8",
            "bbox_16", "kps_16", "score_16",
            "bbox_32", "kps_32", "score_32",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let indices = discover_output_indices(&names);

        assert_eq!(indices[0], (2, 0, 1));
        assert_eq!(indices[1], (5, 3, 4));
        assert_eq!(indices[2], (8, 6, 7));
    }

    #[test]
    fn test_discover_output_indices_positional_fallback() {
        // Generic numeric names — fall back to positional
        let names: Vec<String> = (0..9).map(|i: usize| i.to_string()).collect();
        let indices = discover_output_indices(&names);
        assert_eq!(indices, [(0, 3, 6), (1, 4, 7), (2, 5, 8)]);
    }

    #[test]
    fn test_decode_stride_skips_truncated_outputs() {
        // One anchor above threshold but bbox/kps tensors empty: no
        // detection, no panic.
        let scores = vec![0.9f32];
        let letterbox = LetterboxInfo {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
        };
        let dets = decode_stride(&scores, &[], &[], 32, 640, &letterbox, 0.5);
        assert!(dets.is_empty());
    }

    #[test]
    fn test_decode_stride_demaps_letterbox() {
        // Single anchor at the grid origin, stride 32, unit offsets.
        let scores = vec![0.9f32];
        let bboxes = vec![1.0f32, 1.0, 1.0, 1.0];
        let kps = vec![0.0f32; 10];
        let letterbox = LetterboxInfo {
            scale: 2.0,
            pad_x: 10.0,
            pad_y: 20.0,
        };

        let dets = decode_stride(&scores, &bboxes, &kps, 32, 640, &letterbox, 0.5);
        assert_eq!(dets.len(), 1);
        let d = &dets[0];
        // x1 = (0 - 32 - 10) / 2 = -21, x2 = (0 + 32 - 10) / 2 = 11
        assert!((d.x - -21.0).abs() < 1e-4);
        assert!((d.width - 32.0).abs() < 1e-4);
        // y1 = (0 - 32 - 20) / 2 = -26
        assert!((d.y - -26.0).abs() < 1e-4);
        // nose landmark decodes to the demapped anchor center
        assert!((d.landmarks[2].0 - -5.0).abs() < 1e-4);
        assert!((d.landmarks[2].1 - -10.0).abs() < 1e-4);
    }
}
