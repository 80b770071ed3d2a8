//! Interfaces to the frame and landmark producers.
//!
//! Acquiring camera frames and running the hand landmark network are not done by this crate.
//! They are abstracted as a [`FrameSource`] and a [`LandmarkSource`], whose failures are reported
//! as [`AcquisitionError`]s and [`DetectionError`]s, separately from the per-hand
//! [`InvalidInputError`] of the classifier.
//!
//! [`InvalidInputError`]: crate::hand::InvalidInputError

use std::io;

use crate::{hand::Hand, resolution::Resolution};

/// A camera frame, as far as hand classification is concerned.
///
/// Pixel data stays with the [`FrameSource`] and [`LandmarkSource`]; classification only needs to
/// know the frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    index: u64,
    resolution: Resolution,
}

impl Frame {
    pub fn new(index: u64, resolution: Resolution) -> Self {
        Self { index, resolution }
    }

    /// Returns the 0-based position of this frame in its stream.
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }
}

/// A producer of camera frames.
pub trait FrameSource {
    /// Reads the next frame.
    ///
    /// Returns `Ok(None)` when the stream has ended.
    fn next_frame(&mut self) -> Result<Option<Frame>, AcquisitionError>;
}

/// A hand landmark detector.
pub trait LandmarkSource {
    /// Detects all hands in `frame`.
    ///
    /// Hands are returned in detection order, and [`Hand::slot`] must match their position in
    /// the returned list. The order carries no identity from one frame to the next. An empty list
    /// means that no hands are visible.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Hand>, DetectionError>;
}

/// Failure to obtain a frame from a [`FrameSource`].
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    #[error("failed to read frame data")]
    Io(#[from] io::Error),
    #[error("invalid frame data on line {line}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of a [`LandmarkSource`] to process a frame.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("no landmark data for frame {0}")]
    MissingFrame(u64),
    #[error("landmark detector failed: {0}")]
    Backend(String),
}

/// Invalid [`SourceOptions`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("`{name}` must be between 0.0 and 1.0, got {value}")]
    ConfidenceOutOfRange { name: &'static str, value: f32 },
    #[error("`max_num_hands` must be at least 1")]
    NoHands,
}

/// Configuration of a [`LandmarkSource`].
///
/// The defaults match what the finger counter has been tuned with: at most 2 hands, high
/// confidence thresholds, and a mirrored view.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceOptions {
    max_num_hands: usize,
    min_detection_confidence: f32,
    min_tracking_confidence: f32,
    static_image_mode: bool,
    mirror: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            max_num_hands: 2,
            min_detection_confidence: 0.85,
            min_tracking_confidence: 0.85,
            static_image_mode: false,
            mirror: true,
        }
    }
}

impl SourceOptions {
    /// Sets the maximum number of hands reported per frame.
    #[inline]
    pub fn max_num_hands(self, max_num_hands: usize) -> Self {
        Self {
            max_num_hands,
            ..self
        }
    }

    /// Sets the confidence a newly appearing hand needs to be reported.
    #[inline]
    pub fn min_detection_confidence(self, confidence: f32) -> Self {
        Self {
            min_detection_confidence: confidence,
            ..self
        }
    }

    /// Sets the confidence a hand that was already present in the previous frame needs to keep
    /// being reported.
    #[inline]
    pub fn min_tracking_confidence(self, confidence: f32) -> Self {
        Self {
            min_tracking_confidence: confidence,
            ..self
        }
    }

    /// If `true`, every frame is treated as an unrelated image and only the detection threshold
    /// applies.
    #[inline]
    pub fn static_image_mode(self, static_image_mode: bool) -> Self {
        Self {
            static_image_mode,
            ..self
        }
    }

    /// If `true`, frames are flipped horizontally before detection, so that the user sees
    /// themselves like in a mirror.
    #[inline]
    pub fn mirror(self, mirror: bool) -> Self {
        Self { mirror, ..self }
    }

    pub fn get_max_num_hands(&self) -> usize {
        self.max_num_hands
    }

    pub fn get_min_detection_confidence(&self) -> f32 {
        self.min_detection_confidence
    }

    pub fn get_min_tracking_confidence(&self) -> f32 {
        self.min_tracking_confidence
    }

    pub fn is_static_image_mode(&self) -> bool {
        self.static_image_mode
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirror
    }

    /// Checks that all options are within their allowed ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_num_hands == 0 {
            return Err(ConfigError::NoHands);
        }
        for (name, value) in [
            ("min_detection_confidence", self.min_detection_confidence),
            ("min_tracking_confidence", self.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ConfidenceOutOfRange { name, value });
            }
        }
        Ok(())
    }
}
