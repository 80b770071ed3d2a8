//! Recorded landmark data.
//!
//! A recording is a JSON-lines file with one frame per line:
//!
//! ```json
//! {"width": 640, "height": 480, "hands": [{"landmarks": [[0.5, 0.9, 0.0], ...], "handedness": "left", "score": 0.97}]}
//! ```
//!
//! `handedness` and `score` may be omitted. Blank lines are ignored.
//!
//! A [`Recording`] is split into a [`ReplayCamera`] and a [`ReplayDetector`] so that it can stand
//! in for a live camera and landmark network.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    sync::Arc,
};

use serde::Deserialize;

use crate::{
    hand::{Hand, Handedness},
    landmark::{Landmarks, Position},
    resolution::Resolution,
    source::{
        AcquisitionError, ConfigError, DetectionError, Frame, FrameSource, LandmarkSource,
        SourceOptions,
    },
};

#[derive(Debug, Clone, Deserialize)]
struct RecordedFrame {
    width: u32,
    height: u32,
    #[serde(default)]
    hands: Vec<RecordedHand>,
}

#[derive(Debug, Clone, Deserialize)]
struct RecordedHand {
    landmarks: Vec<Position>,
    #[serde(default)]
    handedness: Option<Handedness>,
    #[serde(default)]
    score: Option<f32>,
}

/// A parsed landmark recording.
#[derive(Debug, Clone)]
pub struct Recording {
    frames: Vec<RecordedFrame>,
}

impl Recording {
    /// Reads a recording from a file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, AcquisitionError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let recording = Self::from_reader(BufReader::new(file))?;
        log::debug!("loaded {} frames from {}", recording.len(), path.display());
        Ok(recording)
    }

    /// Reads a recording from a buffered reader.
    ///
    /// Decode errors report the 1-based line number they occurred on.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, AcquisitionError> {
        let mut frames = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let frame = serde_json::from_str(&line)
                .map_err(|source| AcquisitionError::Decode { line: i + 1, source })?;
            frames.push(frame);
        }
        Ok(Self { frames })
    }

    /// Returns the number of frames in the recording.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Splits the recording into a frame source and a landmark source configured by `options`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `options` do not pass [`SourceOptions::validate`].
    pub fn into_parts(
        self,
        options: SourceOptions,
    ) -> Result<(ReplayCamera, ReplayDetector), ConfigError> {
        options.validate()?;

        let frames: Arc<[RecordedFrame]> = self.frames.into();
        let camera = ReplayCamera {
            frames: frames.clone(),
            next: 0,
        };
        let detector = ReplayDetector {
            frames,
            options,
            tracking: false,
        };
        Ok((camera, detector))
    }
}

/// Yields the frames of a [`Recording`] in order.
pub struct ReplayCamera {
    frames: Arc<[RecordedFrame]>,
    next: usize,
}

impl FrameSource for ReplayCamera {
    fn next_frame(&mut self) -> Result<Option<Frame>, AcquisitionError> {
        let Some(rec) = self.frames.get(self.next) else {
            return Ok(None);
        };
        let frame = Frame::new(self.next as u64, Resolution::new(rec.width, rec.height));
        self.next += 1;
        Ok(Some(frame))
    }
}

/// Reports the recorded hands of a [`ReplayCamera`] frame.
///
/// While the previous frame contained hands, recorded scores are compared against the tracking
/// threshold; otherwise (or always, in static image mode) against the detection threshold. Hands
/// without a score are always accepted.
pub struct ReplayDetector {
    frames: Arc<[RecordedFrame]>,
    options: SourceOptions,
    tracking: bool,
}

impl ReplayDetector {
    pub fn options(&self) -> &SourceOptions {
        &self.options
    }

    fn threshold(&self) -> f32 {
        if self.tracking && !self.options.is_static_image_mode() {
            self.options.get_min_tracking_confidence()
        } else {
            self.options.get_min_detection_confidence()
        }
    }
}

impl LandmarkSource for ReplayDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Hand>, DetectionError> {
        let rec = usize::try_from(frame.index())
            .ok()
            .and_then(|i| self.frames.get(i))
            .ok_or(DetectionError::MissingFrame(frame.index()))?;

        let threshold = self.threshold();
        let hands = rec
            .hands
            .iter()
            .filter(|hand| match hand.score {
                Some(score) if score < threshold => {
                    log::trace!(
                        "frame {}: dropping hand with score {score} < {threshold}",
                        frame.index()
                    );
                    false
                }
                _ => true,
            })
            .take(self.options.get_max_num_hands())
            .enumerate()
            .map(|(slot, rec)| {
                let mut hand = Hand::new(slot, Landmarks::from_positions(rec.landmarks.clone()));
                if let Some(handedness) = rec.handedness {
                    hand = hand.with_handedness(handedness);
                }
                if self.options.is_mirrored() {
                    hand.flip_horizontal_in_place();
                }
                hand
            })
            .collect::<Vec<_>>();

        self.tracking = !hands.is_empty();
        Ok(hands)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn hand_json(x: f32, handedness: &str, score: f32) -> String {
        let lms = (0..Hand::NUM_LANDMARKS)
            .map(|_| format!("[{x},0.5,0.0]"))
            .collect::<Vec<_>>()
            .join(",");
        format!(r#"{{"landmarks":[{lms}],"handedness":"{handedness}","score":{score}}}"#)
    }

    fn recording(lines: &[String]) -> Recording {
        Recording::from_reader(Cursor::new(lines.join("\n"))).unwrap()
    }

    #[test]
    fn test_parse() {
        let text = format!(
            "{{\"width\":640,\"height\":480,\"hands\":[{}]}}\n\n{{\"width\":640,\"height\":480}}\n",
            hand_json(0.25, "left", 0.9)
        );
        let rec = Recording::from_reader(Cursor::new(text)).unwrap();
        assert_eq!(rec.len(), 2);
        assert_eq!(rec.frames[0].hands.len(), 1);
        assert_eq!(rec.frames[0].hands[0].handedness, Some(Handedness::Left));
        assert!(rec.frames[1].hands.is_empty());
    }

    #[test]
    fn test_decode_error_reports_line() {
        let text = "{\"width\":640,\"height\":480,\"hands\":[]}\n\n{\"width\":\"wide\"}\n";
        match Recording::from_reader(Cursor::new(text)).unwrap_err() {
            AcquisitionError::Decode { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_camera() {
        let rec = recording(&[
            r#"{"width":640,"height":480,"hands":[]}"#.into(),
            r#"{"width":320,"height":240,"hands":[]}"#.into(),
        ]);
        let (mut camera, _) = rec.into_parts(SourceOptions::default()).unwrap();
        assert_eq!(
            camera.next_frame().unwrap(),
            Some(Frame::new(0, Resolution::VGA))
        );
        assert_eq!(
            camera.next_frame().unwrap(),
            Some(Frame::new(1, Resolution::new(320, 240)))
        );
        assert_eq!(camera.next_frame().unwrap(), None);
        assert_eq!(camera.next_frame().unwrap(), None);
    }

    #[test]
    fn test_detector_filters_and_assigns_slots() {
        let line = format!(
            r#"{{"width":640,"height":480,"hands":[{},{},{},{}]}}"#,
            hand_json(0.1, "left", 0.5),
            hand_json(0.2, "right", 0.9),
            hand_json(0.3, "left", 0.95),
            hand_json(0.4, "right", 0.99),
        );
        let (_, mut detector) = recording(&[line])
            .into_parts(SourceOptions::default().mirror(false))
            .unwrap();
        let hands = detector.detect(&Frame::new(0, Resolution::VGA)).unwrap();

        // low-score hand dropped, then capped at 2
        assert_eq!(hands.len(), 2);
        assert_eq!(hands[0].slot(), 0);
        assert_eq!(hands[0].landmarks()[0][0], 0.2);
        assert_eq!(hands[1].slot(), 1);
        assert_eq!(hands[1].landmarks()[0][0], 0.3);
    }

    #[test]
    fn test_detector_mirrors() {
        let line = format!(
            r#"{{"width":640,"height":480,"hands":[{}]}}"#,
            hand_json(0.25, "left", 0.9)
        );
        let (_, mut detector) = recording(&[line])
            .into_parts(SourceOptions::default())
            .unwrap();
        let hands = detector.detect(&Frame::new(0, Resolution::VGA)).unwrap();
        assert_eq!(hands[0].landmarks()[3], [0.75, 0.5, 0.0]);
        assert_eq!(hands[0].handedness(), Some(Handedness::Right));
    }

    #[test]
    fn test_tracking_threshold() {
        let line = |score| {
            format!(
                r#"{{"width":640,"height":480,"hands":[{}]}}"#,
                hand_json(0.5, "left", score)
            )
        };
        let rec = recording(&[line(0.8), line(0.6), line(0.6), line(0.6)]);
        let opts = SourceOptions::default()
            .min_detection_confidence(0.7)
            .min_tracking_confidence(0.5);
        let (_, mut detector) = rec.clone().into_parts(opts.clone()).unwrap();
        let counts = (0..4)
            .map(|i| {
                detector
                    .detect(&Frame::new(i, Resolution::VGA))
                    .unwrap()
                    .len()
            })
            .collect::<Vec<_>>();
        assert_eq!(counts, [1, 1, 1, 1]);

        let (_, mut detector) = rec.into_parts(opts.static_image_mode(true)).unwrap();
        let counts = (0..4)
            .map(|i| {
                detector
                    .detect(&Frame::new(i, Resolution::VGA))
                    .unwrap()
                    .len()
            })
            .collect::<Vec<_>>();
        assert_eq!(counts, [1, 0, 0, 0]);
    }

    #[test]
    fn test_missing_frame() {
        let (_, mut detector) = Recording { frames: Vec::new() }
            .into_parts(SourceOptions::default())
            .unwrap();
        let err = detector
            .detect(&Frame::new(7, Resolution::VGA))
            .unwrap_err();
        assert!(matches!(err, DetectionError::MissingFrame(7)));
    }

    #[test]
    fn test_invalid_options() {
        let rec = Recording { frames: Vec::new() };
        assert_eq!(
            rec.clone()
                .into_parts(SourceOptions::default().max_num_hands(0))
                .err(),
            Some(ConfigError::NoHands)
        );
        assert!(matches!(
            rec.into_parts(SourceOptions::default().min_detection_confidence(-0.1)),
            Err(ConfigError::ConfidenceOutOfRange {
                name: "min_detection_confidence",
                ..
            })
        ));
    }
}
