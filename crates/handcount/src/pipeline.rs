//! Per-frame orchestration.
//!
//! [`FrameProcessor`] classifies every hand of a frame independently and labels it for display.
//! [`run`] drives a processor with a [`FrameSource`] and a [`LandmarkSource`] until the stream
//! ends.

use std::{fmt, ops::ControlFlow};

use crate::{
    hand::{classify_hand, ClassificationResult, Hand, Handedness, InvalidInputError},
    resolution::Resolution,
    source::{AcquisitionError, DetectionError, Frame, FrameSource, LandmarkSource},
    timer::{FpsCounter, Timer},
};

/// Display label of a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandLabel {
    Left,
    Right,
}

impl HandLabel {
    /// Labels a hand by its position in the detection list: the first hand is "left", all others
    /// are "right".
    ///
    /// This does not look at the hand at all. A single right hand is labelled "Left Hand", and two
    /// hands may swap labels between frames when the detector reorders them.
    pub fn from_slot(slot: usize) -> Self {
        if slot == 0 {
            HandLabel::Left
        } else {
            HandLabel::Right
        }
    }
}

impl From<Handedness> for HandLabel {
    fn from(handedness: Handedness) -> Self {
        match handedness {
            Handedness::Left => HandLabel::Left,
            Handedness::Right => HandLabel::Right,
        }
    }
}

impl fmt::Display for HandLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HandLabel::Left => "Left Hand",
            HandLabel::Right => "Right Hand",
        })
    }
}

/// Options for a [`FrameProcessor`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorOptions {
    use_true_handedness: bool,
    frame_skip: u32,
    upright_tolerance_degrees: f32,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            use_true_handedness: false,
            frame_skip: 2,
            upright_tolerance_degrees: 45.0,
        }
    }
}

impl ProcessorOptions {
    /// If `true`, hands are labelled with the handedness reported by the landmark source (when
    /// it reports one) instead of their slot index.
    #[inline]
    pub fn use_true_handedness(self, use_true_handedness: bool) -> Self {
        Self {
            use_true_handedness,
            ..self
        }
    }

    /// Only process every `n`-th frame, starting with frame `n` (1-based).
    ///
    /// A value of 1 (or 0) processes every frame.
    #[inline]
    pub fn frame_skip(self, n: u32) -> Self {
        Self {
            frame_skip: n.max(1),
            ..self
        }
    }

    /// Sets how far (in degrees) a hand may be rotated before a warning about unreliable
    /// classification is logged.
    #[inline]
    pub fn upright_tolerance_degrees(self, degrees: f32) -> Self {
        Self {
            upright_tolerance_degrees: degrees,
            ..self
        }
    }
}

/// Classification output for one hand.
#[derive(Debug, Clone, PartialEq)]
pub struct HandReport {
    slot: usize,
    label: HandLabel,
    result: ClassificationResult,
    rotation_radians: f32,
    palm_center: [f32; 3],
}

impl HandReport {
    #[inline]
    pub fn slot(&self) -> usize {
        self.slot
    }

    #[inline]
    pub fn label(&self) -> HandLabel {
        self.label
    }

    #[inline]
    pub fn result(&self) -> &ClassificationResult {
        &self.result
    }

    /// Returns the clockwise palm rotation, see [`Hand::rotation_radians`].
    #[inline]
    pub fn rotation_radians(&self) -> f32 {
        self.rotation_radians
    }

    /// Returns the normalized palm center, see [`Hand::palm_center`].
    #[inline]
    pub fn palm_center(&self) -> [f32; 3] {
        self.palm_center
    }

    /// Returns the text shown next to the hand, eg. `Left Hand: 3 fingers`.
    pub fn overlay_text(&self) -> String {
        format!("{}: {} fingers", self.label, self.result.count())
    }
}

/// Classification output for all hands of a frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    hands: Vec<HandReport>,
    rejected: Vec<InvalidInputError>,
}

impl FrameReport {
    /// Returns the reports of all successfully classified hands, in detection order.
    pub fn hands(&self) -> &[HandReport] {
        &self.hands
    }

    /// Returns the errors of hands that could not be classified.
    pub fn rejected(&self) -> &[InvalidInputError] {
        &self.rejected
    }

    /// Returns `true` if the frame contained no hands at all.
    pub fn is_empty(&self) -> bool {
        self.hands.is_empty() && self.rejected.is_empty()
    }
}

/// Classifies the hands of a stream of frames.
///
/// Apart from profiling data and the frame skip counter, no state is kept between frames.
pub struct FrameProcessor {
    options: ProcessorOptions,
    frames_seen: u64,
    t_classify: Timer,
}

impl FrameProcessor {
    pub fn new(options: ProcessorOptions) -> Self {
        Self {
            options,
            frames_seen: 0,
            t_classify: Timer::new("classify"),
        }
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    /// Counts an incoming frame and returns whether it should be processed.
    pub fn throttle(&mut self) -> bool {
        self.frames_seen += 1;
        self.frames_seen % u64::from(self.options.frame_skip) == 0
    }

    /// Classifies each hand in `hands`, detected in a frame of resolution `res`.
    ///
    /// Hands are independent of each other: a malformed hand ends up in
    /// [`FrameReport::rejected`] and does not affect the others.
    pub fn process(&mut self, hands: &[Hand], res: Resolution) -> FrameReport {
        let mut report = FrameReport::default();
        for hand in hands {
            match self.t_classify.time(|| classify_hand(hand, res)) {
                Ok(result) => report.hands.push(self.report(hand, result)),
                Err(e) => {
                    log::warn!("skipping hand: {}", e);
                    report.rejected.push(e);
                }
            }
        }
        report
    }

    fn report(&self, hand: &Hand, result: ClassificationResult) -> HandReport {
        let label = match hand.handedness() {
            Some(handedness) if self.options.use_true_handedness => handedness.into(),
            _ => HandLabel::from_slot(hand.slot()),
        };

        let rotation_radians = hand.rotation_radians();
        let palm_center = hand.palm_center();
        let degrees = rotation_radians.to_degrees();
        if degrees.abs() > self.options.upright_tolerance_degrees {
            log::debug!(
                "slot {}: hand at ({:.2}, {:.2}) is rotated by {:.0} deg, finger count is likely wrong",
                hand.slot(),
                palm_center[0],
                palm_center[1],
                degrees,
            );
        }

        HandReport {
            slot: hand.slot(),
            label,
            result,
            rotation_radians,
            palm_center,
        }
    }

    /// Returns profiling timers for hand classification.
    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        [&self.t_classify].into_iter()
    }
}

/// Error that ends a [`run`].
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("frame acquisition failed")]
    Acquisition(#[from] AcquisitionError),
    #[error("hand detection failed on frame {frame}")]
    Detection {
        frame: u64,
        #[source]
        source: DetectionError,
    },
}

/// Statistics returned by [`run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_read: u64,
    pub frames_processed: u64,
    pub hands_classified: u64,
    pub hands_rejected: u64,
}

/// Reads frames from `frames`, detects hands with `detector`, and passes the classification of
/// every processed frame to `sink`.
///
/// Frames dropped by [`FrameProcessor::throttle`] are neither detected nor passed to `sink`. The
/// loop ends when `frames` runs out or when `sink` returns [`ControlFlow::Break`].
pub fn run<F, L, S>(
    processor: &mut FrameProcessor,
    frames: &mut F,
    detector: &mut L,
    mut sink: S,
) -> Result<RunSummary, RunError>
where
    F: FrameSource + ?Sized,
    L: LandmarkSource + ?Sized,
    S: FnMut(&Frame, &FrameReport) -> ControlFlow<()>,
{
    let mut summary = RunSummary::default();
    let mut fps = FpsCounter::new("finger counter");

    while let Some(frame) = frames.next_frame()? {
        summary.frames_read += 1;
        if !processor.throttle() {
            continue;
        }

        let hands = detector
            .detect(&frame)
            .map_err(|source| RunError::Detection {
                frame: frame.index(),
                source,
            })?;
        let report = processor.process(&hands, frame.resolution());

        summary.frames_processed += 1;
        summary.hands_classified += report.hands().len() as u64;
        summary.hands_rejected += report.rejected().len() as u64;
        fps.tick_with(processor.timers());

        if sink(&frame, &report).is_break() {
            log::debug!("stopping after frame {}", frame.index());
            break;
        }
    }

    Ok(summary)
}
