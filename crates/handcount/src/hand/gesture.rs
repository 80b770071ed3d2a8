//! Static hand posture classification.
//!
//! Fingers are classified with two simple geometric tests on the normalized landmark
//! coordinates:
//!
//! - A non-thumb finger is extended when its tip lies *above* (smaller `y`) the finger's PIP
//!   joint, which is the landmark two positions before the tip.
//! - The thumb is extended when its tip lies to the *left* (smaller `x`) of the wrist.
//!
//! Both tests assume an upright hand, and the thumb test additionally assumes a mirrored camera
//! image showing the palm of a right hand (or the back of a left hand). Hands that are rotated
//! sideways or upside down, and the other hand in the mirrored view, will be misclassified.
//! [`Hand::rotation_radians`] can be used to detect when that is likely.

use std::{fmt, ops::Index};

use itertools::{Itertools, MinMaxResult};

use crate::{num::TotalF32, rect::Rect, resolution::Resolution};

use super::landmark::{Hand, InvalidInputError, LandmarkIdx};

/// The five fingers of a hand, in landmark order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Returns the landmark on the tip of this finger.
    pub fn tip(self) -> LandmarkIdx {
        match self {
            Finger::Thumb => LandmarkIdx::ThumbTip,
            Finger::Index => LandmarkIdx::IndexFingerTip,
            Finger::Middle => LandmarkIdx::MiddleFingerTip,
            Finger::Ring => LandmarkIdx::RingFingerTip,
            Finger::Pinky => LandmarkIdx::PinkyTip,
        }
    }

    /// Returns the landmark the tip is compared against to decide whether the finger is extended.
    ///
    /// This is the wrist for the thumb, and the PIP joint for all other fingers.
    pub fn reference(self) -> LandmarkIdx {
        match self {
            Finger::Thumb => LandmarkIdx::Wrist,
            Finger::Index => LandmarkIdx::IndexFingerPip,
            Finger::Middle => LandmarkIdx::MiddleFingerPip,
            Finger::Ring => LandmarkIdx::RingFingerPip,
            Finger::Pinky => LandmarkIdx::PinkyPip,
        }
    }

    fn is_extended(self, hand: &Hand) -> bool {
        let tip = hand.landmark(self.tip());
        let reference = hand.landmark(self.reference());
        match self {
            Finger::Thumb => tip.x() < reference.x(),
            // image Y points down, so "above" means smaller
            _ => tip.y() < reference.y(),
        }
    }
}

impl fmt::Display for Finger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Finger::Thumb => "thumb",
            Finger::Index => "index",
            Finger::Middle => "middle",
            Finger::Ring => "ring",
            Finger::Pinky => "pinky",
        })
    }
}

/// Extension state of each finger of a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct FingerStates([bool; 5]);

impl FingerStates {
    pub fn new(states: [bool; 5]) -> Self {
        Self(states)
    }

    #[inline]
    pub fn is_extended(&self, finger: Finger) -> bool {
        self.0[finger as usize]
    }

    /// Returns the number of extended fingers (0 to 5).
    #[inline]
    pub fn count(&self) -> u8 {
        self.0.iter().filter(|&&extended| extended).count() as u8
    }

    /// Returns an iterator over the extended fingers.
    pub fn extended(&self) -> impl Iterator<Item = Finger> + '_ {
        Finger::ALL
            .into_iter()
            .filter(|&finger| self.is_extended(finger))
    }

    #[inline]
    pub fn as_array(&self) -> [bool; 5] {
        self.0
    }
}

impl Index<Finger> for FingerStates {
    type Output = bool;

    #[inline]
    fn index(&self, finger: Finger) -> &bool {
        &self.0[finger as usize]
    }
}

/// Displays the extended fingers, eg. `thumb+index`, or `fist` if there are none.
impl fmt::Display for FingerStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count() == 0 {
            f.write_str("fist")
        } else {
            write!(f, "{}", self.extended().format("+"))
        }
    }
}

/// Classification of one hand in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationResult {
    finger_states: FingerStates,
    count: u8,
    bounding_box: Rect,
}

impl ClassificationResult {
    #[inline]
    pub fn finger_states(&self) -> FingerStates {
        self.finger_states
    }

    /// Returns the number of extended fingers.
    ///
    /// Always equal to `self.finger_states().count()`.
    #[inline]
    pub fn count(&self) -> u8 {
        self.count
    }

    /// Returns the bounding box of the hand, in pixel coordinates.
    ///
    /// This is *not* clipped to the frame.
    #[inline]
    pub fn bounding_box(&self) -> Rect {
        self.bounding_box
    }
}

/// Decides which fingers of `hand` are extended.
///
/// Comparisons are strict: a tip exactly level with its reference landmark counts as folded.
///
/// # Errors
///
/// Returns an [`InvalidInputError`] if `hand` does not pass [`Hand::check`].
pub fn classify(hand: &Hand) -> Result<FingerStates, InvalidInputError> {
    hand.check()?;

    let states = FingerStates(Finger::ALL.map(|finger| finger.is_extended(hand)));
    log::trace!("slot {}: {} ({})", hand.slot(), states.count(), states);
    Ok(states)
}

/// Computes the smallest pixel rectangle containing all landmarks of `hand` in a frame of
/// resolution `res`.
///
/// The extreme normalized coordinates are scaled by the frame size and rounded down. The result
/// is not clipped to the frame, so landmarks outside of the image produce a rectangle extending
/// past its edges.
///
/// # Errors
///
/// Returns an [`InvalidInputError`] if `hand` does not pass [`Hand::check`].
pub fn bounding_box(hand: &Hand, res: Resolution) -> Result<Rect, InvalidInputError> {
    hand.check()?;

    let lms = hand.landmarks();
    let (x_min, x_max) = extremes(lms.iter().map(|lm| lm.x()));
    let (y_min, y_max) = extremes(lms.iter().map(|lm| lm.y()));

    let top_left = res.to_pixel(x_min, y_min);
    let bottom_right = res.to_pixel(x_max, y_max);
    Ok(Rect::from_corners(top_left, bottom_right))
}

fn extremes(values: impl Iterator<Item = f32>) -> (f32, f32) {
    match values.map(TotalF32).minmax() {
        MinMaxResult::NoElements => unreachable!("hand has no landmarks"),
        MinMaxResult::OneElement(v) => (v.0, v.0),
        MinMaxResult::MinMax(min, max) => (min.0, max.0),
    }
}

/// Classifies `hand` and computes its bounding box in a frame of resolution `res`.
pub fn classify_hand(
    hand: &Hand,
    res: Resolution,
) -> Result<ClassificationResult, InvalidInputError> {
    let finger_states = classify(hand)?;
    let bounding_box = bounding_box(hand, res)?;
    Ok(ClassificationResult {
        finger_states,
        count: finger_states.count(),
        bounding_box,
    })
}

#[cfg(test)]
mod tests {
    use crate::landmark::{Landmark, Landmarks};

    use super::*;

    /// A closed fist: every tip below its PIP joint, thumb tip to the right of the wrist.
    fn fist() -> Landmarks {
        let mut lms = Landmarks::new(Hand::NUM_LANDMARKS);
        for i in 0..Hand::NUM_LANDMARKS {
            lms.set(i, Landmark::new([0.5, 0.5, 0.0]));
        }
        lms.set(LandmarkIdx::Wrist as usize, Landmark::new([0.5, 0.9, 0.0]));
        lms.set(LandmarkIdx::ThumbTip as usize, Landmark::new([0.6, 0.6, 0.0]));
        for finger in &Finger::ALL[1..] {
            lms.set(finger.reference() as usize, Landmark::new([0.5, 0.5, 0.0]));
            lms.set(finger.tip() as usize, Landmark::new([0.5, 0.6, 0.0]));
        }
        lms
    }

    fn raise(lms: &mut Landmarks, finger: Finger) {
        let mut tip = lms.get(finger.tip() as usize).position();
        match finger {
            Finger::Thumb => tip[0] = 0.3,
            _ => tip[1] = 0.2,
        }
        lms.set(finger.tip() as usize, Landmark::new(tip));
    }

    #[test]
    fn test_fist() {
        let states = classify(&Hand::new(0, fist())).unwrap();
        assert_eq!(states, FingerStates::default());
        assert_eq!(states.count(), 0);
        assert_eq!(states.to_string(), "fist");
    }

    #[test]
    fn test_open_hand() {
        let mut lms = fist();
        for finger in Finger::ALL {
            raise(&mut lms, finger);
        }
        let states = classify(&Hand::new(0, lms)).unwrap();
        assert_eq!(states.as_array(), [true; 5]);
        assert_eq!(states.count(), 5);
        assert_eq!(states.to_string(), "thumb+index+middle+ring+pinky");
    }

    #[test]
    fn test_each_finger_alone() {
        for finger in Finger::ALL {
            let mut lms = fist();
            raise(&mut lms, finger);
            let states = classify(&Hand::new(0, lms)).unwrap();
            assert_eq!(states.count(), 1, "{finger}");
            assert!(states[finger], "{finger}");
            assert_eq!(states.extended().collect::<Vec<_>>(), [finger]);
        }
    }

    #[test]
    fn test_equal_coordinates_are_folded() {
        let mut lms = fist();
        lms.set(
            LandmarkIdx::IndexFingerTip as usize,
            Landmark::new([0.5, 0.5, 0.0]),
        );
        lms.set(LandmarkIdx::ThumbTip as usize, Landmark::new([0.5, 0.1, 0.0]));
        let states = classify(&Hand::new(0, lms)).unwrap();
        assert!(!states[Finger::Index]);
        assert!(!states[Finger::Thumb]);
    }

    #[test]
    fn test_thumb_ignores_vertical_position() {
        let mut lms = fist();
        // high above the wrist, but to its right
        lms.set(LandmarkIdx::ThumbTip as usize, Landmark::new([0.7, 0.0, 0.0]));
        assert!(!classify(&Hand::new(0, lms.clone())).unwrap()[Finger::Thumb]);

        // below the wrist, but to its left
        lms.set(LandmarkIdx::ThumbTip as usize, Landmark::new([0.3, 1.0, 0.0]));
        assert!(classify(&Hand::new(0, lms)).unwrap()[Finger::Thumb]);
    }

    #[test]
    fn test_wrong_landmark_count() {
        for len in [0, 20, 22] {
            let hand = Hand::new(1, Landmarks::new(len));
            let expected = InvalidInputError::LandmarkCount {
                slot: 1,
                expected: 21,
                actual: len,
            };
            assert_eq!(classify(&hand).unwrap_err(), expected);
            assert_eq!(bounding_box(&hand, Resolution::VGA).unwrap_err(), expected);
            assert_eq!(classify_hand(&hand, Resolution::VGA).unwrap_err(), expected);
        }
    }

    #[test]
    fn test_bounding_box() {
        let hand = Hand::new(0, fist());
        // x spans 0.5..=0.6, y spans 0.5..=0.9
        let rect = bounding_box(&hand, Resolution::new(100, 200)).unwrap();
        assert_eq!(rect.to_tuple(), (50, 100, 60, 180));

        let rect = bounding_box(&hand, Resolution::new(1, 1)).unwrap();
        assert_eq!(rect.to_tuple(), (0, 0, 0, 0));
    }

    #[test]
    fn test_bounding_box_out_of_frame() {
        let mut lms = fist();
        lms.set(0, Landmark::new([-0.1, 1.2, 0.0]));
        let rect = bounding_box(&Hand::new(0, lms), Resolution::new(100, 100)).unwrap();
        assert_eq!(rect.to_tuple(), (-10, 50, 60, 120));
    }

    #[test]
    fn test_classify_hand() {
        let mut lms = fist();
        raise(&mut lms, Finger::Index);
        raise(&mut lms, Finger::Middle);
        let hand = Hand::new(0, lms);
        let res = classify_hand(&hand, Resolution::new(100, 100)).unwrap();
        assert_eq!(res.count(), 2);
        assert_eq!(res.count(), res.finger_states().count());
        assert_eq!(res.finger_states().to_string(), "index+middle");
        assert_eq!(res.bounding_box().to_tuple(), (50, 20, 60, 90));
    }
}
