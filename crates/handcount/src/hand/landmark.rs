//! Hand landmark topology.

use nalgebra::{Point2, Rotation2, Vector2};
use serde::Deserialize;

use crate::landmark::{Landmark, Landmarks};

/// Error returned when a [`Hand`] does not have the landmark layout the classifier expects.
///
/// Only the hand that caused it is affected: callers are expected to skip it and carry on with
/// the remaining hands of the frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInputError {
    #[error("hand in slot {slot} has {actual} landmarks, expected {expected}")]
    LandmarkCount {
        slot: usize,
        expected: usize,
        actual: usize,
    },
    #[error("hand in slot {slot} has a non-finite coordinate in landmark {landmark}")]
    NonFinite { slot: usize, landmark: usize },
}

/// One detected hand in a frame.
///
/// Landmark `x` and `y` coordinates are normalized to the frame dimensions. Hands are only valid
/// for the frame they were detected in; there is no identity that carries over to the next frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    slot: usize,
    landmarks: Landmarks,
    handedness: Option<Handedness>,
}

impl Hand {
    /// Number of landmarks in a well-formed hand.
    pub const NUM_LANDMARKS: usize = 21;

    /// Creates a hand from the landmarks at position `slot` of a frame's detection list.
    ///
    /// `landmarks` is not validated here; a wrong landmark count is reported when the hand is
    /// classified.
    pub fn new(slot: usize, landmarks: Landmarks) -> Self {
        Self {
            slot,
            landmarks,
            handedness: None,
        }
    }

    /// Attaches the handedness estimated by the landmark network.
    pub fn with_handedness(self, handedness: Handedness) -> Self {
        Self {
            handedness: Some(handedness),
            ..self
        }
    }

    /// Returns the position of this hand in its frame's detection list.
    ///
    /// This is *not* a stable identity and says nothing about which hand this is.
    #[inline]
    pub fn slot(&self) -> usize {
        self.slot
    }

    #[inline]
    pub fn landmarks(&self) -> &Landmarks {
        &self.landmarks
    }

    /// Returns the handedness reported by the landmark source, if it reports one.
    #[inline]
    pub fn handedness(&self) -> Option<Handedness> {
        self.handedness
    }

    /// Checks that this hand has exactly [`Hand::NUM_LANDMARKS`] landmarks, with finite `x` and
    /// `y` coordinates.
    pub fn check(&self) -> Result<(), InvalidInputError> {
        if self.landmarks.len() != Self::NUM_LANDMARKS {
            return Err(InvalidInputError::LandmarkCount {
                slot: self.slot,
                expected: Self::NUM_LANDMARKS,
                actual: self.landmarks.len(),
            });
        }

        // `z` is never looked at
        match self
            .landmarks
            .iter()
            .position(|lm| !lm.x().is_finite() || !lm.y().is_finite())
        {
            Some(landmark) => Err(InvalidInputError::NonFinite {
                slot: self.slot,
                landmark,
            }),
            None => Ok(()),
        }
    }

    /// Returns the landmark with the given name.
    ///
    /// # Panics
    ///
    /// Panics if the hand does not pass [`Hand::check`].
    #[inline]
    pub fn landmark(&self, idx: LandmarkIdx) -> Landmark {
        self.landmarks.get(idx as usize)
    }

    /// Returns an iterator over the landmarks that surround the palm.
    pub fn palm_landmarks(&self) -> impl Iterator<Item = Landmark> + '_ {
        PALM_LANDMARKS.iter().map(|idx| self.landmark(*idx))
    }

    /// Computes the center position of the hand's palm by averaging some of the landmarks.
    pub fn palm_center(&self) -> [f32; 3] {
        let mut pos = [0.0; 3];
        let mut count = 0;
        for lm in self.palm_landmarks() {
            pos[0] += lm.x();
            pos[1] += lm.y();
            pos[2] += lm.z();
            count += 1;
        }

        pos.map(|c| c / count as f32)
    }

    /// Computes the clockwise rotation of the palm compared to an upright position.
    ///
    /// A rotation of 0° means that fingers are pointed upwards. This is computed in normalized
    /// coordinates, so it is only exact for square frames.
    pub fn rotation_radians(&self) -> f32 {
        let p = self.landmark(LandmarkIdx::MiddleFingerMcp);
        let finger = Point2::new(p.x(), p.y());
        let p = self.landmark(LandmarkIdx::Wrist);
        let wrist = Point2::new(p.x(), p.y());

        let rel = wrist - finger;
        Rotation2::rotation_between(&Vector2::y(), &rel).angle()
    }

    /// Mirrors the hand horizontally, as if it had been detected in a flipped image.
    ///
    /// Mirroring turns a left hand into a right hand, so the handedness (if any) is swapped too.
    pub fn flip_horizontal_in_place(&mut self) {
        self.landmarks.map_positions(|[x, y, z]| [1.0 - x, y, z]);
        self.handedness = self.handedness.map(Handedness::opposite);
    }
}

/// Which hand a [`Hand`] is, as estimated by the landmark network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn opposite(self) -> Self {
        match self {
            Handedness::Left => Handedness::Right,
            Handedness::Right => Handedness::Left,
        }
    }
}

/// Names for the hand pose landmarks.
///
/// # Terminology
///
/// - **CMC**: [Carpometacarpal joint], the lowest joint of the thumb, located near the wrist.
/// - **MCP**: [Metacarpophalangeal joint], the lower joint forming the knuckles near the palm of
///   the hand.
/// - **PIP**: Proximal Interphalangeal joint, the joint between the MCP and DIP.
/// - **DIP**: Distal Interphalangeal joint, the highest joint of a finger.
/// - **Tip**: This landmark is just placed on the tip of the finger, above the DIP.
///
/// [Carpometacarpal joint]: https://en.wikipedia.org/wiki/Carpometacarpal_joint
/// [Metacarpophalangeal joint]: https://en.wikipedia.org/wiki/Metacarpophalangeal_joint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

const PALM_LANDMARKS: &[LandmarkIdx] = {
    use LandmarkIdx::*;
    &[
        Wrist,
        ThumbCmc,
        IndexFingerMcp,
        MiddleFingerMcp,
        RingFingerMcp,
        PinkyMcp,
    ]
};

/// Pairs of landmarks connected by a bone, for drawing the hand skeleton.
pub const CONNECTIVITY: &[(LandmarkIdx, LandmarkIdx)] = {
    use LandmarkIdx::*;
    &[
        // Surround the palm:
        (Wrist, ThumbCmc),
        (ThumbCmc, IndexFingerMcp),
        (IndexFingerMcp, MiddleFingerMcp),
        (MiddleFingerMcp, RingFingerMcp),
        (RingFingerMcp, PinkyMcp),
        (PinkyMcp, Wrist),
        // Thumb:
        (ThumbCmc, ThumbMcp),
        (ThumbMcp, ThumbIp),
        (ThumbIp, ThumbTip),
        // Index:
        (IndexFingerMcp, IndexFingerPip),
        (IndexFingerPip, IndexFingerDip),
        (IndexFingerDip, IndexFingerTip),
        // Middle:
        (MiddleFingerMcp, MiddleFingerPip),
        (MiddleFingerPip, MiddleFingerDip),
        (MiddleFingerDip, MiddleFingerTip),
        // Ring:
        (RingFingerMcp, RingFingerPip),
        (RingFingerPip, RingFingerDip),
        (RingFingerDip, RingFingerTip),
        // Pinky:
        (PinkyMcp, PinkyPip),
        (PinkyPip, PinkyDip),
        (PinkyDip, PinkyTip),
    ]
};
