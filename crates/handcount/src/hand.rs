//! Hand landmarks and finger classification.
//!
//! A [`Hand`] is the set of 21 landmarks a hand landmark network outputs for one detected hand.
//! [`classify`] decides which of its fingers are extended, [`bounding_box`] computes the pixel
//! area it covers.

pub mod gesture;
pub mod landmark;

pub use gesture::{
    bounding_box, classify, classify_hand, ClassificationResult, Finger, FingerStates,
};
pub use landmark::{Hand, Handedness, InvalidInputError, LandmarkIdx};
