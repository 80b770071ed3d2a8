//! Finger counting from hand landmarks.
//!
//! Given the 21 hand landmarks produced by a MediaPipe-style hand landmark network, this crate
//! decides which fingers are extended, counts them, and computes a pixel-space bounding box for
//! each hand in a frame.
//!
//! # Coordinates
//!
//! Landmark `x` and `y` coordinates are normalized to the frame size, so they are in range 0.0 to
//! 1.0 for points inside the frame. Like in the input image, X points to the right and Y points
//! *down*. `z` is a relative depth value and is not used for classification.
//!
//! # Limitations
//!
//! The finger heuristics assume an upright hand seen through a mirrored camera. A hand that is
//! rotated sideways or upside down will be misclassified, see [`hand::gesture::classify`].
//!
//! # Environment Variables
//!
//! * `RUST_LOG`: overrides the log filter set up by [`init_logger!`].

use log::LevelFilter;

pub mod hand;
pub mod landmark;
pub mod num;
pub mod overlay;
pub mod pipeline;
pub mod rect;
pub mod replay;
pub mod resolution;
pub mod source;
pub mod timer;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_PKG_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and `handcount` will log at *debug* level, unless overridden via `RUST_LOG`.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
