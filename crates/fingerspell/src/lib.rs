//! Fingerspelling letter recognition from hand landmarks.
//!
//! An external hand-landmark detector produces 21 normalized `(x, y)` keypoints per hand. This
//! library flattens them into a 42-element [`FeatureVector`], runs a small pre-trained network on
//! it, and reports the winning letter if the network is confident enough.
//!
//! The pieces are usable on their own:
//!
//! * [`features::encode`] turns landmarks into model input.
//! * [`classifier::Classifier`] owns the network and applies the confidence gate.
//! * [`pipeline::Recognizer`] runs a classifier on a worker thread and feeds detector events
//!   through it.
//! * [`display::ScreenTransform`] maps landmarks into screen space for drawing. It is never
//!   applied on the classification path.
//!
//! # Coordinates
//!
//! Landmarks are normalized to the detector's input image: `(0, 0)` is the top left corner and
//! `(1, 1)` is the bottom right corner. The classifier consumes them exactly as the detector
//! emits them.
//!
//! # Environment Variables
//!
//! * `FINGERSPELL_MODEL`: Overrides the default model path ([`classifier::DEFAULT_MODEL_PATH`])
//!   used by [`classifier::ClassifierOptions::default`]. The file must be an ONNX model.
//!
//! [`FeatureVector`]: features::FeatureVector

use log::LevelFilter;

pub mod classifier;
pub mod display;
pub mod features;
pub mod iter;
pub mod labels;
pub mod landmark;
pub mod nn;
pub mod num;
pub mod pipeline;
pub mod timer;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_PKG_NAME")), log_level)
        .filter(Some("tract_onnx"), LevelFilter::Warn)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and `fingerspell` will log at *debug* level, `tract` at *warn* level. Both
/// can be overridden with the `RUST_LOG` environment variable.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
