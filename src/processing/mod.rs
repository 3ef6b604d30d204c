//! # Processing Module
//!
//! The per-image stages, leaf-first: sharpness scoring, pre-scale guard,
//! optimization loop and screen fit, plus the collaborators around them
//! (normalization, codecs) and the shared resampler.

pub mod codec;
pub mod normalize;
pub mod optimizer;
pub mod prescale;
pub mod resample;
pub mod screen_fit;
pub mod sharpness;

// Re-export commonly used types for convenience
pub use codec::{decode, encode, Decoded};
pub use normalize::normalize_to_rgb;
pub use optimizer::{optimize, optimize_prescaled, Optimized, StopReason};
pub use prescale::{pre_scale, PreScaled};
pub use resample::{image_size, Resampler};
pub use screen_fit::screen_fit;
pub use sharpness::sharpness_score;
