// Numerics calls for a lot of non-standard names
#![allow(non_snake_case)]
#![allow(non_upper_case_globals)]

pub mod angle_grid;
pub mod array_factor;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod expression;
pub mod fft;
pub mod helper;
pub mod methods;
pub mod normalize;
pub mod params;
pub mod pattern_metrics;
pub mod polynomial;
pub mod series_chart;

pub use engine::{synthesize, SynthesisResult};
pub use error::SynthesisError;
