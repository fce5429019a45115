//! # Precipitation Simulator
//!
//! Synthetic daily precipitation datasets for the three-station network, in
//! the same JSON shape the API loads.
//!
//! ## Features
//!
//! - Seasonal rain probability following a cosine curve over the year
//! - Gamma-distributed rainfall amounts with correlated station noise
//! - Reproducible output from a fixed seed

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod generator;

pub use generator::{DatasetGenerator, GeneratorConfig, GeneratorError};
