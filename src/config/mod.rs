//! # Configuration Module
//!
//! This module provides the configuration structures passed into every pipeline stage.

pub mod config;

pub use config::{OptimizerConfig, PipelineConfig, SaveOptions, ScreenFitConfig};
