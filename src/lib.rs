//! `pipeline-momentum` library crate.
//!
//! Loads a momentum framework, validates and scores deal rows against it, and
//! renders the per-deal results table and summary report. The binary is a thin
//! CLI wrapper around [`workflows::momentum::MomentumPipeline`].

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
