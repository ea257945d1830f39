//! Core graph components for the apex-inference library
//!
//! This module contains the fundamental building blocks shared by the
//! elimination pipeline:
//! - Factor and conditional abstractions (shared, immutable references)
//! - Factor graph container
//! - Bayes net container (the output of elimination)

pub mod factor;
pub mod graph;

pub use factor::{Conditional, Factor, FactorIndex, Key, SharedConditional, SharedFactor};
pub use graph::{BayesNet, FactorGraph};
