//! Remaining-useful-life transformation core.
//!
//! - **transformer**: the [`Transformer`] owning a feature and a target
//!   pipeline, fitted on a dataset of lives and applied per life
//! - **results**: helpers over predicted/true target vectors

pub mod results;
pub mod transformer;

pub use results::split_lives_indices;
pub use transformer::{TargetValues, Transformer, TransformerDescription};
