//! Text generation backends.
//!
//! - [`generator`] - the [`TextGenerator`] trait and request type
//! - [`providers`] - provider implementations (Gemini)

pub mod generator;
pub mod providers;

pub use generator::{GenerationRequest, SafetySetting, TextGenerator};
