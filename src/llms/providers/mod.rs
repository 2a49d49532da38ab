//! Provider implementations of [`TextGenerator`](crate::llms::generator::TextGenerator).

pub mod gemini;
