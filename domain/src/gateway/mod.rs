//! HTTP clients for the third-party AI providers.

pub mod assembly_ai;
pub mod gemini;
