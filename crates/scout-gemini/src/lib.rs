//! Client for Google's Gemini `generateContent` API, restricted to the
//! structured JSON output mode the transform stage relies on.

pub mod client;
pub mod error;
pub mod types;

pub use client::GeminiClient;
pub use error::GeminiError;
pub use types::{GenerateContentRequest, GenerateContentResponse};
