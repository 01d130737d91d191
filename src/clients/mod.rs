//! Outbound third-party API clients.

pub mod gemini;
pub mod roboflow;

pub use gemini::GeminiClient;
pub use roboflow::RoboflowClient;
