pub mod agent;
pub mod client;

pub use client::LlmClient;
