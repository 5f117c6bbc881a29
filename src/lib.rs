//! Conversational banking assistant service
//!
//! A small HTTP service that answers natural-language questions about
//! mock bank accounts (balances, recent spend, loan quotes) through an
//! OpenAI function-calling agent:
//! - Read-only dataset loaded once at startup
//! - Five deterministic query tools exposed to the model
//! - Single /query endpoint returning the final text answer
//!
//! FLOW:
//! POST /query → agent loop (model ⇄ tools) → final answer

pub mod agent;
pub mod api;
pub mod dataset;
pub mod error;
pub mod models;
pub mod openai;
pub mod tools;

pub use error::Result;

// Re-export common types
pub use dataset::Dataset;
pub use models::*;
