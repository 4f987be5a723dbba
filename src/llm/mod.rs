// src/llm/mod.rs
// Upstream text-generation client

mod client;
mod wire;

pub use client::{AnalysisClient, OpenAiAnalysisClient, RawModelResponse};
pub use wire::{ChatMessage, ChatRequest, ChatResponse, parse_chat_content};
