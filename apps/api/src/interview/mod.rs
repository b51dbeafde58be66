// Interview engine: question generation, answer evaluation, session lifecycle.
// All LLM calls go through llm_client::TextGenerator; no direct HTTP calls here.

pub mod formatter;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod rehydrate;
pub mod repository;
pub mod service;
pub mod session_store;
pub mod workflow;

#[cfg(test)]
pub mod testing;
