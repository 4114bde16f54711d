//! Generative model integration: client, retry pipeline, prompts and response interpretation

pub mod client;
pub mod interpreter;
pub mod prompts;
pub mod retry;
