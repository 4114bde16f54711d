//! Evaluation orchestration for single resumes and batches

pub mod batch;
pub mod evaluator;
