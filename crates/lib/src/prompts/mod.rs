//! # Default Prompt Templates
//!
//! The hardcoded prompt templates for every pipeline stage, with
//! `{placeholder}` slots filled in by the orchestrator. Centralizing them
//! keeps the stage code readable and gives one place to tune wording.

mod stages;

pub use stages::*;
