//! Configuration module for Granska.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{ExtractionPrompts, Prompts, VerificationPrompts};
pub use settings::{
    ExtractionSettings, GeneralSettings, PromptSettings, ServerSettings, Settings,
    StorageSettings, TranscriptionSettings, TrustedSourceSettings, VerificationSettings,
};
