pub mod archive_intake;
pub mod llm_service;

pub use archive_intake::ArchiveIntake;
pub use llm_service::{ChatCompleter, LlmService};
