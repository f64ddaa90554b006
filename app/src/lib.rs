//! Husk: OCR-driven redaction of forbidden text in uploaded images.

pub mod config;
pub mod context;
pub mod cover;
pub mod pipeline;

pub use config::{load_config, save_config, AppConfig, ConfigError, CoverSource};
pub use context::{ContextError, RedactionContext};
pub use pipeline::{
    process_batch, process_upload, write_redacted, Outcome, PipelineError, Upload, UploadReport,
};
