//! File Processing Domain
//!
//! Turns queue payloads into file processing work.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Processor  │  ← MessageHandler for the worker pool
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Decoder   │  ← bytes → FileProcessingMessage
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Dispatcher  │  ← process_type → action (validate / transform / analyze)
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use amqp_worker::{PrometheusRecorder, WorkerConfig, WorkerPool};
//! use domain_file_processing::FileProcessor;
//!
//! let pool = WorkerPool::new(WorkerConfig::default(), FileProcessor::simulated(), PrometheusRecorder);
//! ```

pub mod actions;
pub mod decoder;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod processor;

// Re-export commonly used types
pub use actions::{FileAction, SimulatedAction};
pub use decoder::decode;
pub use dispatcher::ActionDispatcher;
pub use error::{FileProcessingError, FileProcessingResult};
pub use models::{FileProcessingMessage, ProcessType};
pub use processor::FileProcessor;
