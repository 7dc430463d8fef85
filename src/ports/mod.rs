//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and the learning algorithm and storage.

mod classifier;
mod storage;

pub use classifier::RiskClassifier;
pub use storage::{PatientStore, PatientUpdate, RecordPage, StoredPatient};
