//! Type definitions for the credit default prediction service

pub mod prediction;
pub mod record;

pub use prediction::{ErrorReply, Prediction};
pub use record::ClientRecord;
