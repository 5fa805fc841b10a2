//! Credit Default Prediction Service Library
//!
//! Serves a frozen credit default classifier over NATS request-reply,
//! reproducing the training-time preprocessing pipeline (one-hot
//! encoding, column alignment, standard scaling) at inference time.

pub mod config;
pub mod features;
pub mod listener;
pub mod metrics;
pub mod model;
pub mod responder;
pub mod types;

pub use config::AppConfig;
pub use features::{align_columns, FeatureEncoder};
pub use listener::RequestListener;
pub use model::{ArtifactLoader, ScoringContext};
pub use responder::ReplyPublisher;
pub use types::{ClientRecord, Prediction};
