//! smarts-adapters: etapas de IO del pipeline.
//!
//! Contiene el cliente HTTP del servicio de matching, las tres shapes JSON
//! de respuesta con su normalización inmediata a `RawMatch`, el cargador
//! del asset de patrones fijos y el orquestador de submissions.
pub mod assets;
pub mod config;
pub mod pipeline;
pub mod response;
pub mod service;

pub use assets::load_pattern_asset;
pub use config::ServiceConfig;
pub use pipeline::{run_submission, FilterSelection, SubmissionGate};
pub use response::{normalize_counts, normalize_partition, normalize_toxicity, PartitionResponse, ToxicityResponse};
pub use service::{HttpMatchService, MatchService, ServiceError};
