//! Errores específicos del core (simples por ahora).

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreError {
    #[error("submission already in flight")] SubmissionInFlight,
    #[error("no pattern set enabled")] NoPatternSet,
    #[error("internal: {0}")] Internal(String),
}
