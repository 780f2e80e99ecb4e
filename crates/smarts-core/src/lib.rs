//! smarts-core: motor de reconciliación de resultados
//!
//! Recibe batches parseados y respuestas ya normalizadas del servicio de
//! matching, y las reconcilia contra la identidad original de cada
//! molécula vía el índice de canonicalización. No hace IO: las etapas son
//! funciones puras sobre valores tipados, lo que permite probar el merge
//! sin red ni Python.
pub mod canon;
pub mod context;
pub mod errors;
pub mod merge;
pub mod raw;
pub mod session;

pub use canon::{CanonIndex, Canonicalizer, Passthrough};
pub use context::SubmissionContext;
pub use errors::CoreError;
pub use merge::{merge_set, unify, MatchRecord};
pub use raw::{RawMatch, RawMatchSet};
pub use session::{AnalysisDetail, AnalysisStore};
