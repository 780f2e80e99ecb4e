// smarts-domain library entry point
pub mod config;
pub mod errors;
pub mod patterns;
pub mod records;
pub use config::{ExpertFlags, SubmissionConfig};
pub use errors::DomainError;
pub use patterns::{parse_pattern_list, PatternSpec};
pub use records::{parse_delimited, MoleculeRecord, ParsedBatch};
