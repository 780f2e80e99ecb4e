//! Carga del asset de pattern-set fijo.
//!
//! El asset es un recurso de texto estático, un patrón y un nombre por
//! línea separados por espacios, y se carga en el momento de la query, no
//! al arrancar. Un fallo de carga aborta solo ese pattern-set.

use std::path::Path;

use smarts_domain::{parse_pattern_list, PatternSpec};

use crate::service::ServiceError;

pub async fn load_pattern_asset(path: &Path) -> Result<Vec<PatternSpec>, ServiceError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|source| ServiceError::Asset { path: path.display().to_string(),
                                                                                            source })?;
    Ok(parse_pattern_list(&text))
}
