//! Parser de listas de patrones SMARTS.
//!
//! Una línea no vacía = un patrón más un nombre opcional, separados por
//! espacios. El orden de la lista define el orden de columnas del vector
//! de matches que consume la UI, así que se preserva siempre.

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Un patrón estructural con su nombre visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSpec {
    pub smarts: String,
    pub name: String,
}

impl PatternSpec {
    pub fn new(smarts: &str, name: &str) -> Result<Self, DomainError> {
        if smarts.trim().is_empty() {
            return Err(DomainError::Validation("patrón SMARTS vacío".to_string()));
        }
        Ok(Self { smarts: smarts.trim().to_string(),
                  name: name.trim().to_string() })
    }
}

/// Parsea el texto de patrones, una línea por patrón.
///
/// Los patrones sin nombre reciben uno secuencial (`pattern_N`, N = número
/// de línea no vacía, base 1), de modo que los nombres autogenerados nunca
/// colisionan entre sí.
pub fn parse_pattern_list(text: &str) -> Vec<PatternSpec> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .enumerate()
        .filter_map(|(idx, line)| {
            let mut tokens = line.split_whitespace();
            let smarts = tokens.next()?;
            let name = match tokens.next() {
                Some(n) => n.to_string(),
                None => format!("pattern_{}", idx + 1),
            };
            Some(PatternSpec { smarts: smarts.to_string(),
                               name })
        })
        .collect()
}
