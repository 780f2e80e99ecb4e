//! Forma interna única de los resultados del servicio.
//!
//! El servicio responde con al menos tres shapes JSON distintas según el
//! endpoint; los adaptadores las normalizan a `RawMatch` inmediatamente
//! después de recibirlas, de modo que el merge opera sobre una sola forma.

use serde::{Deserialize, Serialize};

/// Una entrada por molécula tal como la reportó el servicio, ya
/// normalizada.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMatch {
    /// Estructura devuelta por el servicio (puede diferir textualmente de
    /// la enviada aunque represente la misma molécula).
    pub structure: String,
    pub name: String,
    /// Veredicto del set completo: true = la molécula falló el filtro.
    pub failed: bool,
    /// Nombres de los patrones que matchearon.
    pub reasons: Vec<String>,
    /// Índices de átomos a resaltar, ya aplanados.
    pub highlight_atoms: Vec<u32>,
}

/// Resultado crudo de un pattern-set completo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMatchSet {
    /// Etiqueta del set (p. ej. "PAINS", "Blake", "Custom").
    pub filter_name: String,
    /// Nombres de los patrones activos, en el orden declarado. Define el
    /// orden de columnas del vector de matches.
    pub pattern_names: Vec<String>,
    pub entries: Vec<RawMatch>,
}
