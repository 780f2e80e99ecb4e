//! Handoff transitorio del detalle de análisis por molécula.
//!
//! Equivalente al sessionStorage de la UI original: el detalle se guarda
//! bajo un token aleatorio, se lee una sola vez al navegar a la vista de
//! análisis y no persiste más allá de la sesión del proceso.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::merge::MatchRecord;

/// Detalle de análisis de una molécula concreta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisDetail {
    pub name: String,
    pub structure: String,
    pub highlight_atoms: Vec<u32>,
    /// Columnas de patrones del set que produjo el registro.
    pub pattern_names: Vec<String>,
    /// Vector de matches alineado con `pattern_names`.
    pub matches: Vec<bool>,
}

impl AnalysisDetail {
    /// Construye el detalle desde un registro mergeado y los nombres de
    /// patrones de su set. `None` si el registro no trae vector de
    /// matches.
    pub fn from_record(record: &MatchRecord, pattern_names: &[String]) -> Option<Self> {
        let matches = record.matches.clone()?;
        Some(Self { name: record.name.clone(),
                    structure: record.structure.clone(),
                    highlight_atoms: record.highlight_atoms.clone(),
                    pattern_names: pattern_names.to_vec(),
                    matches })
    }

    pub fn total_matches(&self) -> usize {
        self.matches.iter().filter(|m| **m).count()
    }

    pub fn failed(&self) -> bool {
        self.total_matches() > 0
    }
}

/// Almacén clave/valor local al proceso, con lectura destructiva.
#[derive(Debug, Default)]
pub struct AnalysisStore {
    inner: DashMap<String, AnalysisDetail>,
}

impl AnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guarda el detalle y devuelve el token de sesión para recuperarlo.
    pub fn store(&self, detail: AnalysisDetail) -> String {
        let token = Uuid::new_v4().to_string();
        self.inner.insert(token.clone(), detail);
        token
    }

    /// Lectura única: el token deja de ser válido tras consumirse.
    pub fn take(&self, token: &str) -> Option<AnalysisDetail> {
        self.inner.remove(token).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
