//! Contexto explícito de una submission.
//!
//! Sustituye al estado mutable global de la UI original: se crea uno nuevo
//! por submission, es propiedad exclusiva de la cadena de tareas activa y
//! nunca se comparte entre submissions concurrentes.

use serde::{Deserialize, Serialize};

use smarts_domain::SubmissionConfig;

use crate::merge::MatchRecord;
use crate::raw::RawMatchSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionContext {
    pub config: SubmissionConfig,
    /// Cantidad de moléculas del batch de entrada.
    pub processed: usize,
    /// Errores y diagnósticos visibles para el usuario, en orden de
    /// aparición. Un set fallido aporta aquí y se omite del merge.
    pub errors: Vec<String>,
    /// Lista unificada de resultados. Solo se publica cuando el merge
    /// completo terminó; no hay publicación parcial.
    pub results: Vec<MatchRecord>,
    /// Columnas de patrones por set (nombre del set, nombres de patrones
    /// en orden declarado). La UI zipea el vector de matches contra esta
    /// lista posicionalmente.
    pub pattern_columns: Vec<(String, Vec<String>)>,
}

impl SubmissionContext {
    pub fn new(config: SubmissionConfig) -> Self {
        Self { config,
               processed: 0,
               errors: Vec::new(),
               results: Vec::new(),
               pattern_columns: Vec::new() }
    }

    /// Registra el orden de columnas de un set antes del merge.
    pub fn record_pattern_columns(&mut self, set: &RawMatchSet) {
        self.pattern_columns.push((set.filter_name.clone(), set.pattern_names.clone()));
    }

    /// Columnas de patrones del set indicado, si participó.
    pub fn columns_for(&self, filter_name: &str) -> Option<&[String]> {
        self.pattern_columns
            .iter()
            .find(|(name, _)| name == filter_name)
            .map(|(_, cols)| cols.as_slice())
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn extend_errors(&mut self, messages: Vec<String>) {
        self.errors.extend(messages);
    }

    /// Publica la lista unificada de una sola vez.
    pub fn publish(&mut self, results: Vec<MatchRecord>) {
        self.results = results;
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.failed).count()
    }
}
