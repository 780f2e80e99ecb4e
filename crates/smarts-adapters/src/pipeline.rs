//! Orquestador de submissions.
//!
//! Secuencia estricta: parse -> índice de canonicalización -> queries por
//! pattern-set habilitado (secuenciales) -> merge -> publicación de la
//! lista unificada. No hay publicación parcial: los resultados solo se
//! vuelven visibles cuando el merge completo terminó.
//!
//! Un guard de reentrancia asegura como máximo una submission en vuelo;
//! una segunda petición mientras hay una activa es un no-op (sin cola y
//! sin cancelación de la activa).

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error};

use smarts_core::{merge_set, unify, CanonIndex, Canonicalizer, CoreError, MatchRecord, SubmissionContext};
use smarts_domain::{parse_delimited, PatternSpec, SubmissionConfig};

use crate::assets::load_pattern_asset;
use crate::response::{normalize_counts, normalize_partition, normalize_toxicity};
use crate::service::MatchService;

/// Qué pattern-sets están habilitados para esta submission.
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    /// Patrón ad hoc único.
    pub single: Option<PatternSpec>,
    /// Set fijo de toxicidad (PAINS); los patrones viven en el servicio.
    pub toxicity: bool,
    /// Segundo set fijo, cargado desde un asset en el momento de la query.
    pub secondary_asset: Option<PathBuf>,
    /// Set libre del usuario experto.
    pub custom: Vec<PatternSpec>,
}

impl FilterSelection {
    pub fn any_enabled(&self) -> bool {
        self.single.is_some() || self.toxicity || self.secondary_asset.is_some() || !self.custom.is_empty()
    }
}

/// Guard de reentrancia: a lo sumo una submission procesándose a la vez.
#[derive(Debug, Default)]
pub struct SubmissionGate {
    busy: AtomicBool,
}

pub struct GatePermit<'a> {
    gate: &'a SubmissionGate,
}

impl SubmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` si ya hay una submission en vuelo. El permiso se libera al
    /// soltarse, incluso si la submission termina por error o se dropea.
    pub fn try_acquire(&self) -> Option<GatePermit<'_>> {
        if self.busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok() {
            Some(GatePermit { gate: self })
        } else {
            None
        }
    }
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

/// Ejecuta una submission completa y devuelve el contexto con la lista
/// unificada publicada y los errores acumulados.
///
/// Fallos por pattern-set no abortan los demás: se registran como error
/// visible y ese set simplemente no aporta al merge.
pub async fn run_submission(service: &dyn MatchService,
                            canon: Arc<dyn Canonicalizer>,
                            gate: &SubmissionGate,
                            config: SubmissionConfig,
                            structures_text: &str,
                            selection: &FilterSelection)
                            -> Result<SubmissionContext, CoreError> {
    let _permit = gate.try_acquire().ok_or(CoreError::SubmissionInFlight)?;
    if !selection.any_enabled() {
        return Err(CoreError::NoPatternSet);
    }

    let mut ctx = SubmissionContext::new(config);
    let batch = parse_delimited(structures_text, &ctx.config);
    ctx.processed = batch.len();
    debug!("submission: {} moléculas parseadas", batch.len());
    if batch.is_empty() {
        return Ok(ctx);
    }

    // Canonicalizar el batch completo es CPU-bound; va fuera del hilo del
    // runtime para no estorbar al resto del trabajo.
    let records = batch.records.clone();
    let canon_for_index = Arc::clone(&canon);
    let (index, diagnostics) =
        tokio::task::spawn_blocking(move || CanonIndex::build(&records, canon_for_index.as_ref())).await
                                                                                                  .map_err(|e| {
                                                                                                      CoreError::Internal(e.to_string())
                                                                                                  })?;
    ctx.extend_errors(diagnostics);

    let structures = batch.structures();
    let names = batch.names();
    let mut per_set: Vec<Vec<MatchRecord>> = Vec::new();

    if selection.toxicity {
        match service.filter_toxicity(&structures, &names, &ctx.config.flags).await {
            Ok(response) => {
                let (set, diags) = normalize_toxicity(response);
                ctx.extend_errors(diags);
                ctx.record_pattern_columns(&set);
                let (records, diags) = merge_set(set, &index, canon.as_ref());
                ctx.extend_errors(diags);
                per_set.push(records);
            }
            Err(e) => {
                error!("set de toxicidad falló: {e}");
                ctx.push_error(format!("PAINS filter failed: {e}"));
            }
        }
    }

    if let Some(asset_path) = &selection.secondary_asset {
        match load_pattern_asset(asset_path).await {
            Ok(patterns) => {
                let names_of = patterns.iter().map(|p| p.name.clone()).collect();
                match service.multi_match(&structures, &names, &patterns, &ctx.config.flags).await {
                    Ok(response) => {
                        let (set, diags) = normalize_partition(response, "Blake", names_of);
                        ctx.extend_errors(diags);
                        ctx.record_pattern_columns(&set);
                        let (records, diags) = merge_set(set, &index, canon.as_ref());
                        ctx.extend_errors(diags);
                        per_set.push(records);
                    }
                    Err(e) => {
                        error!("set secundario falló: {e}");
                        ctx.push_error(format!("Blake filter failed: {e}"));
                    }
                }
            }
            Err(e) => {
                error!("asset del set secundario inaccesible: {e}");
                ctx.push_error(format!("Blake pattern asset failed: {e}"));
            }
        }
    }

    let count_sets: Vec<(&str, Vec<PatternSpec>)> =
        [selection.single.clone().map(|p| ("Single", vec![p])),
         (!selection.custom.is_empty()).then(|| ("Custom", selection.custom.clone()))].into_iter()
                                                                                      .flatten()
                                                                                      .collect();

    for (label, patterns) in count_sets {
        let names_of = patterns.iter().map(|p| p.name.clone()).collect();
        match service.match_counts(&structures, &names, &patterns, &ctx.config.flags).await {
            Ok(values) => {
                let (set, diags) = normalize_counts(values, label, names_of);
                ctx.extend_errors(diags);
                ctx.record_pattern_columns(&set);
                let (records, diags) = merge_set(set, &index, canon.as_ref());
                ctx.extend_errors(diags);
                per_set.push(records);
            }
            Err(e) => {
                error!("set {label} falló: {e}");
                ctx.push_error(format!("{label} filter failed: {e}"));
            }
        }
    }

    let mut results = unify(per_set);
    if !ctx.config.flags.include_fails {
        results.retain(|r| !r.failed);
    }
    if !ctx.config.flags.include_passes {
        results.retain(|r| r.failed);
    }
    ctx.publish(results);
    Ok(ctx)
}
