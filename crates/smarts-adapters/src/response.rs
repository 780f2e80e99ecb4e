//! Shapes JSON del servicio y su normalización a `RawMatch`.
//!
//! El servicio responde con tres formas distintas según el endpoint:
//! la de toxicidad (`results` + `all_pains_filters`), la particionada
//! (`failed`/`passed`) y la plana con conteos por patrón. Cada una se
//! normaliza aquí, inmediatamente después de recibirse, para que el merge
//! opere sobre una sola forma. Las entradas individuales malformadas se
//! saltan con un diagnóstico; nunca tumban la respuesta completa.

use std::collections::HashMap;

use log::warn;
use serde::Deserialize;
use serde_json::Value;

use smarts_core::{RawMatch, RawMatchSet};

/// Shape de toxicidad: una entrada por molécula, con los nombres de los
/// patrones del set completo en `all_pains_filters`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToxicityResponse {
    pub results: Vec<Value>,
    pub all_pains_filters: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ToxicityEntry {
    name: String,
    smiles: String,
    failed: bool,
    #[serde(default)]
    reasons: Vec<String>,
    #[serde(default)]
    highlight_atoms: Vec<Vec<u32>>,
}

/// Shape particionada: listas `failed` y `passed` separadas.
#[derive(Debug, Clone, Deserialize)]
pub struct PartitionResponse {
    #[serde(default)]
    pub failed: Vec<Value>,
    #[serde(default)]
    pub passed: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct PartitionEntry {
    name: String,
    smiles: String,
    #[serde(default)]
    reasons: Option<Vec<String>>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    highlight_atoms: Vec<Vec<u32>>,
}

impl PartitionEntry {
    fn reason_list(&self) -> Vec<String> {
        match (&self.reasons, &self.reason) {
            (Some(rs), _) => rs.clone(),
            (None, Some(r)) => vec![r.clone()],
            (None, None) => Vec::new(),
        }
    }
}

/// Shape plana con conteo por patrón.
#[derive(Debug, Deserialize)]
struct CountEntry {
    smiles: String,
    name: String,
    #[serde(default)]
    matches: Vec<CountMatch>,
}

#[derive(Debug, Deserialize)]
struct CountMatch {
    name: String,
    count: u32,
    #[serde(default)]
    highlight_atoms: Vec<u32>,
}

fn decode_entry<T: serde::de::DeserializeOwned>(value: Value, shape: &str, diagnostics: &mut Vec<String>) -> Option<T> {
    match serde_json::from_value::<T>(value) {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!("entrada {} malformada, saltada: {}", shape, e);
            diagnostics.push(format!("Skipped malformed {} entry: {}", shape, e));
            None
        }
    }
}

fn flatten(groups: Vec<Vec<u32>>) -> Vec<u32> {
    groups.into_iter().flatten().collect()
}

/// Normaliza la respuesta de toxicidad. El veredicto viene dado por el
/// servicio; el vector de matches se construirá contra
/// `all_pains_filters` en el merge.
pub fn normalize_toxicity(response: ToxicityResponse) -> (RawMatchSet, Vec<String>) {
    let mut diagnostics = Vec::new();
    let mut entries = Vec::with_capacity(response.results.len());
    for value in response.results {
        let Some(entry) = decode_entry::<ToxicityEntry>(value, "toxicity", &mut diagnostics) else {
            continue;
        };
        entries.push(RawMatch { structure: entry.smiles,
                                name: entry.name,
                                failed: entry.failed,
                                reasons: entry.reasons,
                                highlight_atoms: flatten(entry.highlight_atoms) });
    }
    (RawMatchSet { filter_name: "PAINS".to_string(),
                   pattern_names: response.all_pains_filters,
                   entries },
     diagnostics)
}

/// Normaliza la respuesta particionada aplicando precedencia de fail: si
/// la misma estructura aparece en `failed` y en `passed`, gana la entrada
/// fallida. (Comportamiento inferido del orden de merge observado en el
/// servicio, no de un contrato documentado.)
pub fn normalize_partition(response: PartitionResponse,
                           filter_name: &str,
                           pattern_names: Vec<String>)
                           -> (RawMatchSet, Vec<String>) {
    let mut diagnostics = Vec::new();
    // mapa por estructura + vector de orden de llegada, para que la
    // precedencia de fails sea determinista
    let mut by_structure: HashMap<String, RawMatch> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for (values, failed) in [(response.failed, true), (response.passed, false)] {
        for value in values {
            let Some(entry) = decode_entry::<PartitionEntry>(value, "partition", &mut diagnostics) else {
                continue;
            };
            if by_structure.contains_key(&entry.smiles) {
                // la primera pasada inserta los fails; un duplicado en
                // passed no los degrada
                continue;
            }
            order.push(entry.smiles.clone());
            let reasons = entry.reason_list();
            by_structure.insert(entry.smiles.clone(),
                                RawMatch { structure: entry.smiles,
                                           name: entry.name,
                                           failed,
                                           reasons,
                                           highlight_atoms: flatten(entry.highlight_atoms) });
        }
    }

    let entries = order.into_iter().filter_map(|s| by_structure.remove(&s)).collect();
    (RawMatchSet { filter_name: filter_name.to_string(),
                   pattern_names,
                   entries },
     diagnostics)
}

/// Normaliza la shape plana de conteos: una molécula falla si algún
/// patrón tiene count > 0; los átomos resaltados son la unión de los
/// patrones que matchearon.
pub fn normalize_counts(values: Vec<Value>,
                        filter_name: &str,
                        pattern_names: Vec<String>)
                        -> (RawMatchSet, Vec<String>) {
    let mut diagnostics = Vec::new();
    let mut entries = Vec::with_capacity(values.len());
    for value in values {
        let Some(entry) = decode_entry::<CountEntry>(value, "count", &mut diagnostics) else {
            continue;
        };
        let mut reasons = Vec::new();
        let mut highlight_atoms = Vec::new();
        for m in &entry.matches {
            if m.count > 0 {
                reasons.push(m.name.clone());
                highlight_atoms.extend_from_slice(&m.highlight_atoms);
            }
        }
        entries.push(RawMatch { structure: entry.smiles,
                                name: entry.name,
                                failed: !reasons.is_empty(),
                                reasons,
                                highlight_atoms });
    }
    (RawMatchSet { filter_name: filter_name.to_string(),
                   pattern_names,
                   entries },
     diagnostics)
}
