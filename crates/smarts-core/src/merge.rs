//! Merge de resultados: el algoritmo central de reconciliación.
//!
//! Cada entrada del servicio se canonicaliza de nuevo y se busca en el
//! índice para recuperar la identidad original del usuario; después se
//! computa el vector de matches sobre los patrones activos y se agregan
//! los átomos a resaltar. La lista unificada queda ordenada fail-first.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::canon::{CanonIndex, Canonicalizer};
use crate::raw::RawMatchSet;

/// Registro unificado por (molécula, pattern-set) después del merge.
/// Vive hasta la siguiente submission, que reemplaza la lista completa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub name: String,
    pub structure: String,
    /// Nombres de los patrones que matchearon, unidos por coma.
    pub pattern_label: String,
    /// true = fail.
    pub failed: bool,
    /// Un booleano por patrón activo, en el orden declarado del set.
    pub matches: Option<Vec<bool>>,
    /// Conjunto deduplicado de índices de átomos.
    pub highlight_atoms: Vec<u32>,
    pub filter_name: String,
}

/// Reconcilia las entradas de un pattern-set contra el índice.
///
/// - La clave canónica de la estructura devuelta recupera la grafía y el
///   nombre originales; si no está en el índice se usa lo que mandó el
///   servicio (defensivo: no se esperan moléculas introducidas por él).
/// - Una entrada cuya estructura no canonicaliza se salta con un
///   diagnóstico; nunca aborta la respuesta completa.
pub fn merge_set(set: RawMatchSet,
                 index: &CanonIndex,
                 canon: &dyn Canonicalizer)
                 -> (Vec<MatchRecord>, Vec<String>) {
    let mut records = Vec::with_capacity(set.entries.len());
    let mut diagnostics = Vec::new();

    for entry in set.entries {
        let key = match canon.canonical_key(&entry.structure) {
            Some(k) => k,
            None => {
                warn!("entrada de respuesta no canonicalizable, saltada: {:?}", entry.structure);
                diagnostics.push(format!("Skipped malformed response entry for {:?} ({})",
                                         entry.structure, set.filter_name));
                continue;
            }
        };

        let structure = index.structure_for(&key).unwrap_or(&entry.structure).to_string();
        let name = index.name_for(&key).unwrap_or(&entry.name).to_string();

        let matches = if set.pattern_names.is_empty() {
            None
        } else {
            Some(set.pattern_names
                    .iter()
                    .map(|p| entry.reasons.iter().any(|r| r == p))
                    .collect())
        };

        let mut highlight_atoms = entry.highlight_atoms;
        highlight_atoms.sort_unstable();
        highlight_atoms.dedup();

        records.push(MatchRecord { name,
                                   structure,
                                   pattern_label: entry.reasons.join(", "),
                                   failed: entry.failed,
                                   matches,
                                   highlight_atoms,
                                   filter_name: set.filter_name.clone() });
    }

    (records, diagnostics)
}

/// Concatena los resultados de todos los sets y ordena fail-first.
/// El sort es estable: dentro de cada veredicto se conserva el orden de
/// llegada.
pub fn unify(per_set: Vec<Vec<MatchRecord>>) -> Vec<MatchRecord> {
    let mut all: Vec<MatchRecord> = per_set.into_iter().flatten().collect();
    all.sort_by_key(|r| !r.failed);
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::Passthrough;
    use crate::raw::RawMatch;
    use smarts_domain::MoleculeRecord;

    fn entry(structure: &str, name: &str, failed: bool, reasons: &[&str], atoms: &[u32]) -> RawMatch {
        RawMatch { structure: structure.to_string(),
                   name: name.to_string(),
                   failed,
                   reasons: reasons.iter().map(|s| s.to_string()).collect(),
                   highlight_atoms: atoms.to_vec() }
    }

    fn index_for(pairs: &[(&str, &str)]) -> CanonIndex {
        let records: Vec<MoleculeRecord> =
            pairs.iter()
                 .map(|(s, n)| MoleculeRecord { raw_structure: s.to_string(),
                                                display_name: n.to_string() })
                 .collect();
        CanonIndex::build(&records, &Passthrough).0
    }

    #[test]
    fn match_vector_follows_declared_pattern_order() {
        let index = index_for(&[("c1ccccc1", "benzene")]);
        let set = RawMatchSet { filter_name: "Custom".to_string(),
                                pattern_names: vec!["amide".to_string(), "aromatic".to_string()],
                                entries: vec![entry("c1ccccc1", "benzene", true, &["aromatic"], &[0, 1])] };
        let (records, diags) = merge_set(set, &index, &Passthrough);
        assert!(diags.is_empty());
        assert_eq!(records[0].matches, Some(vec![false, true]));
        assert_eq!(records[0].pattern_label, "aromatic");
    }

    #[test]
    fn highlight_atoms_are_deduplicated() {
        let index = index_for(&[("CCO", "ethanol")]);
        let set = RawMatchSet { filter_name: "Custom".to_string(),
                                pattern_names: vec!["a".to_string(), "b".to_string()],
                                entries: vec![entry("CCO", "ethanol", true, &["a", "b"], &[1, 2, 2, 3])] };
        let (records, _) = merge_set(set, &index, &Passthrough);
        assert_eq!(records[0].highlight_atoms, vec![1, 2, 3]);
    }

    #[test]
    fn unknown_key_falls_back_to_service_identity() {
        let index = index_for(&[("CCO", "ethanol")]);
        let set = RawMatchSet { filter_name: "PAINS".to_string(),
                                pattern_names: vec!["p".to_string()],
                                entries: vec![entry("CCN", "from-service", false, &[], &[])] };
        let (records, _) = merge_set(set, &index, &Passthrough);
        assert_eq!(records[0].structure, "CCN");
        assert_eq!(records[0].name, "from-service");
    }

    #[test]
    fn non_canonicalizable_entry_is_skipped_with_diagnostic() {
        let index = index_for(&[("CCO", "ethanol")]);
        let set = RawMatchSet { filter_name: "PAINS".to_string(),
                                pattern_names: vec!["p".to_string()],
                                entries: vec![entry("", "broken", true, &["p"], &[]),
                                              entry("CCO", "ethanol", false, &[], &[])] };
        let (records, diags) = merge_set(set, &index, &Passthrough);
        assert_eq!(records.len(), 1);
        assert_eq!(diags.len(), 1);
        assert_eq!(records[0].name, "ethanol");
    }

    #[test]
    fn unify_sorts_fail_first_and_stable() {
        let mk = |name: &str, failed: bool| MatchRecord { name: name.to_string(),
                                                          structure: name.to_string(),
                                                          pattern_label: String::new(),
                                                          failed,
                                                          matches: None,
                                                          highlight_atoms: vec![],
                                                          filter_name: "x".to_string() };
        let unified = unify(vec![vec![mk("a", false), mk("b", true)],
                                 vec![mk("c", true), mk("d", false)]]);
        let names: Vec<&str> = unified.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a", "d"]);
        for pair in unified.windows(2) {
            assert!(pair[0].failed as u8 >= pair[1].failed as u8);
        }
    }
}
