//! Índice de canonicalización.
//!
//! El servicio de matching puede reetiquetar, reordenar o recodificar la
//! estructura que se le envía; el índice permite recuperar la grafía
//! original y el nombre visible del usuario a partir de la clave canónica,
//! sin importar cómo la reformateó el colaborador externo.

use indexmap::IndexMap;
use log::warn;

use smarts_domain::MoleculeRecord;

/// Capacidad de canonicalización delegada a la librería química externa.
///
/// `canonical_key` devuelve `None` ante una estructura inválida: el fallo
/// queda aislado por molécula y nunca aborta el batch completo.
pub trait Canonicalizer: Send + Sync {
    fn canonical_key(&self, structure: &str) -> Option<String>;
}

/// Canonicalizador identidad (recorta espacios). Para pruebas y para la
/// demo offline; no entiende química.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl Canonicalizer for Passthrough {
    fn canonical_key(&self, structure: &str) -> Option<String> {
        let t = structure.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    }
}

/// Mapeo clave canónica -> (estructura original, nombre visible).
/// Se construye una vez por submission y es de solo lectura durante el
/// matching.
#[derive(Debug, Default, Clone)]
pub struct CanonIndex {
    structure_by_key: IndexMap<String, String>,
    name_by_key: IndexMap<String, String>,
}

impl CanonIndex {
    /// Construye el índice a partir de los registros parseados.
    ///
    /// Claves duplicadas colapsan a una sola entrada con last-write-wins:
    /// es deduplicación intencional de estructuras repetidas. Las
    /// estructuras inválidas se devuelven como diagnósticos, nunca se
    /// pierden en silencio.
    pub fn build(records: &[MoleculeRecord], canon: &dyn Canonicalizer) -> (Self, Vec<String>) {
        let mut index = CanonIndex::default();
        let mut diagnostics = Vec::new();
        for record in records {
            match canon.canonical_key(&record.raw_structure) {
                Some(key) => {
                    index.structure_by_key.insert(key.clone(), record.raw_structure.clone());
                    index.name_by_key.insert(key, record.display_name.clone());
                }
                None => {
                    warn!("estructura inválida, excluida del matching: {:?}", record.raw_structure);
                    diagnostics.push(format!("Invalid structure skipped: {:?} ({})",
                                             record.raw_structure, record.display_name));
                }
            }
        }
        (index, diagnostics)
    }

    pub fn structure_for(&self, key: &str) -> Option<&str> {
        self.structure_by_key.get(key).map(String::as_str)
    }

    pub fn name_for(&self, key: &str) -> Option<&str> {
        self.name_by_key.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.structure_by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structure_by_key.is_empty()
    }
}
