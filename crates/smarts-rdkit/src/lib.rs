use pyo3::PyErr;
use thiserror::Error;
pub mod core;

use smarts_core::canon::Canonicalizer;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Error inicializando Python/RDKit: {0}")]
    Init(PyErr),
    #[error("Error canonicalizando estructura: {0}")]
    Canonicalize(PyErr),
    #[error("Error generando depicción: {0}")]
    Depict(PyErr),
}

/// Handle al módulo RDKit embebido. `init()` carga el wrapper Python una
/// sola vez; las instancias posteriores comparten el módulo.
pub struct RdkitEngine {
    _private: (),
}

impl RdkitEngine {
    pub fn init() -> Result<Self, EngineError> {
        core::init_python().map_err(EngineError::Init)?;
        Ok(Self { _private: () })
    }

    pub fn canonical_smiles(&self, smiles: &str) -> Result<String, EngineError> {
        core::canonical_smiles(smiles).map_err(EngineError::Canonicalize)
    }

    /// SVG de la estructura con los átomos indicados resaltados.
    pub fn depict_svg(&self, smiles: &str, highlight_atoms: &[u32]) -> Result<String, EngineError> {
        core::depict_svg(smiles, highlight_atoms, 350, 300).map_err(EngineError::Depict)
    }
}

// La canonicalización por molécula devuelve None ante estructuras
// inválidas: una entrada malformada nunca aborta el batch completo.
impl Canonicalizer for RdkitEngine {
    fn canonical_key(&self, structure: &str) -> Option<String> {
        core::canonical_smiles(structure).ok()
    }
}
