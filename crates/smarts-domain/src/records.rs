//! Parser de registros delimitados.
//!
//! Convierte texto crudo (pegado o leído de archivo) en una lista ordenada
//! de pares (estructura, nombre). El alineamiento por índice entre
//! estructuras y nombres es un invariante del que depende todo el pipeline
//! posterior.

use serde::{Deserialize, Serialize};

use crate::config::SubmissionConfig;

/// Un registro de molécula tal como lo escribió el usuario. Inmutable
/// después de su creación; la clave canónica vive en el índice, no aquí.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoleculeRecord {
    pub raw_structure: String,
    pub display_name: String,
}

/// Batch parseado de una submission, en el orden de entrada.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedBatch {
    pub records: Vec<MoleculeRecord>,
}

impl ParsedBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Estructuras en orden de entrada (alineadas con `names`).
    pub fn structures(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.raw_structure.as_str()).collect()
    }

    /// Nombres en orden de entrada (alineados con `structures`).
    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.display_name.as_str()).collect()
    }
}

/// Divide una línea en tokens no vacíos. Tab y coma separan siempre;
/// además separa cualquier carácter del delimitador configurado.
fn split_columns<'a>(line: &'a str, delimiter: &str) -> Vec<&'a str> {
    line.split(|c: char| c == '\t' || c == ',' || delimiter.contains(c))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Parsea el texto delimitado según la configuración.
///
/// - Normaliza CRLF/LF y descarta líneas vacías.
/// - Si `has_header`, descarta la primera línea.
/// - La columna de estructura fuera de rango produce una estructura vacía
///   (molécula inválida aguas abajo, nunca un panic).
/// - Si no hay columna de nombre o el token está vacío, el nombre visible
///   es la propia estructura.
pub fn parse_delimited(text: &str, config: &SubmissionConfig) -> ParsedBatch {
    let lines = text.split(['\n'])
                    .map(|l| l.trim_end_matches('\r'))
                    .filter(|l| !l.trim().is_empty());

    let mut records = Vec::new();
    for (idx, line) in lines.enumerate() {
        if config.has_header && idx == 0 {
            continue;
        }
        let parts = split_columns(line, &config.delimiter);
        let structure = parts.get(config.structure_col).copied().unwrap_or("");
        let name = config.name_col
                         .and_then(|c| parts.get(c).copied())
                         .filter(|n| !n.is_empty())
                         .unwrap_or(structure);
        records.push(MoleculeRecord { raw_structure: structure.to_string(),
                                      display_name: name.to_string() });
    }
    ParsedBatch { records }
}
