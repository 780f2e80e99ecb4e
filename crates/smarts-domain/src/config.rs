//! Configuración de una submission: cómo se parsea la entrada y qué
//! flags de modo experto viajan al servicio de matching.

use serde::{Deserialize, Serialize};

/// Flags de modo experto. Los seis primeros se envían al servicio como
/// booleanos codificados en string ("true"/"false"); los dos últimos
/// filtran filas del lado cliente después del merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertFlags {
    pub exclude_molprops: bool,
    pub strict: bool,
    pub unique_atom_set: bool,
    pub kekulized: bool,
    pub isomeric: bool,
    pub non_zero_rows: bool,
    pub include_passes: bool,
    pub include_fails: bool,
}

impl Default for ExpertFlags {
    fn default() -> Self {
        Self { exclude_molprops: false,
               strict: false,
               unique_atom_set: false,
               kekulized: false,
               isomeric: false,
               non_zero_rows: false,
               include_passes: true,
               include_fails: true }
    }
}

fn as_str(b: bool) -> &'static str {
    if b { "true" } else { "false" }
}

impl ExpertFlags {
    /// Pares (clave, valor) tal como los espera el servicio.
    pub fn query_params(&self) -> Vec<(&'static str, &'static str)> {
        vec![("exclude_molprops", as_str(self.exclude_molprops)),
             ("strict", as_str(self.strict)),
             ("unique_atom_set", as_str(self.unique_atom_set)),
             ("kekulized", as_str(self.kekulized)),
             ("isomeric", as_str(self.isomeric)),
             ("non_zero_rows", as_str(self.non_zero_rows))]
    }
}

/// Configuración de parseo de la entrada delimitada más los flags
/// expertos. Se crea una vez por submission y no se comparte entre
/// submissions concurrentes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Caracteres extra que actúan como separador de columnas. Tab y coma
    /// se aceptan siempre como fallback.
    pub delimiter: String,
    /// Índice (base 0) de la columna con la estructura.
    pub structure_col: usize,
    /// Índice (base 0) de la columna con el nombre, si hay.
    pub name_col: Option<usize>,
    /// Si la primera línea es cabecera y debe descartarse.
    pub has_header: bool,
    pub flags: ExpertFlags,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self { delimiter: " ".to_string(),
               structure_col: 0,
               name_col: Some(1),
               has_header: false,
               flags: ExpertFlags::default() }
    }
}
