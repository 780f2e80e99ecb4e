//! Carga de configuración del servicio desde variables de entorno.
//! Usa convención `SMARTSFILTER_*` con defaults locales.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// URL base del servicio de matching.
    pub base_url: String,
    /// Timeout explícito por request. La fuente original no tenía ninguno
    /// y un request colgado bloqueaba la submission indefinidamente.
    pub timeout: Duration,
    /// Directorio con los assets de pattern-sets fijos.
    pub asset_dir: PathBuf,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        let base_url = env::var("SMARTSFILTER_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
        let timeout_secs = env::var("SMARTSFILTER_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(30);
        let asset_dir = env::var("SMARTSFILTER_ASSET_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("data"));
        Self { base_url,
               timeout: Duration::from_secs(timeout_secs),
               asset_dir }
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
