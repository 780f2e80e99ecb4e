//! Cliente del servicio de matching.
//!
//! El servicio es un colaborador opaco: endpoints GET bajo
//! `/api/v1/smarts_filter` que reciben las moléculas y nombres del batch
//! unidos por coma, los patrones como parámetros repetidos y los flags
//! expertos como booleanos en string. Aquí no hay reintentos: todo fallo
//! es terminal para el intento y se reporta hacia arriba.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use smarts_domain::{ExpertFlags, PatternSpec};

use crate::config::ServiceConfig;
use crate::response::{PartitionResponse, ToxicityResponse};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Error HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Respuesta no exitosa del servicio ({status}) en {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("JSON malformado de {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Error cargando asset de patrones {path}: {source}")]
    Asset {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Seam asíncrono hacia el servicio de matching. Las pruebas del pipeline
/// lo implementan con respuestas enlatadas; producción usa
/// `HttpMatchService`.
#[async_trait]
pub trait MatchService: Send + Sync {
    /// Set fijo de toxicidad (los patrones viven en el servicio).
    async fn filter_toxicity(&self,
                             structures: &[&str],
                             names: &[&str],
                             flags: &ExpertFlags)
                             -> Result<ToxicityResponse, ServiceError>;

    /// Matching multi-patrón con partición failed/passed.
    async fn multi_match(&self,
                         structures: &[&str],
                         names: &[&str],
                         patterns: &[PatternSpec],
                         flags: &ExpertFlags)
                         -> Result<PartitionResponse, ServiceError>;

    /// Matching con conteo por patrón; las entradas se decodifican una a
    /// una para poder saltar las malformadas sin abortar el batch.
    async fn match_counts(&self,
                          structures: &[&str],
                          names: &[&str],
                          patterns: &[PatternSpec],
                          flags: &ExpertFlags)
                          -> Result<Vec<Value>, ServiceError>;
}

/// Implementación HTTP real sobre reqwest.
#[derive(Debug, Clone)]
pub struct HttpMatchService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMatchService {
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client,
                  base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/api/v1/smarts_filter/{}", self.base_url, name)
    }

    /// Parámetros comunes a todos los endpoints: batch + flags.
    fn batch_params(structures: &[&str], names: &[&str], flags: &ExpertFlags) -> Vec<(String, String)> {
        let mut params = vec![("SMILES".to_string(), structures.join(",")),
                              ("Smile_Names".to_string(), names.join(","))];
        for (k, v) in flags.query_params() {
            params.push((k.to_string(), v.to_string()));
        }
        params
    }

    fn pattern_params(patterns: &[PatternSpec]) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(patterns.len() * 2);
        for p in patterns {
            params.push(("smarts".to_string(), p.smarts.clone()));
            params.push(("Smart_Names".to_string(), p.name.clone()));
        }
        params
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self,
                                                      endpoint: &str,
                                                      params: &[(String, String)])
                                                      -> Result<T, ServiceError> {
        let url = self.endpoint(endpoint);
        let response = self.client.get(&url).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status { endpoint: endpoint.to_string(),
                                              status: status.as_u16() });
        }
        response.json::<T>().await.map_err(|e| ServiceError::Decode { endpoint: endpoint.to_string(),
                                                                      message: e.to_string() })
    }
}

#[async_trait]
impl MatchService for HttpMatchService {
    async fn filter_toxicity(&self,
                             structures: &[&str],
                             names: &[&str],
                             flags: &ExpertFlags)
                             -> Result<ToxicityResponse, ServiceError> {
        let params = Self::batch_params(structures, names, flags);
        self.get_json("get_filterpains", &params).await
    }

    async fn multi_match(&self,
                         structures: &[&str],
                         names: &[&str],
                         patterns: &[PatternSpec],
                         flags: &ExpertFlags)
                         -> Result<PartitionResponse, ServiceError> {
        let mut params = Self::batch_params(structures, names, flags);
        params.extend(Self::pattern_params(patterns));
        self.get_json("get_multi_matchfilter", &params).await
    }

    async fn match_counts(&self,
                          structures: &[&str],
                          names: &[&str],
                          patterns: &[PatternSpec],
                          flags: &ExpertFlags)
                          -> Result<Vec<Value>, ServiceError> {
        let mut params = Self::batch_params(structures, names, flags);
        params.extend(Self::pattern_params(patterns));
        self.get_json("get_match_filter", &params).await
    }
}
