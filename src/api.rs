// AirLabs endpoint construction and response envelope handling

use crate::config::ApiConfig;
use crate::error::{PipelineError, Result};
use crate::model::ApiEnvelope;
use reqwest::Url;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct AirLabsApi {
    base_url: String,
    api_key: String,
}

impl AirLabsApi {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let key = config.require_api_key()?;
        Ok(Self::new(config.base_url.clone(), key))
    }

    // `{base}/airlines?country_code={code}&api_key={key}`
    pub fn airlines_by_country(&self, country_code: &str) -> Result<String> {
        self.endpoint("airlines", &[("country_code", country_code)])
    }

    // `{base}/routes?airline_iata={code}&api_key={key}`
    pub fn routes_by_airline(&self, airline_iata: &str) -> Result<String> {
        self.endpoint("routes", &[("airline_iata", airline_iata)])
    }

    fn endpoint(&self, resource: &str, params: &[(&str, &str)]) -> Result<String> {
        let base = format!("{}/{}", self.base_url, resource);
        let url = Url::parse_with_params(
            &base,
            params
                .iter()
                .copied()
                .chain(std::iter::once(("api_key", self.api_key.as_str()))),
        )
        .map_err(|e| PipelineError::ConfigError(format!("invalid base URL {base}: {e}")))?;
        Ok(url.into())
    }
}

// Masks the `api_key` query value so URLs can be logged.
pub fn redact_api_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(k, v)| {
                    let v = if k == "api_key" { "***".to_string() } else { v.into_owned() };
                    (k.into_owned(), v)
                })
                .collect();
            if pairs.is_empty() {
                return parsed.into();
            }
            parsed.query_pairs_mut().clear().extend_pairs(pairs);
            parsed.into()
        }
        Err(_) => "<unparseable url>".to_string(),
    }
}

// Decodes an API body and returns its `response` list. An `error` object or a
// missing `response` key aborts with a typed error naming `key`.
pub fn parse_response_list<T: DeserializeOwned>(key: &str, body: &str) -> Result<Vec<T>> {
    let envelope: ApiEnvelope<T> = serde_json::from_str(body)
        .map_err(|e| PipelineError::parse(format!("response for {key}"), &e))?;
    unwrap_envelope(&format!("response for {key}"), key, envelope)
}

// Same checks as `parse_response_list` for an envelope that was already
// decoded, e.g. one read back from disk.
pub fn unwrap_envelope<T>(context: &str, key: &str, envelope: ApiEnvelope<T>) -> Result<Vec<T>> {
    if let Some(error) = envelope.error {
        return Err(PipelineError::ApiError {
            key: key.to_string(),
            message: error.describe(),
        });
    }

    envelope.response.ok_or_else(|| PipelineError::MissingField {
        field: "response".to_string(),
        context: context.to_string(),
    })
}
