// Data structures for AirLabs JSON documents.
// Only the fields the jobs read are typed; everything else is ignored on input.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// Every AirLabs response wraps its payload in `response`; failures come back
// with HTTP 200 and an `error` object instead.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub response: Option<Vec<T>>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl ApiErrorBody {
    pub fn describe(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (None, Some(message)) => message.clone(),
            (Some(code), None) => code.clone(),
            (None, None) => "unspecified error".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Country {
    pub code: String,
}

// Some carriers have no IATA designator; a missing or null `iata_code`
// both deserialize to None.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Airline {
    #[serde(default)]
    pub iata_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RouteEndpoints {
    pub dep_iata: String,
    pub arr_iata: String,
}

// Route records are stored untouched so the combined flights file keeps every field
pub type RouteRecord = Value;

// One inner list per airline queried, in query order
pub type RouteGroups = Vec<Vec<RouteRecord>>;
