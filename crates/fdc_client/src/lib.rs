//! Minimal `FdcClient` trait and the raw FoodData Central payload types.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod config;
pub mod http_client;

#[derive(Debug, Error)]
pub enum FdcError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("authentication rejected: {0}")]
    Auth(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("decoding response: {0}")]
    Decode(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl FdcError {
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            404 => FdcError::NotFound(body),
            401 | 403 => FdcError::Auth(body),
            _ => FdcError::Status { status, body },
        }
    }

    /// True when the remote could not be reached or answered with a server fault.
    pub fn is_transport(&self) -> bool {
        match self {
            FdcError::Http(_) | FdcError::Auth(_) => true,
            FdcError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Identifying fields of a nutrient as found in FDC detail records.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NutrientDescriptor {
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub number: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unit_name: Option<String>,
}

/// One nutrient record. Search hits use the flat shape
/// (`nutrientNumber`/`value`), detail records nest a `nutrient` descriptor and
/// report `amount`. Both decode into this struct.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FdcNutrient {
    #[serde(default, alias = "number", deserialize_with = "deserialize_opt_string")]
    pub nutrient_number: Option<String>,
    #[serde(default, alias = "name")]
    pub nutrient_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit_name: Option<String>,
    #[serde(default)]
    pub nutrient: Option<NutrientDescriptor>,
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub amount: Option<f64>,
}

impl FdcNutrient {
    pub fn number(&self) -> Option<&str> {
        self.nutrient_number
            .as_deref()
            .or_else(|| self.nutrient.as_ref().and_then(|n| n.number.as_deref()))
    }

    pub fn name(&self) -> Option<&str> {
        self.nutrient_name
            .as_deref()
            .or_else(|| self.nutrient.as_ref().and_then(|n| n.name.as_deref()))
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit_name
            .as_deref()
            .or_else(|| self.nutrient.as_ref().and_then(|n| n.unit_name.as_deref()))
    }

    pub fn amount(&self) -> Option<f64> {
        self.value.or(self.amount)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FdcFood {
    pub fdc_id: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub food_nutrients: Vec<FdcNutrient>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default)]
    pub foods: Vec<FdcFood>,
    #[serde(default)]
    pub total_hits: Option<u64>,
}

fn deserialize_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string().into()),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn deserialize_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64()),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected numeric string, got {s:?}"))),
        Some(other) => Err(D::Error::custom(format!("expected number, got {other}"))),
    }
}

#[async_trait]
pub trait FdcClient: Send + Sync + 'static {
    /// Full-text search over the food database.
    async fn search_foods(&self, query: &str, page_size: u32) -> Result<Vec<FdcFood>, FdcError>;

    /// Fetch one food record by its numeric FDC id.
    async fn get_food(&self, fdc_id: u64) -> Result<FdcFood, FdcError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_flat_search_nutrient() {
        let payload = json!({"nutrientNumber": "208", "nutrientName": "Energy", "value": 165.0, "unitName": "KCAL"});
        let n: FdcNutrient = serde_json::from_value(payload).expect("flat nutrient");
        assert_eq!(n.number(), Some("208"));
        assert_eq!(n.name(), Some("Energy"));
        assert_eq!(n.amount(), Some(165.0));
    }

    #[test]
    fn decodes_nested_detail_nutrient() {
        let payload = json!({"nutrient": {"number": 203, "name": "Protein", "unitName": "g"}, "amount": "31.02"});
        let n: FdcNutrient = serde_json::from_value(payload).expect("nested nutrient");
        assert_eq!(n.number(), Some("203"));
        assert_eq!(n.unit(), Some("g"));
        assert_eq!(n.amount(), Some(31.02));
    }

    #[test]
    fn nutrient_number_rejects_objects() {
        let payload = json!({"nutrientNumber": {"nested": true}, "value": 1.0});
        let res: Result<FdcNutrient, _> = serde_json::from_value(payload);
        assert!(res.is_err());
    }

    #[test]
    fn search_result_without_foods_is_empty() {
        let res: SearchResult = serde_json::from_value(json!({"totalHits": 0})).expect("decode");
        assert!(res.foods.is_empty());
        assert_eq!(res.total_hits, Some(0));
    }

    #[test]
    fn from_status_classifies_codes() {
        assert!(matches!(FdcError::from_status(404, String::new()), FdcError::NotFound(_)));
        assert!(matches!(FdcError::from_status(403, String::new()), FdcError::Auth(_)));
        assert!(FdcError::from_status(503, String::new()).is_transport());
        assert!(!FdcError::from_status(400, String::new()).is_transport());
    }
}
