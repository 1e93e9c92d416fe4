//! Text scoring and inventory listing.

use crate::analysis::parse_scoring_result;
use crate::client::transport::Transport;
use crate::error::{ClientError, Result};
use crate::models::{InventoryDescriptor, ScoreRequest, ScoringResult, DEFAULT_INVENTORY};
use serde_json::Value;
use tracing::{debug, info};

const SCORE_ENDPOINT: &str = "score/text";
const INVENTORIES_ENDPOINT: &str = "inventories";

/// Submits text samples to the scoring service.
pub struct Scorer<T> {
    transport: T,
    default_inventories: Vec<String>,
}

impl<T: Transport> Scorer<T> {
    /// Create a scorer that defaults to the `big5` inventory.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            default_inventories: vec![DEFAULT_INVENTORY.to_string()],
        }
    }

    /// Replace the inventories used by [`Scorer::score_default`].
    pub fn with_default_inventories(mut self, inventories: Vec<String>) -> Self {
        self.default_inventories = inventories;
        self
    }

    pub fn default_inventories(&self) -> &[String] {
        &self.default_inventories
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Score `text` against `inventories` with a single request.
    pub async fn score(&self, text: &str, inventories: &[String]) -> Result<ScoringResult> {
        if inventories.is_empty() {
            return Err(ClientError::InvalidRequest(
                "at least one inventory is required".to_string(),
            ));
        }

        let request = ScoreRequest::new(text, inventories.to_vec());
        let body = serde_json::to_value(&request)
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;

        debug!(
            "Scoring {} chars against {:?}",
            text.chars().count(),
            inventories
        );
        let response = self.transport.post(SCORE_ENDPOINT, &body).await?;
        let result = parse_scoring_result(&response)?;

        info!("Scored text: {} inventories returned", result.inventories.len());
        Ok(result)
    }

    /// Score `text` against the default inventories.
    pub async fn score_default(&self, text: &str) -> Result<ScoringResult> {
        self.score(text, &self.default_inventories).await
    }

    /// List the inventories the service can score.
    pub async fn list_inventories(&self) -> Result<Vec<InventoryDescriptor>> {
        let response = self.transport.get(INVENTORIES_ENDPOINT).await?;
        let inventories = parse_inventories(&response)?;
        info!("Service offers {} inventories", inventories.len());
        Ok(inventories)
    }
}

/// Parse the inventory listing.
///
/// Accepts either a bare array or an object with an `inventories` array.
/// Entries are id strings or objects with an `id`.
fn parse_inventories(body: &Value) -> Result<Vec<InventoryDescriptor>> {
    let entries = match body {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("inventories")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ClientError::MalformedResponse(
                    "inventory listing has no `inventories` array".to_string(),
                )
            })?,
        _ => {
            return Err(ClientError::MalformedResponse(
                "inventory listing is neither an array nor an object".to_string(),
            ))
        }
    };

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| match entry {
            Value::String(id) => Ok(InventoryDescriptor {
                id: id.clone(),
                name: None,
                reference: None,
            }),
            Value::Object(fields) => {
                let id = fields.get("id").and_then(Value::as_str).ok_or_else(|| {
                    ClientError::MalformedResponse(format!("inventory #{} has no string `id`", i))
                })?;
                let text = |key: &str| fields.get(key).and_then(Value::as_str).map(String::from);
                Ok(InventoryDescriptor {
                    id: id.to_string(),
                    name: text("name"),
                    reference: text("reference"),
                })
            }
            _ => Err(ClientError::MalformedResponse(format!(
                "inventory #{} is not a string or object",
                i
            ))),
        })
        .collect()
}
