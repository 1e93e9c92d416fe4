//! Conversion of raw scoring payloads into typed profiles.
//!
//! `parse_scoring_result` is the only place raw JSON from the service is
//! inspected. Everything downstream works with [`ScoringResult`] and
//! [`NormalizedProfile`].

use crate::error::{ClientError, Result};
use crate::models::{InventoryScores, NormalizedProfile, ScoringResult, TraitScore};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Parse a `score/text` response body.
///
/// The body must be an object with a `scoring` object mapping inventory ids
/// to trait objects. Each trait needs a numeric `score`; `quantile`,
/// `confidence` and `confidence_text` may be absent or `null`.
pub fn parse_scoring_result(body: &Value) -> Result<ScoringResult> {
    let root = body
        .as_object()
        .ok_or_else(|| malformed("response body is not a JSON object"))?;

    let scoring = root
        .get("scoring")
        .ok_or_else(|| malformed("response has no `scoring` key"))?
        .as_object()
        .ok_or_else(|| malformed("`scoring` is not an object"))?;

    let mut inventories = Vec::with_capacity(scoring.len());
    for (inventory, traits) in scoring {
        let traits = traits
            .as_object()
            .ok_or_else(|| malformed(format!("`scoring.{}` is not an object", inventory)))?;

        let parsed = traits
            .iter()
            .map(|(trait_id, entry)| parse_trait(inventory, trait_id, entry))
            .collect::<Result<Vec<_>>>()?;

        debug!("Parsed {} traits for inventory {}", parsed.len(), inventory);
        inventories.push(InventoryScores {
            inventory: inventory.clone(),
            traits: parsed,
        });
    }

    Ok(ScoringResult { inventories })
}

fn parse_trait(inventory: &str, trait_id: &str, entry: &Value) -> Result<TraitScore> {
    let path = format!("scoring.{}.{}", inventory, trait_id);
    let fields = entry
        .as_object()
        .ok_or_else(|| malformed(format!("`{}` is not an object", path)))?;

    let score = optional_number(fields, "score", &path)?
        .ok_or_else(|| malformed(format!("`{}` has no numeric `score`", path)))?;

    Ok(TraitScore {
        trait_id: trait_id.to_string(),
        score,
        quantile: optional_number(fields, "quantile", &path)?,
        confidence: optional_number(fields, "confidence", &path)?,
        confidence_text: optional_string(fields, "confidence_text", &path)?,
    })
}

fn optional_number(fields: &Map<String, Value>, key: &str, path: &str) -> Result<Option<f64>> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| malformed(format!("`{}.{}` is not representable as f64", path, key))),
        Some(other) => Err(malformed(format!(
            "`{}.{}` should be a number, got {}",
            path,
            key,
            json_type(other)
        ))),
    }
}

fn optional_string(fields: &Map<String, Value>, key: &str, path: &str) -> Result<Option<String>> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(malformed(format!(
            "`{}.{}` should be a string, got {}",
            path,
            key,
            json_type(other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn malformed(message: impl Into<String>) -> ClientError {
    ClientError::MalformedResponse(message.into())
}

/// Extract the profile for `inventory`.
///
/// An inventory missing from the result yields an empty profile rather than
/// an error. Trait order is the order the service sent them in.
pub fn normalize(result: &ScoringResult, inventory: &str) -> NormalizedProfile {
    match result.inventory(inventory) {
        Some(scores) => NormalizedProfile {
            inventory: inventory.to_string(),
            traits: scores.traits.clone(),
        },
        None => {
            warn!(
                "Inventory {} not present in result (have: {:?}), using empty profile",
                inventory,
                result.inventory_ids()
            );
            NormalizedProfile::empty(inventory)
        }
    }
}

/// Like [`normalize`], but a missing inventory is an error.
pub fn normalize_strict(result: &ScoringResult, inventory: &str) -> Result<NormalizedProfile> {
    if result.inventory(inventory).is_none() {
        return Err(ClientError::UnknownInventory(inventory.to_string()));
    }
    Ok(normalize(result, inventory))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn big5_payload() -> Value {
        // Key order deliberately non-alphabetical.
        serde_json::from_str(
            r#"{
                "scoring": {
                    "big5": {
                        "openness": {"score": 0.21, "quantile": 0.6, "confidence": 0.8, "confidence_text": "high"},
                        "neuroticism": {"score": -0.45, "quantile": 0.2, "confidence": 0.5, "confidence_text": "normal"},
                        "extraversion": {"score": 0.62},
                        "agreeableness": {"score": 0.1, "quantile": null},
                        "conscientiousness": {"score": 0.33, "confidence_text": "low"}
                    }
                },
                "text": "ignored"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_preserves_payload_order() {
        let result = parse_scoring_result(&big5_payload()).unwrap();
        let profile = normalize(&result, "big5");
        let order: Vec<_> = profile.iter().map(|t| t.trait_id.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "openness",
                "neuroticism",
                "extraversion",
                "agreeableness",
                "conscientiousness"
            ]
        );
    }

    #[test]
    fn test_normalize_one_record_per_trait_key() {
        let payload = big5_payload();
        let result = parse_scoring_result(&payload).unwrap();
        let profile = normalize(&result, "big5");

        let keys = payload["scoring"]["big5"].as_object().unwrap();
        assert_eq!(profile.len(), keys.len());
        for record in profile.iter() {
            assert!(keys.contains_key(&record.trait_id));
        }
    }

    #[test]
    fn test_absent_fields_stay_missing() {
        let result = parse_scoring_result(&big5_payload()).unwrap();
        let profile = normalize(&result, "big5");

        let extraversion = profile.get("extraversion").unwrap();
        assert_eq!(extraversion.score, 0.62);
        assert_eq!(extraversion.quantile, None);
        assert_eq!(extraversion.confidence, None);
        assert_eq!(extraversion.confidence_text, None);

        let agreeableness = profile.get("agreeableness").unwrap();
        assert_eq!(agreeableness.quantile, None);

        let openness = profile.get("openness").unwrap();
        assert_eq!(openness.quantile, Some(0.6));
        assert_eq!(openness.confidence_text.as_deref(), Some("high"));
    }

    #[test]
    fn test_missing_inventory_is_empty_profile() {
        let result = parse_scoring_result(&big5_payload()).unwrap();
        let profile = normalize(&result, "missing-inventory");
        assert!(profile.is_empty());
        assert_eq!(profile.inventory, "missing-inventory");
    }

    #[test]
    fn test_strict_missing_inventory_errors() {
        let result = parse_scoring_result(&big5_payload()).unwrap();
        let err = normalize_strict(&result, "missing-inventory").unwrap_err();
        assert!(matches!(err, ClientError::UnknownInventory(ref id) if id == "missing-inventory"));
        assert_eq!(normalize_strict(&result, "big5").unwrap().len(), 5);
    }

    #[test]
    fn test_multiple_inventories() {
        let payload = json!({
            "scoring": {
                "big5": {"openness": {"score": 0.1}},
                "neo": {"anxiety": {"score": -0.2}, "hostility": {"score": 0.0}}
            }
        });
        let result = parse_scoring_result(&payload).unwrap();
        assert_eq!(result.inventory_ids(), vec!["big5", "neo"]);
        assert_eq!(normalize(&result, "neo").len(), 2);
    }

    #[test]
    fn test_empty_inventory_object() {
        let result = parse_scoring_result(&json!({"scoring": {"big5": {}}})).unwrap();
        assert!(normalize(&result, "big5").is_empty());
    }

    #[test]
    fn test_rejects_non_object_body() {
        let err = parse_scoring_result(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse(_)));
    }

    #[test]
    fn test_rejects_missing_scoring() {
        let err = parse_scoring_result(&json!({"detail": "nope"})).unwrap_err();
        assert!(err.to_string().contains("scoring"));
    }

    #[test]
    fn test_rejects_bad_field_types() {
        let no_score = json!({"scoring": {"big5": {"openness": {"quantile": 0.5}}}});
        assert!(parse_scoring_result(&no_score).is_err());

        let string_score = json!({"scoring": {"big5": {"openness": {"score": "high"}}}});
        let err = parse_scoring_result(&string_score).unwrap_err();
        assert!(err.to_string().contains("scoring.big5.openness.score"));

        let string_quantile =
            json!({"scoring": {"big5": {"openness": {"score": 0.1, "quantile": "0.5"}}}});
        assert!(parse_scoring_result(&string_quantile).is_err());

        let numeric_text =
            json!({"scoring": {"big5": {"openness": {"score": 0.1, "confidence_text": 3}}}});
        assert!(parse_scoring_result(&numeric_text).is_err());

        let trait_not_object = json!({"scoring": {"big5": {"openness": 0.1}}});
        assert!(parse_scoring_result(&trait_not_object).is_err());
    }
}
