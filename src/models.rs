//! Data models for the scoring client.
//!
//! This module contains the typed records that flow through the pipeline:
//! requests sent to the service, parsed trait scores, per-subject profiles,
//! and the comparison table built across subjects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Inventory scored when the caller does not name one.
pub const DEFAULT_INVENTORY: &str = "big5";

/// Body of a `score/text` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRequest {
    /// Text sample to score.
    pub text: String,
    /// Inventory ids to score against, in request order.
    pub inventories: Vec<String>,
}

impl ScoreRequest {
    pub fn new(text: impl Into<String>, inventories: Vec<String>) -> Self {
        Self {
            text: text.into(),
            inventories,
        }
    }
}

/// Score of a single trait as returned by the service.
///
/// Only `score` is guaranteed. The other fields are `None` when the service
/// omitted them; they are never defaulted to zero or an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitScore {
    /// Trait id, e.g. `extraversion`.
    #[serde(rename = "trait")]
    pub trait_id: String,
    pub score: f64,
    pub quantile: Option<f64>,
    pub confidence: Option<f64>,
    pub confidence_text: Option<String>,
}

impl TraitScore {
    /// Creates a trait score carrying only the mandatory fields.
    pub fn new(trait_id: impl Into<String>, score: f64) -> Self {
        Self {
            trait_id: trait_id.into(),
            score,
            quantile: None,
            confidence: None,
            confidence_text: None,
        }
    }

    /// Whether the score leans toward the positive pole of the trait.
    pub fn is_positive(&self) -> bool {
        self.score > 0.0
    }
}

/// All trait scores for one inventory, in payload order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryScores {
    pub inventory: String,
    pub traits: Vec<TraitScore>,
}

/// Parsed response of one scoring call.
///
/// Inventories and traits keep the order in which the service sent them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub inventories: Vec<InventoryScores>,
}

impl ScoringResult {
    /// Looks up the scores of one inventory.
    pub fn inventory(&self, id: &str) -> Option<&InventoryScores> {
        self.inventories.iter().find(|inv| inv.inventory == id)
    }

    /// Inventory ids present in this result.
    pub fn inventory_ids(&self) -> Vec<&str> {
        self.inventories
            .iter()
            .map(|inv| inv.inventory.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inventories.is_empty()
    }
}

/// Trait scores of one subject for one inventory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedProfile {
    pub inventory: String,
    pub traits: Vec<TraitScore>,
}

impl NormalizedProfile {
    /// Creates an empty profile scoped to `inventory`.
    pub fn empty(inventory: impl Into<String>) -> Self {
        Self {
            inventory: inventory.into(),
            traits: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    /// Returns the record for `trait_id`, if present.
    pub fn get(&self, trait_id: &str) -> Option<&TraitScore> {
        self.traits.iter().find(|t| t.trait_id == trait_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TraitScore> {
        self.traits.iter()
    }
}

/// A named text sample waiting to be scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub name: String,
    pub text: String,
}

impl Sample {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// A scored sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub text: String,
    pub profile: NormalizedProfile,
}

/// One entry of the inventory listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryDescriptor {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl fmt::Display for InventoryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)?;
        if let Some(ref name) = self.name {
            write!(f, " ({})", name)?;
        }
        Ok(())
    }
}

/// One row of a comparison table.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub name: String,
    /// Cells aligned with the table's trait columns. `None` means missing.
    pub values: Vec<Option<f64>>,
}

/// Scores of several subjects side by side, one row per subject name.
///
/// Trait columns appear in the order they were first seen. A subject that
/// lacks a trait has a missing cell, not a zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonTable {
    inventory: String,
    traits: Vec<String>,
    rows: Vec<ComparisonRow>,
}

/// Name of the key column in every export.
pub const NAME_COLUMN: &str = "name";

impl ComparisonTable {
    pub(crate) fn new(inventory: String, traits: Vec<String>, rows: Vec<ComparisonRow>) -> Self {
        Self {
            inventory,
            traits,
            rows,
        }
    }

    pub fn inventory(&self) -> &str {
        &self.inventory
    }

    /// All columns, starting with `name`.
    pub fn columns(&self) -> Vec<&str> {
        std::iter::once(NAME_COLUMN)
            .chain(self.traits.iter().map(String::as_str))
            .collect()
    }

    /// Trait columns only.
    pub fn trait_columns(&self) -> &[String] {
        &self.traits
    }

    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    pub fn row_names(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, name: &str) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    /// Reads the cell at (`name`, `trait_id`).
    pub fn get(&self, name: &str, trait_id: &str) -> Option<f64> {
        let col = self.traits.iter().position(|t| t == trait_id)?;
        self.row(name)?.values.get(col).copied().flatten()
    }

    /// Row-oriented export: one object per row with `name` and every trait
    /// column. Missing cells are `null`.
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = Map::new();
                record.insert(NAME_COLUMN.to_string(), Value::from(row.name.as_str()));
                for (trait_id, value) in self.traits.iter().zip(&row.values) {
                    record.insert(trait_id.clone(), cell_to_json(*value));
                }
                record
            })
            .collect()
    }

    /// Column-oriented export: column name mapped to its values in row order.
    pub fn to_columns(&self) -> Map<String, Value> {
        let mut columns = Map::new();
        columns.insert(
            NAME_COLUMN.to_string(),
            Value::Array(
                self.rows
                    .iter()
                    .map(|r| Value::from(r.name.as_str()))
                    .collect(),
            ),
        );
        for (col, trait_id) in self.traits.iter().enumerate() {
            let values = self
                .rows
                .iter()
                .map(|r| cell_to_json(r.values.get(col).copied().flatten()))
                .collect();
            columns.insert(trait_id.clone(), Value::Array(values));
        }
        columns
    }
}

fn cell_to_json(value: Option<f64>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}

/// Highest scorer for one trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitLeader {
    #[serde(rename = "trait")]
    pub trait_id: String,
    pub subject: String,
    pub score: f64,
}

impl fmt::Display for TraitLeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({:.2})",
            capitalize(&self.trait_id),
            self.subject,
            self.score
        )
    }
}

/// Metadata about a comparison report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Inventory the subjects were compared on.
    pub inventory: String,
    /// API root the scores came from.
    pub base_url: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of samples scored.
    pub samples_scored: usize,
    /// Wall-clock time spent scoring, in seconds.
    pub duration_seconds: f64,
}

/// Everything a comparison report renders.
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub metadata: ReportMetadata,
    pub subjects: Vec<Subject>,
    pub table: ComparisonTable,
    pub leaders: Vec<TraitLeader>,
}

impl ComparisonReport {
    /// Builds the table and leaders for `subjects`.
    pub fn build(metadata: ReportMetadata, subjects: Vec<Subject>) -> Self {
        let table = crate::analysis::compare(&subjects, &metadata.inventory);
        let leaders = crate::analysis::argmax_per_trait(&table);
        Self {
            metadata,
            subjects,
            table,
            leaders,
        }
    }
}

/// Uppercases the first character, e.g. `openness` -> `Openness`.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
