//! Cross-subject comparison and statistics.
//!
//! This module builds comparison tables from scored subjects and computes
//! per-trait summaries over them.

use crate::models::{ComparisonRow, ComparisonTable, Subject, TraitLeader};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Build a comparison table for `inventory`.
///
/// Rows follow subject order and trait columns follow first-seen order.
/// Subjects sharing a name collapse into one row at the position of the
/// first occurrence, holding only the last subject's values.
pub fn compare(subjects: &[Subject], inventory: &str) -> ComparisonTable {
    let mut traits: Vec<String> = Vec::new();
    let mut trait_index: HashMap<String, usize> = HashMap::new();
    let mut row_order: Vec<String> = Vec::new();
    let mut cells: HashMap<String, HashMap<usize, f64>> = HashMap::new();

    for subject in subjects {
        if subject.profile.inventory != inventory && !subject.profile.is_empty() {
            warn!(
                "Profile for {} is scored on {}, not {}",
                subject.name, subject.profile.inventory, inventory
            );
        }

        if cells.contains_key(&subject.name) {
            warn!(
                "Duplicate subject name {}; later scores replace earlier ones",
                subject.name
            );
        } else {
            row_order.push(subject.name.clone());
        }
        let row = cells.entry(subject.name.clone()).or_default();
        row.clear();

        for score in subject.profile.iter() {
            let col = *trait_index
                .entry(score.trait_id.clone())
                .or_insert_with(|| {
                    traits.push(score.trait_id.clone());
                    traits.len() - 1
                });
            row.insert(col, score.score);
        }
    }

    let rows = row_order
        .into_iter()
        .map(|name| {
            let row_cells = cells.remove(&name).unwrap_or_default();
            let values = (0..traits.len()).map(|col| row_cells.get(&col).copied()).collect();
            ComparisonRow { name, values }
        })
        .collect::<Vec<_>>();

    debug!(
        "Built comparison table: {} rows x {} traits",
        rows.len(),
        traits.len()
    );

    ComparisonTable::new(inventory.to_string(), traits, rows)
}

/// Highest scorer for every trait column, in column order.
///
/// Ties go to the subject appearing first in row order. Traits with no
/// values at all are left out.
pub fn argmax_per_trait(table: &ComparisonTable) -> Vec<TraitLeader> {
    table
        .trait_columns()
        .iter()
        .enumerate()
        .filter_map(|(col, trait_id)| {
            let mut best: Option<(&str, f64)> = None;
            for row in table.rows() {
                let Some(score) = row.values.get(col).copied().flatten() else {
                    continue;
                };
                match best {
                    Some((_, top)) if score <= top => {}
                    _ => best = Some((row.name.as_str(), score)),
                }
            }
            best.map(|(subject, score)| TraitLeader {
                trait_id: trait_id.clone(),
                subject: subject.to_string(),
                score,
            })
        })
        .collect()
}

/// Mean score per trait over the subjects that have it, in column order.
pub fn trait_means(table: &ComparisonTable) -> Vec<(String, f64)> {
    table
        .trait_columns()
        .iter()
        .enumerate()
        .filter_map(|(col, trait_id)| {
            let present: Vec<f64> = table
                .rows()
                .iter()
                .filter_map(|r| r.values.get(col).copied().flatten())
                .collect();
            if present.is_empty() {
                None
            } else {
                let mean = present.iter().sum::<f64>() / present.len() as f64;
                Some((trait_id.clone(), mean))
            }
        })
        .collect()
}

/// Traits where the gap between the highest and lowest scorer is largest.
pub fn most_divergent_traits(table: &ComparisonTable, n: usize) -> Vec<(String, f64)> {
    let mut spreads: Vec<(String, f64)> = table
        .trait_columns()
        .iter()
        .enumerate()
        .filter_map(|(col, trait_id)| {
            let present = table
                .rows()
                .iter()
                .filter_map(|r| r.values.get(col).copied().flatten());
            let (min, max) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
            (min <= max).then(|| (trait_id.clone(), max - min))
        })
        .collect();

    // Stable sort keeps column order among equal spreads
    spreads.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    spreads.truncate(n);
    spreads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NormalizedProfile, TraitScore};

    fn create_subject(name: &str, scores: &[(&str, f64)]) -> Subject {
        Subject {
            name: name.to_string(),
            text: format!("text of {}", name),
            profile: NormalizedProfile {
                inventory: "big5".to_string(),
                traits: scores
                    .iter()
                    .map(|(t, s)| TraitScore::new(*t, *s))
                    .collect(),
            },
        }
    }

    #[test]
    fn test_compare_concrete_scenario() {
        let subjects = vec![
            create_subject("A", &[("extraversion", 0.8)]),
            create_subject("B", &[("extraversion", 0.8), ("openness", -0.3)]),
        ];

        let table = compare(&subjects, "big5");

        assert_eq!(table.columns(), vec!["name", "extraversion", "openness"]);
        assert_eq!(table.row_names(), vec!["A", "B"]);
        assert_eq!(table.get("A", "extraversion"), Some(0.8));
        assert_eq!(table.get("A", "openness"), None);
        assert_eq!(table.get("B", "extraversion"), Some(0.8));
        assert_eq!(table.get("B", "openness"), Some(-0.3));

        let leaders = argmax_per_trait(&table);
        assert_eq!(
            leaders,
            vec![
                TraitLeader {
                    trait_id: "extraversion".to_string(),
                    subject: "A".to_string(),
                    score: 0.8,
                },
                TraitLeader {
                    trait_id: "openness".to_string(),
                    subject: "B".to_string(),
                    score: -0.3,
                },
            ]
        );
    }

    #[test]
    fn test_compare_empty() {
        let table = compare(&[], "big5");
        assert!(table.is_empty());
        assert_eq!(table.columns(), vec!["name"]);
        assert!(argmax_per_trait(&table).is_empty());
    }

    #[test]
    fn test_cells_round_trip_profiles() {
        let subjects = vec![
            create_subject("Alex", &[("openness", 0.3), ("neuroticism", -0.1)]),
            create_subject("Sam", &[("neuroticism", 0.5), ("agreeableness", 0.2)]),
            create_subject("Jordan", &[]),
        ];

        let table = compare(&subjects, "big5");

        assert_eq!(table.len(), 3);
        for subject in &subjects {
            for score in subject.profile.iter() {
                assert_eq!(table.get(&subject.name, &score.trait_id), Some(score.score));
            }
        }
        assert_eq!(
            table.trait_columns(),
            &["openness", "neuroticism", "agreeableness"]
        );
        assert_eq!(table.row("Jordan").unwrap().values, vec![None, None, None]);
    }

    #[test]
    fn test_argmax_tie_goes_to_first_subject() {
        let subjects = vec![
            create_subject("First", &[("openness", 0.2)]),
            create_subject("Second", &[("openness", 0.5)]),
            create_subject("Third", &[("openness", 0.5)]),
        ];

        let leaders = argmax_per_trait(&compare(&subjects, "big5"));
        assert_eq!(leaders.len(), 1);
        assert_eq!(leaders[0].subject, "Second");
    }

    #[test]
    fn test_argmax_all_negative() {
        let subjects = vec![
            create_subject("A", &[("neuroticism", -0.9)]),
            create_subject("B", &[("neuroticism", -0.2)]),
        ];

        let leaders = argmax_per_trait(&compare(&subjects, "big5"));
        assert_eq!(leaders[0].subject, "B");
        assert_eq!(leaders[0].score, -0.2);
    }

    #[test]
    fn test_duplicate_names_overwrite() {
        let subjects = vec![
            create_subject("A", &[("openness", 0.1), ("extraversion", 0.4)]),
            create_subject("B", &[("openness", 0.2)]),
            create_subject("A", &[("openness", 0.9), ("agreeableness", -0.5)]),
        ];

        let table = compare(&subjects, "big5");

        assert_eq!(table.row_names(), vec!["A", "B"]);
        assert_eq!(
            table.trait_columns(),
            &["openness", "extraversion", "agreeableness"]
        );
        assert_eq!(table.get("A", "openness"), Some(0.9));
        assert_eq!(table.get("A", "extraversion"), None);
        assert_eq!(table.get("A", "agreeableness"), Some(-0.5));
        assert_eq!(table.get("B", "openness"), Some(0.2));
    }

    #[test]
    fn test_duplicate_name_with_fewer_traits() {
        let subjects = vec![
            create_subject("A", &[("openness", 0.1), ("extraversion", 0.4)]),
            create_subject("A", &[("openness", 0.9)]),
        ];

        let table = compare(&subjects, "big5");
        assert_eq!(table.len(), 1);
        assert_eq!(table.trait_columns(), &["openness", "extraversion"]);
        assert_eq!(table.get("A", "openness"), Some(0.9));
        assert_eq!(table.get("A", "extraversion"), None);
    }

    #[test]
    fn test_other_inventory_profiles_keep_their_row() {
        let mut other = create_subject("B", &[("anxiety", 0.3)]);
        other.profile.inventory = "neo".to_string();
        let subjects = vec![create_subject("A", &[("openness", 0.1)]), other];

        let table = compare(&subjects, "big5");
        assert_eq!(table.len(), 2);
        assert_eq!(table.row_names(), vec!["A", "B"]);
        assert_eq!(table.trait_columns(), &["openness", "anxiety"]);
        assert_eq!(table.get("B", "anxiety"), Some(0.3));
        assert_eq!(table.get("B", "openness"), None);
    }

    #[test]
    fn test_trait_means_ignore_missing() {
        let subjects = vec![
            create_subject("A", &[("openness", 0.2), ("extraversion", 1.0)]),
            create_subject("B", &[("openness", 0.4)]),
        ];

        let means = trait_means(&compare(&subjects, "big5"));
        assert_eq!(means.len(), 2);
        assert!((means[0].1 - 0.3).abs() < 1e-9);
        assert_eq!(means[1], ("extraversion".to_string(), 1.0));
    }

    #[test]
    fn test_most_divergent_traits() {
        let subjects = vec![
            create_subject("A", &[("openness", 0.0), ("neuroticism", -1.0)]),
            create_subject("B", &[("openness", 0.1), ("neuroticism", 1.0)]),
        ];

        let divergent = most_divergent_traits(&compare(&subjects, "big5"), 1);
        assert_eq!(divergent.len(), 1);
        assert_eq!(divergent[0].0, "neuroticism");
        assert!((divergent[0].1 - 2.0).abs() < 1e-9);
    }
}
