//! Markdown and JSON report generation.
//!
//! This module renders scored profiles, the comparison table and the
//! per-trait leaders, with optional text bar charts.

use crate::analysis::{most_divergent_traits, trait_means};
use crate::models::{
    capitalize, ComparisonReport, ComparisonTable, NormalizedProfile, ReportMetadata, Subject,
    TraitLeader,
};
use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};

/// Chart axis runs from -CHART_RANGE to +CHART_RANGE.
pub const CHART_RANGE: f64 = 1.5;

const POSITIVE_BAR: char = '█';
const NEGATIVE_BAR: char = '░';
const MISSING_CELL: &str = "—";

/// Rendering switches for reports.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub include_charts: bool,
    /// Characters per half of a bar chart.
    pub chart_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_charts: true,
            chart_width: 20,
        }
    }
}

impl From<&crate::config::ReportConfig> for RenderOptions {
    fn from(config: &crate::config::ReportConfig) -> Self {
        Self {
            include_charts: config.include_charts,
            chart_width: config.chart_width.max(1),
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &ComparisonReport, options: &RenderOptions) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "# {} Personality Comparison\n\n",
        report.metadata.inventory.to_uppercase()
    ));

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents(report));
    output.push_str(&generate_comparison_section(&report.table));
    output.push_str(&generate_leaders_section(&report.leaders));
    output.push_str(&generate_statistics_section(&report.table));

    output.push_str("## Profiles\n\n");
    for subject in &report.subjects {
        output.push_str(&generate_subject_section(subject, options));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Inventory:** `{}`\n", metadata.inventory));
    section.push_str(&format!("- **API:** {}\n", metadata.base_url));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Samples Scored:** {}\n", metadata.samples_scored));
    section.push_str(&format!(
        "- **Scoring Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(report: &ComparisonReport) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Comparison](#comparison)\n");
    if !report.leaders.is_empty() {
        toc.push_str("- [Highest Scorers](#highest-scorers)\n");
        toc.push_str("- [Statistics](#statistics)\n");
    }
    toc.push_str("- [Profiles](#profiles)\n");

    for subject in &report.subjects {
        toc.push_str(&format!("  - [{}](#{})\n", subject.name, anchor(&subject.name)));
    }

    toc.push('\n');

    toc
}

/// Generate the comparison table section.
pub fn generate_comparison_section(table: &ComparisonTable) -> String {
    let mut section = String::new();

    section.push_str("## Comparison\n\n");

    if table.is_empty() {
        section.push_str("No subjects were scored.\n\n");
        return section;
    }

    let header: Vec<String> = table.columns().iter().map(|c| escape_cell(c)).collect();
    section.push_str(&format!("| {} |\n", header.join(" | ")));
    section.push_str("|:---|");
    section.push_str(&"---:|".repeat(table.trait_columns().len()));
    section.push('\n');

    for row in table.rows() {
        let cells: Vec<String> = row.values.iter().map(|v| format_cell(*v)).collect();
        if cells.is_empty() {
            section.push_str(&format!("| {} |\n", escape_cell(&row.name)));
        } else {
            section.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(&row.name),
                cells.join(" | ")
            ));
        }
    }
    section.push('\n');

    section
}

/// Generate the highest-scorer section.
fn generate_leaders_section(leaders: &[TraitLeader]) -> String {
    if leaders.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Highest Scorers\n\n");
    for leader in leaders {
        section.push_str(&format!("- {}\n", leader));
    }
    section.push('\n');

    section
}

/// Generate trait averages and the traits people disagree on most.
fn generate_statistics_section(table: &ComparisonTable) -> String {
    let means = trait_means(table);
    if means.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Statistics\n\n");
    section.push_str("| Trait | Mean |\n");
    section.push_str("|:---|---:|\n");
    for (trait_id, mean) in &means {
        section.push_str(&format!("| {} | {:+.2} |\n", escape_cell(trait_id), mean));
    }
    section.push('\n');

    if table.len() > 1 {
        let divergent = most_divergent_traits(table, 3);
        section.push_str("### Largest Differences\n\n");
        for (trait_id, spread) in divergent {
            section.push_str(&format!("- {}: spread {:.2}\n", capitalize(&trait_id), spread));
        }
        section.push('\n');
    }

    section
}

/// Generate the section for one subject.
fn generate_subject_section(subject: &Subject, options: &RenderOptions) -> String {
    let mut section = String::new();

    section.push_str(&format!("### {}\n\n", subject.name));
    section.push_str(&format!("> {}\n\n", subject.text.replace('\n', " ")));
    section.push_str(&generate_profile_table(&subject.profile));

    if options.include_charts && !subject.profile.is_empty() {
        section.push_str("```text\n");
        section.push_str(&render_bar_chart(&subject.profile, options.chart_width));
        section.push_str("```\n\n");
    }

    section
}

/// Render one profile as a Markdown table.
pub fn generate_profile_table(profile: &NormalizedProfile) -> String {
    if profile.is_empty() {
        return format!("*No `{}` scores returned.*\n\n", profile.inventory);
    }

    let mut table = String::new();

    table.push_str("| Trait | Score | Quantile | Confidence | Confidence Text |\n");
    table.push_str("|:---|---:|---:|---:|:---|\n");
    for score in profile.iter() {
        table.push_str(&format!(
            "| {} | {:+.2} | {} | {} | {} |\n",
            escape_cell(&score.trait_id),
            score.score,
            format_cell(score.quantile),
            format_cell(score.confidence),
            escape_cell(score.confidence_text.as_deref().unwrap_or(MISSING_CELL))
        ));
    }
    table.push('\n');

    table
}

/// Render a horizontal bar chart centred on zero.
///
/// Positive scores grow to the right with solid bars, negative scores to the
/// left with shaded bars. Scores are clamped to the chart range.
pub fn render_bar_chart(profile: &NormalizedProfile, width: usize) -> String {
    let label_width = profile
        .iter()
        .map(|t| t.trait_id.chars().count())
        .max()
        .unwrap_or(0);

    let mut chart = String::new();
    for score in profile.iter() {
        let clamped = score.score.clamp(-CHART_RANGE, CHART_RANGE);
        let len = ((clamped.abs() / CHART_RANGE) * width as f64).round() as usize;

        let (left, right) = if score.is_positive() {
            (" ".repeat(width), POSITIVE_BAR.to_string().repeat(len))
        } else {
            (
                format!("{}{}", " ".repeat(width - len), NEGATIVE_BAR.to_string().repeat(len)),
                String::new(),
            )
        };

        let line = format!(
            "{:<label_width$} {}|{:<width$} {:+.2}",
            score.trait_id, left, right, score.score
        );
        chart.push_str(line.trim_end());
        chart.push('\n');
    }

    chart
}

fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => MISSING_CELL.to_string(),
    }
}

/// Pipes would otherwise split a table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Heading slug as GitHub builds it: lowercase, punctuation dropped,
/// spaces turned into hyphens.
fn anchor(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c),
            _ => None,
        })
        .collect()
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Scores provided by the [Sentino API](https://sentino.org)*\n");

    footer
}

/// Serialized shape of a JSON report.
#[derive(Serialize)]
struct JsonReport<'a> {
    metadata: &'a ReportMetadata,
    columns: Vec<&'a str>,
    rows: Vec<Map<String, Value>>,
    leaders: &'a [TraitLeader],
    subjects: &'a [Subject],
}

/// Generate a JSON report.
pub fn generate_json_report(report: &ComparisonReport) -> Result<String> {
    let json_report = JsonReport {
        metadata: &report.metadata,
        columns: report.table.columns(),
        rows: report.table.to_records(),
        leaders: &report.leaders,
        subjects: &report.subjects,
    };
    serde_json::to_string_pretty(&json_report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TraitScore;
    use chrono::Utc;
    use serde_json::json;

    fn create_subject(name: &str, scores: &[(&str, f64)]) -> Subject {
        Subject {
            name: name.to_string(),
            text: format!("Sample text from {}", name),
            profile: NormalizedProfile {
                inventory: "big5".to_string(),
                traits: scores.iter().map(|(t, s)| TraitScore::new(*t, *s)).collect(),
            },
        }
    }

    fn create_test_report() -> ComparisonReport {
        let metadata = ReportMetadata {
            inventory: "big5".to_string(),
            base_url: "https://api.sentino.org/api".to_string(),
            generated_at: Utc::now(),
            samples_scored: 2,
            duration_seconds: 1.5,
        };

        ComparisonReport::build(
            metadata,
            vec![
                create_subject("A", &[("extraversion", 0.8)]),
                create_subject("B", &[("extraversion", 0.8), ("openness", -0.3)]),
            ],
        )
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report, &RenderOptions::default());

        assert!(markdown.contains("# BIG5 Personality Comparison"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Comparison"));
        assert!(markdown.contains("| name | extraversion | openness |"));
        assert!(markdown.contains("| A | 0.80 | — |"));
        assert!(markdown.contains("| B | 0.80 | -0.30 |"));
        assert!(markdown.contains("- Extraversion: A (0.80)"));
        assert!(markdown.contains("- Openness: B (-0.30)"));
        assert!(markdown.contains("### A"));
        assert!(markdown.contains("```text"));
    }

    #[test]
    fn test_charts_can_be_disabled() {
        let report = create_test_report();
        let options = RenderOptions {
            include_charts: false,
            ..RenderOptions::default()
        };
        let markdown = generate_markdown_report(&report, &options);
        assert!(!markdown.contains("```text"));
    }

    #[test]
    fn test_empty_comparison() {
        let table = crate::analysis::compare(&[], "big5");
        let section = generate_comparison_section(&table);
        assert!(section.contains("No subjects were scored."));
    }

    #[test]
    fn test_profile_table_marks_missing() {
        let mut score = TraitScore::new("openness", 0.25);
        score.quantile = Some(0.61);
        let profile = NormalizedProfile {
            inventory: "big5".to_string(),
            traits: vec![score],
        };

        let table = generate_profile_table(&profile);
        assert!(table.contains("| openness | +0.25 | 0.61 | — | — |"));

        let empty = generate_profile_table(&NormalizedProfile::empty("neo"));
        assert!(empty.contains("No `neo` scores returned."));
    }

    #[test]
    fn test_pipes_escaped_in_tables() {
        let subjects = vec![create_subject("Ann|Bo", &[("open|ness", 0.5)])];
        let table = crate::analysis::compare(&subjects, "big5");

        let section = generate_comparison_section(&table);
        assert!(section.contains("| name | open\\|ness |"));
        assert!(section.contains("| Ann\\|Bo | 0.50 |"));

        let profile = generate_profile_table(&subjects[0].profile);
        assert!(profile.contains("| open\\|ness | +0.50 |"));
    }

    #[test]
    fn test_anchor_matches_github_slugs() {
        assert_eq!(anchor("Dr. Jane Doe"), "dr-jane-doe");
        assert_eq!(anchor("R&D / Ops"), "rd--ops");
        assert_eq!(anchor("snake_case-name"), "snake_case-name");
    }

    #[test]
    fn test_render_bar_chart() {
        let profile = NormalizedProfile {
            inventory: "big5".to_string(),
            traits: vec![
                TraitScore::new("openness", 0.75),
                TraitScore::new("neuroticism", -1.5),
                TraitScore::new("agreeableness", 3.0),
            ],
        };

        let chart = render_bar_chart(&profile, 10);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 3);

        // 0.75 of 1.5 is half of the 10-character half width
        assert!(lines[0].starts_with("openness      "));
        assert!(lines[0].contains(&format!("|{}", "█".repeat(5))));
        assert!(lines[0].ends_with("+0.75"));

        assert!(lines[1].contains(&format!("{}|", "░".repeat(10))));
        assert!(lines[1].ends_with("-1.50"));

        // Clamped to the chart range
        assert!(lines[2].contains(&format!("|{} ", "█".repeat(10))));
        assert!(lines[2].ends_with("+3.00"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["columns"], json!(["name", "extraversion", "openness"]));
        assert_eq!(value["rows"][0]["name"], "A");
        assert!(value["rows"][0]["openness"].is_null());
        assert_eq!(value["leaders"][1]["subject"], "B");
        assert_eq!(value["leaders"][1]["trait"], "openness");
        assert_eq!(value["metadata"]["inventory"], "big5");
        assert_eq!(value["subjects"][1]["profile"]["traits"][1]["score"], -0.3);
    }
}
