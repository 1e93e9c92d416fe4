//! Batch scoring of named text samples.
//!
//! Samples are scored and normalized in input order. The first failure
//! aborts the batch; no partial results are returned.

use crate::analysis::{normalize, normalize_strict};
use crate::client::{Scorer, Transport};
use crate::error::Result;
use crate::models::{Sample, Subject};
use anyhow::Context;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, info};

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Fail a sample whose result lacks the inventory instead of using an
    /// empty profile.
    pub strict_inventory: bool,
    /// Maximum requests in flight. `1` scores strictly one after another.
    pub concurrency: usize,
    /// Draw a progress bar on stderr.
    pub show_progress: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            strict_inventory: false,
            concurrency: 1,
            show_progress: false,
        }
    }
}

/// Scores samples through a [`Scorer`].
pub struct BatchRunner<'a, T> {
    scorer: &'a Scorer<T>,
    options: BatchOptions,
}

impl<'a, T: Transport> BatchRunner<'a, T> {
    pub fn new(scorer: &'a Scorer<T>, options: BatchOptions) -> Self {
        Self { scorer, options }
    }

    /// Score every sample against `inventory`.
    ///
    /// Subjects come back in input order regardless of concurrency.
    pub async fn run(&self, samples: &[Sample], inventory: &str) -> Result<Vec<Subject>> {
        let concurrency = self.options.concurrency.max(1);
        info!(
            "Scoring {} samples against {} (concurrency {})",
            samples.len(),
            inventory,
            concurrency
        );

        let progress = self
            .options
            .show_progress
            .then(|| progress_bar(samples.len() as u64));

        let mut pending = std::pin::pin!(stream::iter(
            samples
                .iter()
                .map(|sample| self.score_sample(sample, inventory))
        )
        .buffered(concurrency));

        let mut subjects = Vec::with_capacity(samples.len());
        while let Some(subject) = pending.next().await {
            let subject = match subject {
                Ok(subject) => subject,
                Err(e) => {
                    if let Some(ref pb) = progress {
                        pb.abandon_with_message("Batch failed");
                    }
                    return Err(e);
                }
            };
            if let Some(ref pb) = progress {
                pb.set_message(subject.name.clone());
                pb.inc(1);
            }
            subjects.push(subject);
        }

        if let Some(pb) = progress {
            pb.finish_with_message("Scoring complete");
        }

        Ok(subjects)
    }

    async fn score_sample(&self, sample: &Sample, inventory: &str) -> Result<Subject> {
        debug!("Scoring sample {}", sample.name);
        let result = self
            .scorer
            .score(&sample.text, &[inventory.to_string()])
            .await?;

        let profile = if self.options.strict_inventory {
            normalize_strict(&result, inventory)?
        } else {
            normalize(&result, inventory)
        };

        Ok(Subject {
            name: sample.name.clone(),
            text: sample.text.clone(),
            profile,
        })
    }
}

/// Score samples one after another.
pub async fn run_batch<T: Transport>(
    scorer: &Scorer<T>,
    samples: &[Sample],
    inventory: &str,
) -> Result<Vec<Subject>> {
    BatchRunner::new(scorer, BatchOptions::default())
        .run(samples, inventory)
        .await
}

/// Score samples with up to `concurrency` requests in flight.
pub async fn run_batch_concurrent<T: Transport>(
    scorer: &Scorer<T>,
    samples: &[Sample],
    inventory: &str,
    concurrency: usize,
) -> Result<Vec<Subject>> {
    let options = BatchOptions {
        concurrency,
        ..BatchOptions::default()
    };
    BatchRunner::new(scorer, options).run(samples, inventory).await
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// Built-in demo subjects.
pub fn demo_samples() -> Vec<Sample> {
    vec![
        Sample::new(
            "Alex",
            "I love meeting new people and going to parties. Weekends are for \
             big gatherings with friends, and I am usually the one who organizes \
             them. I get restless when I spend too much time alone.",
        ),
        Sample::new(
            "Jordan",
            "I keep a detailed planner and I am always on time. Before starting a \
             project I write down every step and I rarely miss a deadline. \
             Clutter makes it hard for me to focus.",
        ),
        Sample::new(
            "Sam",
            "I spend most evenings reading about philosophy and painting. I enjoy \
             trying strange new foods and travelling to places I have never heard \
             of, though I sometimes worry about things that might go wrong.",
        ),
    ]
}

/// Load samples from a JSON file holding an array of `{name, text}` objects.
pub fn load_samples(path: &Path) -> anyhow::Result<Vec<Sample>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read samples file: {}", path.display()))?;

    let samples: Vec<Sample> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse samples file: {}", path.display()))?;

    Ok(samples)
}
