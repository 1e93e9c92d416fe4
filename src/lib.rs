//! Client for the Sentino personality scoring API.
//!
//! Text samples are scored over HTTP, parsed into typed trait scores,
//! lined up across subjects in a [`ComparisonTable`], and rendered as
//! Markdown or JSON reports.
//!
//! ```no_run
//! use sentino_client::client::{HttpTransport, Scorer, TransportConfig};
//! use sentino_client::{analysis, batch};
//!
//! # async fn demo() -> sentino_client::Result<()> {
//! let transport = HttpTransport::new(TransportConfig {
//!     token: Some("my-token".to_string()),
//!     ..TransportConfig::default()
//! })?;
//! let scorer = Scorer::new(transport);
//!
//! let subjects = batch::run_batch(&scorer, &batch::demo_samples(), "big5").await?;
//! let table = analysis::compare(&subjects, "big5");
//! for leader in analysis::argmax_per_trait(&table) {
//!     println!("{}", leader);
//! }
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod batch;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod report;

pub use error::{ClientError, Result};
pub use models::{
    ComparisonTable, InventoryDescriptor, NormalizedProfile, Sample, ScoringResult, Subject,
    TraitLeader, TraitScore,
};
