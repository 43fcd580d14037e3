//! # neural-gallery
//!
//! Image generation job orchestration with a deduplicated SQLite artifact
//! gallery.
//!
//! The crate covers the full pipeline from prompt to persisted image: submit
//! a [`GenerationRequest`] to a remote generation service, wait for the
//! order with live progress estimation, download the resulting preview and
//! full-resolution bytes, and persist them into an [`ArtifactStore`] that
//! deduplicates by caption and notifies observers of changes.
//!
//! ## Features
//!
//! - One-job-at-a-time orchestration with a real state machine
//!   (Idle / Submitting / Waiting / Downloading)
//! - Progress estimation on a steady tick plus genuine completion polling
//! - SQLite persistence (WAL) with an atomic per-caption dedup guarantee
//! - Re-pullable ordered [`LiveQuery`] over the stored artifacts
//! - Single-subscriber [`Observable`] cells for decoupled state propagation
//! - Partial-failure downloads: one bad output never aborts the batch
//!
//! ## Quick Start
//!
//! ```no_run
//! use neural_gallery::{
//!     ArtifactFilter, ArtifactSort, ArtifactStore, GenerationRequest, JobOrchestrator,
//!     NeuralClient, OrchestratorConfig,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(ArtifactStore::open(Some("gallery.db".as_ref()))?);
//! let client = NeuralClient::new("https://api.example.com/v1");
//! let orchestrator = JobOrchestrator::new(client, Arc::clone(&store), OrchestratorConfig::default());
//!
//! // Observe progress and completion.
//! orchestrator.progress_text().subscribe(|t| println!("progress: {}", t));
//! orchestrator.on_complete(|summary| println!("saved {} images", summary.saved));
//!
//! let request = GenerationRequest::new("a sunset over mountains")
//!     .with_style("Painting")
//!     .with_amount("4");
//! orchestrator.submit(&request).await?;
//!
//! // Browse what was persisted.
//! let mut query = store.open_live_query(ArtifactSort::CreatedDesc, ArtifactFilter::All);
//! query.refresh()?;
//! for i in 0..query.count() {
//!     println!("{}", query.record_at(i).unwrap().caption);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod observable;
pub mod orchestrator;
pub mod selection;
pub mod store;
pub mod types;

pub use client::{GenerationClient, NeuralClient};
pub use config::{OrchestratorConfig, OrchestratorConfigBuilder};
pub use error::{ClientError, JobError, StoreError};
pub use observable::Observable;
pub use orchestrator::JobOrchestrator;
pub use selection::Selection;
pub use store::{ArtifactStore, LiveQuery};
pub use types::{
    ArtifactFilter, ArtifactRecord, ArtifactSort, GenerationRequest, JobPhase, JobProgress,
    JobSummary, OrderStatus, OutputDescriptor, OutputFailure, AMOUNT_OPTIONS, LAYOUT_OPTIONS,
    STYLE_OPTIONS,
};
