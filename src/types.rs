use serde::{Deserialize, Serialize};

/// Style options accepted by the generation service.
pub const STYLE_OPTIONS: [&str; 9] = [
    "Photo",
    "Fantasy",
    "Anime",
    "Painting",
    "Sci-Fi",
    "Cyberpunk",
    "Pixelart",
    "Steampunk",
    "Synthwave",
];

/// Layout options accepted by the generation service.
pub const LAYOUT_OPTIONS: [&str; 3] = ["Square", "Vertical", "Horizontal"];

/// Output-count options accepted by the generation service.
pub const AMOUNT_OPTIONS: [&str; 3] = ["4", "8", "12"];

/// Parameters for one generation order. Immutable once submitted.
///
/// `amount` is kept as the string the service expects; use
/// [`validate()`](Self::validate) before submission to reject values outside
/// the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub style: String,
    pub layout: String,
    pub amount: String,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            prompt: "a cat".to_string(),
            style: "Painting".to_string(),
            layout: "Square".to_string(),
            amount: "4".to_string(),
        }
    }
}

impl GenerationRequest {
    /// Create a request for the given prompt with default style/layout/amount.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Set the style (builder pattern).
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Set the layout (builder pattern).
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    /// Set the output count (builder pattern).
    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = amount.into();
        self
    }

    /// Check that the amount is one of the supported counts.
    pub fn validate(&self) -> bool {
        AMOUNT_OPTIONS.contains(&self.amount.as_str())
    }
}

/// One element of an order's result set, produced by the generation service.
///
/// `caption` is the natural key under which the artifact is persisted; the
/// URLs locate the preview and full-resolution bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDescriptor {
    pub caption: String,
    pub preview_url: String,
    pub full_url: String,
}

/// Snapshot of a remote order, as returned by a completion poll.
#[derive(Debug, Clone)]
pub struct OrderStatus {
    /// Whether the service has finished generating.
    pub completed: bool,
    /// Output descriptors. May be empty until `completed` is true.
    pub outputs: Vec<OutputDescriptor>,
}

/// A persisted generated artifact. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRecord {
    /// Unique key. At most one record exists per caption.
    pub caption: String,
    pub preview: Vec<u8>,
    pub full: Vec<u8>,
    /// RFC 3339 timestamp set at insertion.
    pub created_at: String,
}

/// Ordering for a live query over the artifact table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactSort {
    CreatedAsc,
    CreatedDesc,
    CaptionAsc,
    CaptionDesc,
}

/// Row filter for a live query over the artifact table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactFilter {
    All,
    CaptionContains(String),
}

/// Lifecycle phase of the orchestrator's current job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Idle,
    Submitting,
    Waiting,
    Downloading,
}

/// Derived progress snapshot for the job currently in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobProgress {
    /// Estimated completion fraction in `[0, 1]`.
    pub percent_complete: f32,
    pub is_complete: bool,
    /// Inverse of "a job is currently running".
    pub is_submittable: bool,
}

/// A single output that could not be downloaded or persisted.
#[derive(Debug, Clone)]
pub struct OutputFailure {
    pub caption: String,
    pub error: String,
}

/// Completion report for one generation job.
///
/// A job can complete with some outputs persisted and some failed; the
/// failures are listed here rather than aborting the batch.
#[derive(Debug, Clone)]
pub struct JobSummary {
    pub order_id: String,
    /// Number of output descriptors the order produced.
    pub total: usize,
    /// Outputs newly persisted to the store.
    pub saved: usize,
    /// Outputs skipped because their caption was already stored.
    pub duplicates: usize,
    pub failures: Vec<OutputFailure>,
}

impl JobSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}
