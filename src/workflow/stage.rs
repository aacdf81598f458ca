//! Canonical workflow stages and the raw-status vocabulary

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Canonical workflow stage used for duration math.
///
/// Raw tracker statuses are arbitrarily named per tenant; the classifier maps
/// them onto this fixed set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum WorkflowStage {
    ReadyForGrooming,
    ReadyForDev,
    InProgress,
    InReview,
    InQa,
    ReadyForRelease,
    Blocked,
    Done,
}

/// First-vs-last arrival policy for a stage's canonical timestamp.
///
/// Grooming/progress/review capture the first meaningful entry; QA and Done
/// capture the final entry after rework. The policies are deliberately not
/// uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrivalPolicy {
    /// Keep the first occurrence; re-entries do not move the timestamp
    First,
    /// A later occurrence supersedes earlier ones
    Last,
}

impl WorkflowStage {
    /// Arrival policy for this stage's timestamp slot
    pub fn arrival_policy(&self) -> ArrivalPolicy {
        match self {
            WorkflowStage::InQa | WorkflowStage::Done => ArrivalPolicy::Last,
            _ => ArrivalPolicy::First,
        }
    }
}

/// Data-driven mapping from canonical stages to recognized raw status strings.
///
/// The built-in table covers the default tracker vocabulary; tenants with
/// custom workflows extend or replace per-stage lists through configuration
/// instead of code changes. All entries are stored lowercase and matched
/// case-insensitively.
///
/// "ready for release" is intentionally a member of both `ReadyForRelease` and
/// `Done`: a transition to that status counts toward both stages. Duration
/// math only reads `Done`; `ReadyForRelease` exists for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageVocabulary {
    synonyms: HashMap<WorkflowStage, Vec<String>>,
}

impl Default for StageVocabulary {
    fn default() -> Self {
        let mut vocab = Self {
            synonyms: HashMap::new(),
        };
        vocab.set(WorkflowStage::ReadyForGrooming, &["ready for grooming"]);
        vocab.set(WorkflowStage::ReadyForDev, &["ready for dev"]);
        vocab.set(
            WorkflowStage::InProgress,
            &["in progress", "dev in progress", "in development"],
        );
        vocab.set(
            WorkflowStage::InReview,
            &["in review", "in code review (pr submitted)"],
        );
        vocab.set(WorkflowStage::InQa, &["in qa", "dev test", "in testing"]);
        vocab.set(
            WorkflowStage::ReadyForRelease,
            &["ready for release", "ready for tranche 0"],
        );
        vocab.set(WorkflowStage::Blocked, &["blocked", "blocked / on hold"]);
        vocab.set(WorkflowStage::Done, &["done", "ready for release"]);
        vocab
    }
}

impl StageVocabulary {
    /// Replace the recognized raw values for a stage
    pub fn set(&mut self, stage: WorkflowStage, raw_values: &[&str]) {
        self.synonyms
            .insert(stage, raw_values.iter().map(|v| v.to_lowercase()).collect());
    }

    /// Add recognized raw values to a stage, keeping existing ones
    pub fn extend(&mut self, stage: WorkflowStage, raw_values: &[&str]) {
        let entry = self.synonyms.entry(stage).or_default();
        for value in raw_values {
            let lowered = value.to_lowercase();
            if !entry.contains(&lowered) {
                entry.push(lowered);
            }
        }
    }

    /// Recognized raw values for a stage (lowercase)
    pub fn recognized(&self, stage: WorkflowStage) -> &[String] {
        self.synonyms.get(&stage).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether a raw status string belongs to a stage (case-insensitive)
    pub fn matches(&self, stage: WorkflowStage, raw_status: &str) -> bool {
        let lowered = raw_status.trim().to_lowercase();
        self.recognized(stage).iter().any(|v| *v == lowered)
    }
}

/// Maps raw status strings to canonical workflow stages.
#[derive(Debug, Clone, Default)]
pub struct StageClassifier {
    vocabulary: StageVocabulary,
}

impl StageClassifier {
    /// Create a classifier over a vocabulary
    pub fn new(vocabulary: StageVocabulary) -> Self {
        Self { vocabulary }
    }

    /// The vocabulary backing this classifier
    pub fn vocabulary(&self) -> &StageVocabulary {
        &self.vocabulary
    }

    /// Classify a raw status string.
    ///
    /// Returns every stage the status belongs to: usually one, two for the
    /// shared "ready for release" status, empty when unrecognized.
    /// Unrecognized values are not an error; callers skip them.
    pub fn classify(&self, raw_status: &str) -> Vec<WorkflowStage> {
        WorkflowStage::iter()
            .filter(|stage| self.vocabulary.matches(*stage, raw_status))
            .collect()
    }

    /// Whether a raw status belongs to the given stage
    pub fn matches(&self, stage: WorkflowStage, raw_status: &str) -> bool {
        self.vocabulary.matches(stage, raw_status)
    }
}
