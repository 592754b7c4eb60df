//! Per-record batch execution.
//!
//! Applies one remote call per record and keeps every outcome, so a batch in
//! which some calls fail still reports exactly which records went through.

use futures::stream::{self, StreamExt};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

const DEFAULT_CONCURRENCY: usize = 4;

/// How a batch issues its calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BatchMode {
    /// One call at a time, in input order
    Sequential,
    /// At most `limit` calls in flight
    Concurrent { limit: usize },
}

impl Default for BatchMode {
    fn default() -> Self {
        Self::Sequential
    }
}

impl fmt::Display for BatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchMode::Sequential => write!(f, "sequential"),
            BatchMode::Concurrent { limit } => write!(f, "concurrent:{}", limit),
        }
    }
}

impl std::str::FromStr for BatchMode {
    type Err = String;

    /// Accepts `sequential`, `concurrent` or `concurrent:<limit>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "sequential" {
            return Ok(BatchMode::Sequential);
        }
        if s == "concurrent" {
            return Ok(BatchMode::Concurrent { limit: DEFAULT_CONCURRENCY });
        }
        if let Some(limit) = s.strip_prefix("concurrent:") {
            return match limit.parse::<usize>() {
                Ok(0) | Err(_) => Err(format!("invalid concurrency limit '{}'", limit)),
                Ok(limit) => Ok(BatchMode::Concurrent { limit }),
            };
        }
        Err(format!("unknown batch mode '{}'", s))
    }
}

impl TryFrom<String> for BatchMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BatchMode> for String {
    fn from(mode: BatchMode) -> Self {
        mode.to_string()
    }
}

/// Result of the call made for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub id: String,
    /// `Err` carries the rendered error of the failed call
    pub result: Result<(), String>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-record outcomes of a batch, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_success())
            .map(|o| o.id.as_str())
            .collect()
    }

    pub fn failed(&self) -> Vec<(&str, &str)> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.result {
                Err(e) => Some((o.id.as_str(), e.as_str())),
                Ok(()) => None,
            })
            .collect()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.total() - self.success_count()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failure_count() == 0
    }

    /// One-line summary suitable for a notification
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "Nothing to process".to_string();
        }
        if self.is_complete_success() {
            return format!("Processed {} of {} records", self.total(), self.total());
        }
        let failed_ids: Vec<&str> = self.failed().into_iter().map(|(id, _)| id).collect();
        format!(
            "Processed {} of {} records; failed: {}",
            self.success_count(),
            self.total(),
            failed_ids.join(", ")
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchExecutor {
    mode: BatchMode,
}

impl BatchExecutor {
    pub fn new(mode: BatchMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> BatchMode {
        self.mode
    }

    /// Call `op` once per ID and collect every outcome.
    ///
    /// Never short-circuits: a failure for one ID does not stop the others.
    pub async fn run<F, Fut, T, E>(&self, ids: Vec<String>, op: F) -> BatchReport
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        info!("📦 Running batch of {} ({})", ids.len(), self.mode);

        let outcomes = match self.mode {
            BatchMode::Sequential => {
                let mut outcomes = Vec::with_capacity(ids.len());
                for id in ids {
                    let result = op(id.clone()).await;
                    outcomes.push(Self::outcome(id, result));
                }
                outcomes
            }
            BatchMode::Concurrent { limit } => {
                let mut indexed: Vec<(usize, BatchOutcome)> = stream::iter(ids.into_iter().enumerate())
                    .map(|(index, id)| {
                        let call = op(id.clone());
                        async move { (index, Self::outcome(id, call.await)) }
                    })
                    .buffer_unordered(limit.max(1))
                    .collect()
                    .await;
                indexed.sort_by_key(|(index, _)| *index);
                indexed.into_iter().map(|(_, outcome)| outcome).collect()
            }
        };

        let report = BatchReport { outcomes };
        if report.is_complete_success() {
            info!("✅ Batch finished: {}", report.summary());
        } else {
            warn!("⚠️ Batch finished with failures: {}", report.summary());
        }
        report
    }

    fn outcome<T, E: fmt::Display>(id: String, result: Result<T, E>) -> BatchOutcome {
        BatchOutcome {
            id,
            result: result.map(|_| ()).map_err(|e| e.to_string()),
        }
    }
}
