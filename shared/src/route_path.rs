//! Route ordering as carried by the backend: checkpoint IDs joined by whitespace.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePath(Vec<String>);

impl RoutePath {
    /// Split on any whitespace; empty tokens are dropped and order is kept
    pub fn parse(raw: &str) -> Self {
        Self(raw.split_whitespace().map(str::to_string).collect())
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(ids.into_iter().map(Into::into).collect())
    }

    pub fn ids(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, checkpoint_id: &str) -> bool {
        self.0.iter().any(|id| id == checkpoint_id)
    }

    /// Number of distinct checkpoint IDs
    pub fn distinct_len(&self) -> usize {
        let mut seen: Vec<&str> = Vec::with_capacity(self.0.len());
        for id in &self.0 {
            if !seen.contains(&id.as_str()) {
                seen.push(id);
            }
        }
        seen.len()
    }

    pub fn push(&mut self, checkpoint_id: impl Into<String>) {
        self.0.push(checkpoint_id.into());
    }

    pub fn remove(&mut self, checkpoint_id: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|id| id != checkpoint_id);
        before != self.0.len()
    }

    /// Move the stop at `from` to index `to`. Out-of-range indices are ignored.
    pub fn move_stop(&mut self, from: usize, to: usize) {
        if from >= self.0.len() || to >= self.0.len() {
            return;
        }
        let id = self.0.remove(from);
        self.0.insert(to, id);
    }
}

impl fmt::Display for RoutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

impl std::str::FromStr for RoutePath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
