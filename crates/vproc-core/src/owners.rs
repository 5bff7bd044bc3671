//! Owner-activity lookup.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::CoreResult;

/// Answers whether an owner account may submit new work.
#[async_trait]
pub trait OwnerDirectory: Send + Sync {
    async fn is_active(&self, owner_id: &str) -> CoreResult<bool>;
}

/// Fixed directory: every owner is active unless listed as inactive.
#[derive(Debug, Clone, Default)]
pub struct StaticOwnerDirectory {
    inactive: HashSet<String>,
}

impl StaticOwnerDirectory {
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Mark `owner_id` as inactive.
    pub fn with_inactive(mut self, owner_id: impl Into<String>) -> Self {
        self.inactive.insert(owner_id.into());
        self
    }
}

#[async_trait]
impl OwnerDirectory for StaticOwnerDirectory {
    async fn is_active(&self, owner_id: &str) -> CoreResult<bool> {
        Ok(!owner_id.trim().is_empty() && !self.inactive.contains(owner_id))
    }
}
