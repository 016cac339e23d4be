//! Configured reviewer allowlist

use std::collections::HashSet;

use async_trait::async_trait;

use core_kernel::{AccountId, DomainPort, PortError};

use crate::ports::ReviewerDirectory;

/// Fixed set of accounts holding the reviewer capability
#[derive(Debug, Clone, Default)]
pub struct ReviewerAllowlist {
    reviewers: HashSet<AccountId>,
}

impl ReviewerAllowlist {
    pub fn new(reviewers: impl IntoIterator<Item = AccountId>) -> Self {
        Self {
            reviewers: reviewers.into_iter().collect(),
        }
    }

    pub fn contains(&self, account_id: AccountId) -> bool {
        self.reviewers.contains(&account_id)
    }

    pub fn len(&self) -> usize {
        self.reviewers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviewers.is_empty()
    }
}

impl DomainPort for ReviewerAllowlist {}

#[async_trait]
impl ReviewerDirectory for ReviewerAllowlist {
    async fn is_reviewer(&self, account_id: AccountId) -> Result<bool, PortError> {
        Ok(self.contains(account_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_only_listed_accounts_are_reviewers() {
        let reviewer = AccountId::new();
        let allowlist = ReviewerAllowlist::new([reviewer]);

        assert!(allowlist.is_reviewer(reviewer).await.unwrap());
        assert!(!allowlist.is_reviewer(AccountId::new()).await.unwrap());
    }
}
