//! # rolodex-store
//!
//! Read-only, tenant-scoped access to the shared contact table.
//!
//! Every operation takes the caller's [`TenantId`] and only ever sees rows
//! whose tenant column equals it. [`PgContactStore`] runs against Postgres
//! through the process-wide [`PoolManager`]; [`MemoryContactStore`] keeps the
//! same semantics in memory.

pub mod error;
pub mod memory;
pub mod pool;
pub mod postgres;
pub mod query;

use async_trait::async_trait;
use rolodex_core::{ContactRecord, KeywordCount, NetworkAnalysis, TenantId, normalize};
use std::collections::{BTreeMap, BTreeSet};

pub use error::StoreError;
pub use memory::MemoryContactStore;
pub use pool::PoolManager;
pub use postgres::PgContactStore;

/// Tenant-scoped queries over contact records.
///
/// Text matching is case-insensitive substring matching. Results are ordered
/// by full name, with unnamed contacts last.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Contacts whose name, headline, about, company, keywords, skills or
    /// experiences contain `term`.
    async fn search(
        &self,
        tenant: &TenantId,
        term: &str,
        limit: u32,
    ) -> Result<Vec<ContactRecord>, StoreError>;

    /// First contact whose full name contains `name`.
    async fn get_one(
        &self,
        tenant: &TenantId,
        name: &str,
    ) -> Result<Option<ContactRecord>, StoreError>;

    /// Contacts whose keywords contain any of `keywords`. An empty list
    /// matches nothing.
    async fn filter_by_keywords(
        &self,
        tenant: &TenantId,
        keywords: &[String],
        limit: u32,
    ) -> Result<Vec<ContactRecord>, StoreError>;

    /// Overview counts plus the top keywords and companies.
    async fn aggregate(&self, tenant: &TenantId) -> Result<NetworkAnalysis, StoreError>;

    /// Every contact of the tenant, for export.
    async fn list_all(&self, tenant: &TenantId) -> Result<Vec<ContactRecord>, StoreError>;
}

/// Rank keywords by how many contacts carry them.
///
/// Each value is tokenized with [`normalize::tokens`]; a keyword repeated
/// within one contact counts once. Ties are broken alphabetically.
pub fn rank_keywords<'a>(
    values: impl IntoIterator<Item = Option<&'a str>>,
    top: usize,
) -> Vec<KeywordCount> {
    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for value in values {
        let distinct: BTreeSet<String> = normalize::tokens(value).into_iter().collect();
        for keyword in distinct {
            *counts.entry(keyword).or_default() += 1;
        }
    }

    let mut ranked: Vec<KeywordCount> = counts
        .into_iter()
        .map(|(keyword, count)| KeywordCount { keyword, count })
        .collect();
    // BTreeMap order is alphabetical and the sort is stable.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(top);
    ranked
}
