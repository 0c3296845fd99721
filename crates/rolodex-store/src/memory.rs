//! In-memory contact store.
//!
//! Mirrors the Postgres store's matching and ordering rules, so tool handlers
//! can be exercised without a database.

use crate::error::StoreError;
use crate::query::{SEARCH_COLUMNS, TOP_N};
use crate::{ContactStore, rank_keywords};
use async_trait::async_trait;
use rolodex_core::{CompanyCount, ContactRecord, NetworkAnalysis, NetworkOverview, TenantId};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

#[derive(Default)]
pub struct MemoryContactStore {
    rows: RwLock<HashMap<String, Vec<ContactRecord>>>,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contact owned by `tenant`.
    pub fn insert(&self, tenant: &TenantId, record: ContactRecord) {
        let mut rows = match self.rows.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        rows.entry(tenant.expose().to_string())
            .or_default()
            .push(record);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_records(
        self,
        tenant: &TenantId,
        records: impl IntoIterator<Item = ContactRecord>,
    ) -> Self {
        for record in records {
            self.insert(tenant, record);
        }
        self
    }

    /// The tenant's rows, sorted by name with unnamed contacts last.
    fn sorted_rows(&self, tenant: &TenantId) -> Vec<ContactRecord> {
        let rows = match self.rows.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut out = rows.get(tenant.expose()).cloned().unwrap_or_default();
        out.sort_by(|a, b| by_name(a, b));
        out
    }
}

fn by_name(a: &ContactRecord, b: &ContactRecord) -> Ordering {
    match (&a.full_name, &b.full_name) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn contains_ci(haystack: Option<&str>, needle_lower: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle_lower))
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn search(
        &self,
        tenant: &TenantId,
        term: &str,
        limit: u32,
    ) -> Result<Vec<ContactRecord>, StoreError> {
        let needle = term.to_lowercase();
        Ok(self
            .sorted_rows(tenant)
            .into_iter()
            .filter(|r| SEARCH_COLUMNS.iter().any(|c| contains_ci(r.get(c), &needle)))
            .take(limit as usize)
            .collect())
    }

    async fn get_one(
        &self,
        tenant: &TenantId,
        name: &str,
    ) -> Result<Option<ContactRecord>, StoreError> {
        let needle = name.to_lowercase();
        Ok(self
            .sorted_rows(tenant)
            .into_iter()
            .find(|r| contains_ci(r.full_name.as_deref(), &needle)))
    }

    async fn filter_by_keywords(
        &self,
        tenant: &TenantId,
        keywords: &[String],
        limit: u32,
    ) -> Result<Vec<ContactRecord>, StoreError> {
        let needles: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        Ok(self
            .sorted_rows(tenant)
            .into_iter()
            .filter(|r| {
                needles
                    .iter()
                    .any(|n| contains_ci(r.keywords.as_deref(), n))
            })
            .take(limit as usize)
            .collect())
    }

    async fn aggregate(&self, tenant: &TenantId) -> Result<NetworkAnalysis, StoreError> {
        let rows = self.sorted_rows(tenant);

        let mut companies: BTreeMap<String, i64> = BTreeMap::new();
        for company in rows
            .iter()
            .filter_map(|r| r.current_company.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            *companies.entry(company.to_string()).or_default() += 1;
        }

        let mut top_companies: Vec<CompanyCount> = companies
            .iter()
            .map(|(name, count)| CompanyCount {
                current_company: name.clone(),
                count: *count,
            })
            .collect();
        top_companies.sort_by(|a, b| b.count.cmp(&a.count));
        top_companies.truncate(TOP_N as usize);

        Ok(NetworkAnalysis {
            overview: NetworkOverview {
                total_connections: rows.len() as i64,
                unique_companies: companies.len() as i64,
            },
            top_keywords: rank_keywords(
                rows.iter().map(|r| r.keywords.as_deref()),
                TOP_N as usize,
            ),
            top_companies,
        })
    }

    async fn list_all(&self, tenant: &TenantId) -> Result<Vec<ContactRecord>, StoreError> {
        Ok(self.sorted_rows(tenant))
    }
}
