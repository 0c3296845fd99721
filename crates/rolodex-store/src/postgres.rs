use crate::error::StoreError;
use crate::pool::PoolManager;
use crate::query::{ContactQueries, TOP_N, contains_pattern};
use crate::{ContactStore, rank_keywords};
use async_trait::async_trait;
use rolodex_core::{
    CompanyCount, ContactRecord, NetworkAnalysis, NetworkOverview, TenantId, UpstreamConfig,
};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};
use std::sync::Arc;

/// Contact store backed by the shared Postgres table.
///
/// Each call borrows one pooled connection and returns it when the call ends,
/// whether the query succeeded or not.
pub struct PgContactStore {
    pool: Arc<PoolManager>,
    queries: ContactQueries,
}

impl PgContactStore {
    pub fn new(pool: Arc<PoolManager>, upstream: &UpstreamConfig) -> Self {
        Self {
            pool,
            queries: ContactQueries::new(
                &upstream.table,
                &upstream.tenant_column,
                &upstream.id_column,
            ),
        }
    }

    pub fn pool(&self) -> &Arc<PoolManager> {
        &self.pool
    }

    /// Number of rows visible to `tenant`.
    pub async fn count(&self, tenant: &TenantId) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query(&self.queries.overview())
            .bind(tenant.expose())
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.try_get("total_connections")?)
    }

    async fn fetch_records(
        &self,
        query: Query<'_, Postgres, PgArguments>,
    ) -> Result<Vec<ContactRecord>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let rows = query.fetch_all(&mut *conn).await?;
        rows.iter()
            .map(|row| record_from_row(row).map_err(StoreError::from))
            .collect()
    }
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn search(
        &self,
        tenant: &TenantId,
        term: &str,
        limit: u32,
    ) -> Result<Vec<ContactRecord>, StoreError> {
        let sql = self.queries.search();
        tracing::debug!(sql = %sql, tenant = %tenant, "Executing contact search");
        let query = sqlx::query(&sql)
            .bind(tenant.expose())
            .bind(contains_pattern(term))
            .bind(i64::from(limit));
        self.fetch_records(query).await
    }

    async fn get_one(
        &self,
        tenant: &TenantId,
        name: &str,
    ) -> Result<Option<ContactRecord>, StoreError> {
        let sql = self.queries.get_one();
        tracing::debug!(sql = %sql, tenant = %tenant, "Executing profile lookup");
        let query = sqlx::query(&sql)
            .bind(tenant.expose())
            .bind(contains_pattern(name));
        Ok(self.fetch_records(query).await?.pop())
    }

    async fn filter_by_keywords(
        &self,
        tenant: &TenantId,
        keywords: &[String],
        limit: u32,
    ) -> Result<Vec<ContactRecord>, StoreError> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }
        let patterns: Vec<String> = keywords.iter().map(|k| contains_pattern(k)).collect();
        let sql = self.queries.filter_by_keywords();
        tracing::debug!(
            sql = %sql,
            tenant = %tenant,
            keywords = keywords.len(),
            "Executing keyword filter"
        );
        let query = sqlx::query(&sql)
            .bind(tenant.expose())
            .bind(patterns)
            .bind(i64::from(limit));
        self.fetch_records(query).await
    }

    async fn aggregate(&self, tenant: &TenantId) -> Result<NetworkAnalysis, StoreError> {
        tracing::debug!(tenant = %tenant, "Aggregating network statistics");
        let mut conn = self.pool.acquire().await?;

        let row = sqlx::query(&self.queries.overview())
            .bind(tenant.expose())
            .fetch_one(&mut *conn)
            .await?;
        let overview = NetworkOverview {
            total_connections: row.try_get("total_connections")?,
            unique_companies: row.try_get("unique_companies")?,
        };

        let company_rows = sqlx::query(&self.queries.top_companies())
            .bind(tenant.expose())
            .fetch_all(&mut *conn)
            .await?;
        let mut top_companies = Vec::with_capacity(company_rows.len());
        for row in &company_rows {
            top_companies.push(CompanyCount {
                current_company: row.try_get("current_company")?,
                count: row.try_get("count")?,
            });
        }

        let keyword_rows = sqlx::query(&self.queries.keyword_values())
            .bind(tenant.expose())
            .fetch_all(&mut *conn)
            .await?;
        let mut values: Vec<Option<String>> = Vec::with_capacity(keyword_rows.len());
        for row in &keyword_rows {
            values.push(row.try_get("keywords")?);
        }
        let top_keywords = rank_keywords(values.iter().map(|v| v.as_deref()), TOP_N as usize);

        Ok(NetworkAnalysis {
            overview,
            top_keywords,
            top_companies,
        })
    }

    async fn list_all(&self, tenant: &TenantId) -> Result<Vec<ContactRecord>, StoreError> {
        let sql = self.queries.list_all();
        tracing::debug!(tenant = %tenant, "Listing all contacts");
        self.fetch_records(sqlx::query(&sql).bind(tenant.expose()))
            .await
    }
}

fn record_from_row(row: &PgRow) -> Result<ContactRecord, sqlx::Error> {
    Ok(ContactRecord {
        id: row.try_get("id")?,
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        linkedin_url: row.try_get("linkedin_url")?,
        headline: row.try_get("headline")?,
        about: row.try_get("about")?,
        current_company: row.try_get("current_company")?,
        current_company_linkedin_url: row.try_get("current_company_linkedin_url")?,
        current_company_website_url: row.try_get("current_company_website_url")?,
        current_company_detail: row.try_get("current_company_detail")?,
        experiences: row.try_get("experiences")?,
        skills: row.try_get("skills")?,
        education: row.try_get("education")?,
        keywords: row.try_get("keywords")?,
    })
}
