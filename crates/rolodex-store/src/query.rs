//! SQL text for the contact table.
//!
//! Table and column names come from configuration and are quoted here. Every
//! caller-supplied value (tenant, search term, keywords, limit) is a bound
//! parameter; `$1` is always the tenant.

use rolodex_core::ContactRecord;

/// Number of rows returned by each ranking in the network analysis.
pub const TOP_N: i64 = 10;

/// SQL for one configured contact table.
#[derive(Debug, Clone)]
pub struct ContactQueries {
    table: String,
    tenant_column: String,
    id_column: String,
}

impl ContactQueries {
    pub fn new(table: &str, tenant_column: &str, id_column: &str) -> Self {
        Self {
            table: quote_ident(table),
            tenant_column: quote_ident(tenant_column),
            id_column: quote_ident(id_column),
        }
    }

    fn tenant_predicate(&self) -> String {
        format!("{}::text = $1", self.tenant_column)
    }

    fn select_list(&self) -> String {
        ContactRecord::COLUMNS
            .iter()
            .map(|column| {
                let source = if *column == "id" {
                    self.id_column.clone()
                } else {
                    quote_ident(column)
                };
                format!("{}::text AS {}", source, column)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `$2` is an escaped `%term%` pattern, `$3` the row limit.
    pub fn search(&self) -> String {
        let matched = SEARCH_COLUMNS
            .iter()
            .map(|c| format!("{}::text ILIKE $2", quote_ident(c)))
            .collect::<Vec<_>>()
            .join(" OR ");
        format!(
            "SELECT {} FROM {} WHERE {} AND ({}) ORDER BY full_name ASC NULLS LAST LIMIT $3",
            self.select_list(),
            self.table,
            self.tenant_predicate(),
            matched
        )
    }

    /// `$2` is an escaped `%name%` pattern.
    pub fn get_one(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE {} AND \"full_name\"::text ILIKE $2 \
             ORDER BY full_name ASC NULLS LAST LIMIT 1",
            self.select_list(),
            self.table,
            self.tenant_predicate()
        )
    }

    /// `$2` is a `text[]` of escaped `%keyword%` patterns, `$3` the row limit.
    pub fn filter_by_keywords(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE {} AND \"keywords\"::text ILIKE ANY($2::text[]) \
             ORDER BY full_name ASC NULLS LAST LIMIT $3",
            self.select_list(),
            self.table,
            self.tenant_predicate()
        )
    }

    pub fn list_all(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE {} ORDER BY full_name ASC NULLS LAST",
            self.select_list(),
            self.table,
            self.tenant_predicate()
        )
    }

    pub fn overview(&self) -> String {
        format!(
            "SELECT COUNT(*) AS total_connections, \
             COUNT(DISTINCT NULLIF(btrim(\"current_company\"::text), '')) AS unique_companies \
             FROM {} WHERE {}",
            self.table,
            self.tenant_predicate()
        )
    }

    pub fn top_companies(&self) -> String {
        format!(
            "SELECT btrim(\"current_company\"::text) AS current_company, COUNT(*) AS count \
             FROM {} WHERE {} AND NULLIF(btrim(\"current_company\"::text), '') IS NOT NULL \
             GROUP BY 1 ORDER BY count DESC, current_company ASC LIMIT {}",
            self.table,
            self.tenant_predicate(),
            TOP_N
        )
    }

    /// Raw keyword values; ranking happens after tokenizing in Rust.
    pub fn keyword_values(&self) -> String {
        format!(
            "SELECT \"keywords\"::text AS keywords FROM {} WHERE {} AND \"keywords\" IS NOT NULL",
            self.table,
            self.tenant_predicate()
        )
    }
}

/// Attributes matched by the free-text search.
pub const SEARCH_COLUMNS: [&str; 7] = [
    "full_name",
    "headline",
    "about",
    "current_company",
    "keywords",
    "skills",
    "experiences",
];

/// Escape `LIKE` metacharacters so `term` only ever matches literally.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Substring pattern for `ILIKE`.
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
