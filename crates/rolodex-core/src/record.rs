//! Contact records and network statistics.

use crate::normalize;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of the contact table.
///
/// Every attribute is read as text. The semi-structured attributes
/// (`current_company_detail`, `experiences`, `skills`, `education`,
/// `keywords`) hold whatever encoding ingestion produced and are decoded by
/// [`crate::normalize`] only when rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactRecord {
    pub id: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub linkedin_url: Option<String>,
    pub headline: Option<String>,
    pub about: Option<String>,
    pub current_company: Option<String>,
    pub current_company_linkedin_url: Option<String>,
    pub current_company_website_url: Option<String>,
    pub current_company_detail: Option<String>,
    pub experiences: Option<String>,
    pub skills: Option<String>,
    pub education: Option<String>,
    pub keywords: Option<String>,
}

impl ContactRecord {
    /// Columns read for every record, in payload order.
    pub const COLUMNS: [&'static str; 14] = [
        "id",
        "full_name",
        "email",
        "linkedin_url",
        "headline",
        "about",
        "current_company",
        "current_company_linkedin_url",
        "current_company_website_url",
        "current_company_detail",
        "experiences",
        "skills",
        "education",
        "keywords",
    ];

    /// Value of a column by name.
    pub fn get(&self, column: &str) -> Option<&str> {
        let value = match column {
            "id" => &self.id,
            "full_name" => &self.full_name,
            "email" => &self.email,
            "linkedin_url" => &self.linkedin_url,
            "headline" => &self.headline,
            "about" => &self.about,
            "current_company" => &self.current_company,
            "current_company_linkedin_url" => &self.current_company_linkedin_url,
            "current_company_website_url" => &self.current_company_website_url,
            "current_company_detail" => &self.current_company_detail,
            "experiences" => &self.experiences,
            "skills" => &self.skills,
            "education" => &self.education,
            "keywords" => &self.keywords,
            _ => return None,
        };
        value.as_deref()
    }

    /// Whether a column holds semi-structured data.
    pub fn is_semi_structured(column: &str) -> bool {
        matches!(
            column,
            "current_company_detail" | "experiences" | "skills" | "education" | "keywords"
        )
    }

    /// JSON object for tool payloads. Semi-structured attributes that hold
    /// JSON are embedded as values rather than escaped strings.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        for column in Self::COLUMNS {
            let raw = self.get(column);
            let value = if Self::is_semi_structured(column) {
                normalize::structured(raw)
            } else {
                raw.map_or(Value::Null, |s| Value::String(s.to_string()))
            };
            obj.insert(column.to_string(), value);
        }
        Value::Object(obj)
    }
}

/// Counts for a tenant's whole network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkOverview {
    pub total_connections: i64,
    pub unique_companies: i64,
}

/// A keyword and how many contacts carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: i64,
}

/// A company and how many contacts currently work there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyCount {
    pub current_company: String,
    pub count: i64,
}

/// Result of `analyze_network`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAnalysis {
    pub overview: NetworkOverview,
    pub top_keywords: Vec<KeywordCount>,
    pub top_companies: Vec<CompanyCount>,
}
