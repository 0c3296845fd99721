//! The five contact-network tools.
//!
//! | Tool | Arguments | Result |
//! |------|-----------|--------|
//! | `search_network` | `query`, `limit?` | array of contacts |
//! | `get_profile` | `name` | one contact or `not_found` |
//! | `filter_by_keywords` | `keywords`, `limit?` | array of contacts |
//! | `analyze_network` | none | overview and rankings |
//! | `export_network` | `format?`, `destination?`, `file_name?` | export payload |

use crate::error::McpError;
use crate::protocol::{ToolAnnotations, ToolDefinition};
use crate::tools::ToolRegistry;
use rolodex_core::LimitsConfig;
use serde_json::json;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    SearchNetwork,
    GetProfile,
    FilterByKeywords,
    AnalyzeNetwork,
    ExportNetwork,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::SearchNetwork,
        Tool::GetProfile,
        Tool::FilterByKeywords,
        Tool::AnalyzeNetwork,
        Tool::ExportNetwork,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::SearchNetwork => "search_network",
            Tool::GetProfile => "get_profile",
            Tool::FilterByKeywords => "filter_by_keywords",
            Tool::AnalyzeNetwork => "analyze_network",
            Tool::ExportNetwork => "export_network",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// Definition advertised by `tools/list`.
    pub fn definition(self, limits: &LimitsConfig) -> ToolDefinition {
        let max_rows = limits.max_rows_per_query;
        let limit = |default: u32| {
            json!({
                "type": "integer",
                "minimum": 1,
                "maximum": max_rows,
                "default": default,
                "description": "Maximum number of contacts to return"
            })
        };

        let (description, input_schema) = match self {
            Tool::SearchNetwork => (
                "Search your network by name, headline, about, company, keywords, skills or \
                 experiences (case-insensitive substring match)",
                json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Text to look for; empty matches every contact"
                        },
                        "limit": limit(limits.default_search_limit)
                    },
                    "required": ["query"],
                    "additionalProperties": false
                }),
            ),
            Tool::GetProfile => (
                "Get the full profile of the first contact whose name contains the given text",
                json!({
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Full or partial contact name"
                        }
                    },
                    "required": ["name"],
                    "additionalProperties": false
                }),
            ),
            Tool::FilterByKeywords => (
                "Find contacts whose keywords contain any of the given keywords",
                json!({
                    "type": "object",
                    "properties": {
                        "keywords": {
                            "type": "array",
                            "items": {"type": "string"},
                            "minItems": 1,
                            "description": "Keywords to match (any)"
                        },
                        "limit": limit(limits.default_filter_limit)
                    },
                    "required": ["keywords"],
                    "additionalProperties": false
                }),
            ),
            Tool::AnalyzeNetwork => (
                "Summarize your network: totals plus the top keywords and companies",
                json!({
                    "type": "object",
                    "properties": {},
                    "additionalProperties": false
                }),
            ),
            Tool::ExportNetwork => (
                "Export your whole network as CSV or a markdown table, inline or as a file",
                json!({
                    "type": "object",
                    "properties": {
                        "format": {
                            "type": "string",
                            "enum": ["csv", "table"],
                            "default": "csv"
                        },
                        "destination": {
                            "type": "string",
                            "enum": ["inline", "file"],
                            "default": "inline"
                        },
                        "file_name": {
                            "type": "string",
                            "minLength": 1,
                            "description": "File name for destination=file"
                        }
                    },
                    "additionalProperties": false
                }),
            ),
        };

        ToolDefinition {
            name: self.name().to_string(),
            description: Some(description.to_string()),
            input_schema,
            annotations: Some(ToolAnnotations {
                title: None,
                read_only_hint: Some(self != Tool::ExportNetwork),
                idempotent_hint: Some(true),
            }),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Registry holding every tool.
pub fn builtin_registry(limits: &LimitsConfig) -> Result<ToolRegistry, McpError> {
    let mut registry = ToolRegistry::new();
    for tool in Tool::ALL {
        registry.register(tool.definition(limits))?;
    }
    Ok(registry)
}
