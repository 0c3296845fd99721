//! # rolodex-core
//!
//! Types shared by every Rolodex crate:
//!
//! - [`config`]: YAML configuration (`rolodex.yaml`)
//! - [`TenantId`]: the caller credential that scopes every query
//! - [`ContactRecord`] and the network statistics types
//! - [`normalize`]: decoding of semi-structured contact fields

pub mod config;
pub mod normalize;
pub mod record;
pub mod tenant;

pub use config::{
    ConfigError, ConnectionPoolConfig, CredentialConfig, ExportConfig, LimitsConfig, McpConfig,
    RolodexConfig, SslMode, Transport, UpstreamConfig,
};
pub use normalize::{Normalized, normalize};
pub use record::{CompanyCount, ContactRecord, KeywordCount, NetworkAnalysis, NetworkOverview};
pub use tenant::TenantId;
