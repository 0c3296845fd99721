//! Tenant identifiers.

use std::fmt;
use uuid::Uuid;

/// Namespace for tenant fingerprints.
const FINGERPRINT_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_54d2_8a3e_4b7f_9e21_c0d4_a7b3_5e19);

/// An opaque caller credential that doubles as the tenant identifier.
///
/// The raw value is only reachable through [`TenantId::expose`], which is meant
/// for binding into queries. `Debug` and `Display` print a short fingerprint so
/// the credential never ends up in logs by accident.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TenantId(String);

impl TenantId {
    /// Build a tenant id from a raw credential. Surrounding whitespace is
    /// trimmed; an empty credential yields `None`.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The raw credential, for use as a bound query parameter.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// A stable, non-reversible identifier safe for logs and file paths.
    pub fn fingerprint(&self) -> String {
        let id = Uuid::new_v5(&FINGERPRINT_NAMESPACE, self.0.as_bytes());
        id.simple().to_string()[..16].to_string()
    }
}

impl fmt::Debug for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TenantId({})", self.fingerprint())
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tenant:{}", self.fingerprint())
    }
}
