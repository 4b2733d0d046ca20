//! Strongly-typed identifiers for parties and party records
//!
//! Identifiers display as `PREFIX-uuid` (e.g. `PTY-67e5...`) and parse from
//! either that form or a bare UUID.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// An identifier string that is not a UUID, with or without its prefix
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} identifier '{value}'")]
pub struct IdParseError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Display prefix
            pub const PREFIX: &'static str = $prefix;

            /// Creates a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bare = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Uuid::parse_str(bare).map(Self).map_err(|_| IdParseError {
                    kind: stringify!($name),
                    value: s.to_string(),
                })
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_id!(
    /// A person or organization
    PartyId, "PTY"
);
define_id!(
    /// An isolation scope for parties and tenant-specific reference codes
    TenantId, "TNT"
);
define_id!(AssociationId, "ASC");
define_id!(MandateId, "MDT");
define_id!(EducationId, "EDU");
define_id!(EmploymentId, "EMP");
define_id!(NextOfKinId, "NOK");
define_id!(PhysicalAddressId, "ADDR");

impl TenantId {
    /// The tenant that owns data created without an explicit tenant
    pub const DEFAULT: TenantId = TenantId(Uuid::nil());

    pub fn is_default(&self) -> bool {
        self.0.is_nil()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_prefix() {
        assert!(PartyId::new().to_string().starts_with("PTY-"));
        assert!(PhysicalAddressId::new().to_string().starts_with("ADDR-"));
    }

    #[test]
    fn test_parse_error_names_the_identifier() {
        let err = "MDT-123".parse::<MandateId>().unwrap_err();
        assert_eq!(err.kind, "MandateId");
        assert_eq!(err.to_string(), "invalid MandateId identifier 'MDT-123'");
    }

    #[test]
    fn test_default_tenant() {
        assert!(TenantId::DEFAULT.is_default());
        assert!(!TenantId::new().is_default());
        assert_eq!(
            TenantId::DEFAULT.to_string(),
            "TNT-00000000-0000-0000-0000-000000000000"
        );
    }
}
