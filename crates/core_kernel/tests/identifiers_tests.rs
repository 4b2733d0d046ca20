//! Tests for the typed identifiers

use core_kernel::{
    AssociationId, EducationId, EmploymentId, MandateId, NextOfKinId, PartyId, PhysicalAddressId,
    TenantId,
};
use uuid::Uuid;

mod party_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(PartyId::new(), PartyId::new());
    }

    #[test]
    fn test_from_str_with_and_without_prefix() {
        let original = PartyId::new();
        let prefixed: PartyId = original.to_string().parse().unwrap();
        let bare: PartyId = original.as_uuid().to_string().parse().unwrap();
        assert_eq!(original, prefixed);
        assert_eq!(original, bare);
    }

    #[test]
    fn test_from_str_rejects_other_prefixes() {
        let mandate = MandateId::new();
        assert!(mandate.to_string().parse::<PartyId>().is_err());
        assert!("PTY-not-a-uuid".parse::<PartyId>().is_err());
    }

    #[test]
    fn test_json_is_the_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id = PartyId::from(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
        assert_eq!(serde_json::from_str::<PartyId>(&json).unwrap(), id);
    }
}

mod tenant_id_tests {
    use super::*;

    #[test]
    fn test_default_tenant_is_nil() {
        assert_eq!(*TenantId::DEFAULT.as_uuid(), Uuid::nil());
        assert_eq!("TNT-00000000-0000-0000-0000-000000000000".parse::<TenantId>().unwrap(), TenantId::DEFAULT);
    }
}

#[test]
fn test_id_prefixes_are_unique() {
    let prefixes = [
        PartyId::PREFIX,
        TenantId::PREFIX,
        AssociationId::PREFIX,
        MandateId::PREFIX,
        EducationId::PREFIX,
        EmploymentId::PREFIX,
        NextOfKinId::PREFIX,
        PhysicalAddressId::PREFIX,
    ];

    let unique: std::collections::HashSet<_> = prefixes.iter().collect();
    assert_eq!(unique.len(), prefixes.len());
}

#[test]
fn test_same_uuid_displays_per_type() {
    let uuid = Uuid::new_v4();
    let party = PartyId::from(uuid);
    let association = AssociationId::from(uuid);

    assert_eq!(party.as_uuid(), association.as_uuid());
    assert_ne!(party.to_string(), association.to_string());
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn party_id_display_parses_back(bytes in any::<[u8; 16]>()) {
            let id = PartyId::from(Uuid::from_bytes(bytes));
            let parsed: PartyId = id.to_string().parse().unwrap();
            prop_assert_eq!(id, parsed);
        }
    }
}
