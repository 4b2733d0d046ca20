//! Party Domain Ports
//!
//! This module defines the port interfaces the party services depend on:
//!
//! - [`PartyPort`]: persistence of persons, organizations, associations and
//!   mandates, scoped by tenant
//! - [`ReferenceDataPort`]: the raw reference code lists and role-type
//!   constraints
//!
//! The PostgreSQL adapters live in `infra_db`. The in-memory adapters in
//! [`mock`] are used by tests and by the API crate's router tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_party::ports::PartyPort;
//! use std::sync::Arc;
//!
//! let port: Arc<dyn PartyPort> = Arc::new(PostgresPartyAdapter::new(pool.clone()));
//! let service = PartyService::new(port, reference_service);
//! ```
//!
//! # Error contract
//!
//! Creating an entity whose id already exists returns
//! `PortError::Conflict`. Reading, updating or deleting an id that does not
//! exist within the tenant returns `PortError::NotFound`.

use async_trait::async_trait;

use core_kernel::{
    AssociationId, DomainPort, HealthCheckable, MandateId, PartyId, PortError, TenantId,
};

use crate::association::Association;
use crate::mandate::Mandate;
use crate::organization::Organization;
use crate::party::{PageRequest, Party, PartyPage, PartyType};
use crate::person::Person;
use crate::reference::{ReferenceCode, ReferenceDataKind, RoleTypeAttributeTypeConstraint, RoleTypePreferenceTypeConstraint};

/// The persistence port for parties and their relationships
///
/// Listing methods apply the filter, sort and paging in the page request;
/// callers pass a request already normalized by the service.
#[async_trait]
pub trait PartyPort: DomainPort + HealthCheckable {
    /// Returns true if a party with the id exists for the tenant
    async fn party_exists(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError>;

    /// Retrieves the header of a person or organization
    async fn get_party(&self, tenant_id: TenantId, id: PartyId) -> Result<Party, PortError>;

    /// Lists the headers of all parties
    async fn get_parties(
        &self,
        tenant_id: TenantId,
        request: &PageRequest,
    ) -> Result<PartyPage<Party>, PortError>;

    async fn get_person(&self, tenant_id: TenantId, id: PartyId) -> Result<Person, PortError>;

    async fn get_persons(
        &self,
        tenant_id: TenantId,
        request: &PageRequest,
    ) -> Result<PartyPage<Person>, PortError>;

    /// Stores a new person
    async fn create_person(&self, person: Person) -> Result<Person, PortError>;

    /// Replaces an existing person
    async fn update_person(&self, person: Person) -> Result<Person, PortError>;

    async fn get_organization(
        &self,
        tenant_id: TenantId,
        id: PartyId,
    ) -> Result<Organization, PortError>;

    async fn get_organizations(
        &self,
        tenant_id: TenantId,
        request: &PageRequest,
    ) -> Result<PartyPage<Organization>, PortError>;

    /// Stores a new organization
    async fn create_organization(&self, organization: Organization) -> Result<Organization, PortError>;

    /// Replaces an existing organization
    async fn update_organization(&self, organization: Organization) -> Result<Organization, PortError>;

    /// Deletes a party of the given type along with its associations
    ///
    /// Returns `PortError::NotFound` if no party of that type has the id.
    async fn delete_party(
        &self,
        tenant_id: TenantId,
        id: PartyId,
        party_type: PartyType,
    ) -> Result<(), PortError>;

    async fn get_association(
        &self,
        tenant_id: TenantId,
        id: AssociationId,
    ) -> Result<Association, PortError>;

    /// Lists the associations where the party is on either side
    ///
    /// The page request filter and sort apply to the association type.
    async fn get_associations_for_party(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        request: &PageRequest,
    ) -> Result<PartyPage<Association>, PortError>;

    async fn create_association(&self, association: Association) -> Result<Association, PortError>;

    async fn update_association(&self, association: Association) -> Result<Association, PortError>;

    async fn delete_association(&self, tenant_id: TenantId, id: AssociationId) -> Result<(), PortError>;

    async fn get_mandate(&self, tenant_id: TenantId, id: MandateId) -> Result<Mandate, PortError>;

    /// Lists the mandates where the party is a mandatary
    ///
    /// The page request filter and sort apply to the mandate type.
    async fn get_mandates_for_party(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        request: &PageRequest,
    ) -> Result<PartyPage<Mandate>, PortError>;

    async fn create_mandate(&self, mandate: Mandate) -> Result<Mandate, PortError>;

    async fn update_mandate(&self, mandate: Mandate) -> Result<Mandate, PortError>;

    async fn delete_mandate(&self, tenant_id: TenantId, id: MandateId) -> Result<(), PortError>;
}

/// The source of party reference data
///
/// Implementations return the complete list for a kind across all tenants
/// and locales; filtering happens in the reference service.
#[async_trait]
pub trait ReferenceDataPort: DomainPort + HealthCheckable {
    /// Returns every code of the given kind
    async fn get_codes(&self, kind: ReferenceDataKind) -> Result<Vec<ReferenceCode>, PortError>;

    /// Returns the attribute constraints, optionally only for one role type
    async fn get_role_type_attribute_type_constraints(
        &self,
        role_type: Option<&str>,
    ) -> Result<Vec<RoleTypeAttributeTypeConstraint>, PortError>;

    /// Returns the preference constraints, optionally only for one role type
    async fn get_role_type_preference_type_constraints(
        &self,
        role_type: Option<&str>,
    ) -> Result<Vec<RoleTypePreferenceTypeConstraint>, PortError>;
}

/// In-memory implementations of the party ports
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use core_kernel::HealthCheckResult;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[derive(Debug, Clone)]
    enum StoredParty {
        Person(Person),
        Organization(Organization),
    }

    impl StoredParty {
        fn header(&self) -> Party {
            match self {
                StoredParty::Person(person) => person.party(),
                StoredParty::Organization(organization) => organization.party(),
            }
        }
    }

    fn healthy(adapter_id: &str, available: bool) -> HealthCheckResult {
        if available {
            HealthCheckResult::healthy(adapter_id, 0).with_message("In-memory adapter")
        } else {
            HealthCheckResult::unhealthy(adapter_id, 0, "In-memory adapter switched off")
        }
    }

    /// In-memory party store
    ///
    /// Deleting a party also removes its associations and its mandatary
    /// entries, mirroring the database's cascading foreign keys.
    #[derive(Debug, Default)]
    pub struct InMemoryPartyPort {
        parties: Arc<RwLock<HashMap<PartyId, StoredParty>>>,
        associations: Arc<RwLock<HashMap<AssociationId, Association>>>,
        mandates: Arc<RwLock<HashMap<MandateId, Mandate>>>,
        unavailable: AtomicBool,
    }

    impl InMemoryPartyPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every subsequent call fail with `PortError::ServiceUnavailable`
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        fn check_available(&self) -> Result<(), PortError> {
            if self.unavailable.load(Ordering::SeqCst) {
                Err(PortError::service_unavailable("in-memory-party-store"))
            } else {
                Ok(())
            }
        }

        async fn require_party(&self, tenant_id: TenantId, id: PartyId, field: &str) -> Result<(), PortError> {
            let parties = self.parties.read().await;
            match parties.get(&id) {
                Some(party) if party.header().tenant_id == tenant_id => Ok(()),
                _ => Err(PortError::validation_field(
                    format!("The party ({}) does not exist", id),
                    field,
                )),
            }
        }
    }

    impl DomainPort for InMemoryPartyPort {}

    #[async_trait]
    impl HealthCheckable for InMemoryPartyPort {
        async fn health_check(&self) -> HealthCheckResult {
            healthy("in-memory-party-port", !self.unavailable.load(Ordering::SeqCst))
        }
    }

    #[async_trait]
    impl PartyPort for InMemoryPartyPort {
        async fn party_exists(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError> {
            self.check_available()?;
            Ok(self
                .parties
                .read()
                .await
                .get(&id)
                .map_or(false, |p| p.header().tenant_id == tenant_id))
        }

        async fn get_party(&self, tenant_id: TenantId, id: PartyId) -> Result<Party, PortError> {
            self.check_available()?;
            self.parties
                .read()
                .await
                .get(&id)
                .map(StoredParty::header)
                .filter(|p| p.tenant_id == tenant_id)
                .ok_or_else(|| PortError::not_found("Party", id))
        }

        async fn get_parties(
            &self,
            tenant_id: TenantId,
            request: &PageRequest,
        ) -> Result<PartyPage<Party>, PortError> {
            self.check_available()?;
            let parties: Vec<Party> = self
                .parties
                .read()
                .await
                .values()
                .map(StoredParty::header)
                .filter(|p| p.tenant_id == tenant_id)
                .collect();
            Ok(request.apply(parties, |p| p.name.as_str()))
        }

        async fn get_person(&self, tenant_id: TenantId, id: PartyId) -> Result<Person, PortError> {
            self.check_available()?;
            match self.parties.read().await.get(&id) {
                Some(StoredParty::Person(person)) if person.tenant_id == tenant_id => Ok(person.clone()),
                _ => Err(PortError::not_found("Person", id)),
            }
        }

        async fn get_persons(
            &self,
            tenant_id: TenantId,
            request: &PageRequest,
        ) -> Result<PartyPage<Person>, PortError> {
            self.check_available()?;
            let persons: Vec<Person> = self
                .parties
                .read()
                .await
                .values()
                .filter_map(|p| match p {
                    StoredParty::Person(person) if person.tenant_id == tenant_id => Some(person.clone()),
                    _ => None,
                })
                .collect();
            Ok(request.apply(persons, |p| p.name.as_str()))
        }

        async fn create_person(&self, person: Person) -> Result<Person, PortError> {
            self.check_available()?;
            let mut parties = self.parties.write().await;
            if parties.contains_key(&person.id) {
                return Err(PortError::conflict(format!("The party ({}) already exists", person.id)));
            }
            parties.insert(person.id, StoredParty::Person(person.clone()));
            Ok(person)
        }

        async fn update_person(&self, mut person: Person) -> Result<Person, PortError> {
            self.check_available()?;
            let mut parties = self.parties.write().await;
            match parties.get(&person.id) {
                Some(StoredParty::Person(existing)) if existing.tenant_id == person.tenant_id => {
                    person.created = existing.created;
                    person.updated = Some(Utc::now());
                    parties.insert(person.id, StoredParty::Person(person.clone()));
                    Ok(person)
                }
                _ => Err(PortError::not_found("Person", person.id)),
            }
        }

        async fn get_organization(
            &self,
            tenant_id: TenantId,
            id: PartyId,
        ) -> Result<Organization, PortError> {
            self.check_available()?;
            match self.parties.read().await.get(&id) {
                Some(StoredParty::Organization(organization)) if organization.tenant_id == tenant_id => {
                    Ok(organization.clone())
                }
                _ => Err(PortError::not_found("Organization", id)),
            }
        }

        async fn get_organizations(
            &self,
            tenant_id: TenantId,
            request: &PageRequest,
        ) -> Result<PartyPage<Organization>, PortError> {
            self.check_available()?;
            let organizations: Vec<Organization> = self
                .parties
                .read()
                .await
                .values()
                .filter_map(|p| match p {
                    StoredParty::Organization(organization) if organization.tenant_id == tenant_id => {
                        Some(organization.clone())
                    }
                    _ => None,
                })
                .collect();
            Ok(request.apply(organizations, |o| o.name.as_str()))
        }

        async fn create_organization(&self, organization: Organization) -> Result<Organization, PortError> {
            self.check_available()?;
            let mut parties = self.parties.write().await;
            if parties.contains_key(&organization.id) {
                return Err(PortError::conflict(format!(
                    "The party ({}) already exists",
                    organization.id
                )));
            }
            parties.insert(organization.id, StoredParty::Organization(organization.clone()));
            Ok(organization)
        }

        async fn update_organization(&self, mut organization: Organization) -> Result<Organization, PortError> {
            self.check_available()?;
            let mut parties = self.parties.write().await;
            match parties.get(&organization.id) {
                Some(StoredParty::Organization(existing)) if existing.tenant_id == organization.tenant_id => {
                    organization.created = existing.created;
                    organization.updated = Some(Utc::now());
                    parties.insert(organization.id, StoredParty::Organization(organization.clone()));
                    Ok(organization)
                }
                _ => Err(PortError::not_found("Organization", organization.id)),
            }
        }

        async fn delete_party(
            &self,
            tenant_id: TenantId,
            id: PartyId,
            party_type: PartyType,
        ) -> Result<(), PortError> {
            self.check_available()?;
            let mut parties = self.parties.write().await;
            let matches = parties
                .get(&id)
                .map(StoredParty::header)
                .map_or(false, |p| p.tenant_id == tenant_id && p.party_type == party_type);
            if !matches {
                return Err(PortError::not_found(party_type.code(), id));
            }
            parties.remove(&id);
            drop(parties);

            self.associations.write().await.retain(|_, a| !a.involves(id));
            // mandates held only by this party go with it
            self.mandates.write().await.retain(|_, mandate| {
                if !mandate.has_mandatary(id) {
                    return true;
                }
                mandate.mandataries.retain(|m| m.party_id != id);
                !mandate.mandataries.is_empty()
            });
            Ok(())
        }

        async fn get_association(
            &self,
            tenant_id: TenantId,
            id: AssociationId,
        ) -> Result<Association, PortError> {
            self.check_available()?;
            self.associations
                .read()
                .await
                .get(&id)
                .filter(|a| a.tenant_id == tenant_id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Association", id))
        }

        async fn get_associations_for_party(
            &self,
            tenant_id: TenantId,
            party_id: PartyId,
            request: &PageRequest,
        ) -> Result<PartyPage<Association>, PortError> {
            self.check_available()?;
            let associations: Vec<Association> = self
                .associations
                .read()
                .await
                .values()
                .filter(|a| a.tenant_id == tenant_id && a.involves(party_id))
                .cloned()
                .collect();
            Ok(request.apply(associations, |a| a.association_type.as_str()))
        }

        async fn create_association(&self, association: Association) -> Result<Association, PortError> {
            self.check_available()?;
            self.require_party(association.tenant_id, association.first_party_id, "first_party_id")
                .await?;
            self.require_party(association.tenant_id, association.second_party_id, "second_party_id")
                .await?;

            let mut associations = self.associations.write().await;
            if associations.contains_key(&association.id) {
                return Err(PortError::conflict(format!(
                    "The association ({}) already exists",
                    association.id
                )));
            }
            associations.insert(association.id, association.clone());
            Ok(association)
        }

        async fn update_association(&self, mut association: Association) -> Result<Association, PortError> {
            self.check_available()?;
            self.require_party(association.tenant_id, association.first_party_id, "first_party_id")
                .await?;
            self.require_party(association.tenant_id, association.second_party_id, "second_party_id")
                .await?;

            let mut associations = self.associations.write().await;
            match associations.get(&association.id) {
                Some(existing) if existing.tenant_id == association.tenant_id => {
                    association.created = existing.created;
                    association.updated = Some(Utc::now());
                    associations.insert(association.id, association.clone());
                    Ok(association)
                }
                _ => Err(PortError::not_found("Association", association.id)),
            }
        }

        async fn delete_association(&self, tenant_id: TenantId, id: AssociationId) -> Result<(), PortError> {
            self.check_available()?;
            let mut associations = self.associations.write().await;
            match associations.get(&id) {
                Some(existing) if existing.tenant_id == tenant_id => {
                    associations.remove(&id);
                    Ok(())
                }
                _ => Err(PortError::not_found("Association", id)),
            }
        }

        async fn get_mandate(&self, tenant_id: TenantId, id: MandateId) -> Result<Mandate, PortError> {
            self.check_available()?;
            self.mandates
                .read()
                .await
                .get(&id)
                .filter(|m| m.tenant_id == tenant_id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Mandate", id))
        }

        async fn get_mandates_for_party(
            &self,
            tenant_id: TenantId,
            party_id: PartyId,
            request: &PageRequest,
        ) -> Result<PartyPage<Mandate>, PortError> {
            self.check_available()?;
            let mandates: Vec<Mandate> = self
                .mandates
                .read()
                .await
                .values()
                .filter(|m| m.tenant_id == tenant_id && m.has_mandatary(party_id))
                .cloned()
                .collect();
            Ok(request.apply(mandates, |m| m.mandate_type.as_str()))
        }

        async fn create_mandate(&self, mandate: Mandate) -> Result<Mandate, PortError> {
            self.check_available()?;
            for mandatary in &mandate.mandataries {
                self.require_party(mandate.tenant_id, mandatary.party_id, "mandataries").await?;
            }

            let mut mandates = self.mandates.write().await;
            if mandates.contains_key(&mandate.id) {
                return Err(PortError::conflict(format!("The mandate ({}) already exists", mandate.id)));
            }
            mandates.insert(mandate.id, mandate.clone());
            Ok(mandate)
        }

        async fn update_mandate(&self, mut mandate: Mandate) -> Result<Mandate, PortError> {
            self.check_available()?;
            for mandatary in &mandate.mandataries {
                self.require_party(mandate.tenant_id, mandatary.party_id, "mandataries").await?;
            }

            let mut mandates = self.mandates.write().await;
            match mandates.get(&mandate.id) {
                Some(existing) if existing.tenant_id == mandate.tenant_id => {
                    mandate.created = existing.created;
                    mandate.updated = Some(Utc::now());
                    mandates.insert(mandate.id, mandate.clone());
                    Ok(mandate)
                }
                _ => Err(PortError::not_found("Mandate", mandate.id)),
            }
        }

        async fn delete_mandate(&self, tenant_id: TenantId, id: MandateId) -> Result<(), PortError> {
            self.check_available()?;
            let mut mandates = self.mandates.write().await;
            match mandates.get(&id) {
                Some(existing) if existing.tenant_id == tenant_id => {
                    mandates.remove(&id);
                    Ok(())
                }
                _ => Err(PortError::not_found("Mandate", id)),
            }
        }
    }

    /// In-memory reference data source
    ///
    /// Counts the code list loads so tests can observe caching.
    #[derive(Debug, Default)]
    pub struct InMemoryReferenceDataPort {
        codes: RwLock<HashMap<ReferenceDataKind, Vec<ReferenceCode>>>,
        attribute_constraints: RwLock<Vec<RoleTypeAttributeTypeConstraint>>,
        preference_constraints: RwLock<Vec<RoleTypePreferenceTypeConstraint>>,
        loads: AtomicUsize,
        unavailable: AtomicBool,
    }

    impl InMemoryReferenceDataPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a port pre-populated with the given codes
        pub async fn with_codes(codes: Vec<ReferenceCode>) -> Self {
            let port = Self::new();
            for code in codes {
                port.add_code(code).await;
            }
            port
        }

        pub async fn add_code(&self, code: ReferenceCode) {
            self.codes.write().await.entry(code.kind).or_default().push(code);
        }

        pub async fn add_attribute_constraint(&self, constraint: RoleTypeAttributeTypeConstraint) {
            self.attribute_constraints.write().await.push(constraint);
        }

        pub async fn add_preference_constraint(&self, constraint: RoleTypePreferenceTypeConstraint) {
            self.preference_constraints.write().await.push(constraint);
        }

        /// Number of times a code list has been loaded
        pub fn load_count(&self) -> usize {
            self.loads.load(Ordering::SeqCst)
        }

        /// Makes every subsequent call fail with `PortError::ServiceUnavailable`
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        fn check_available(&self) -> Result<(), PortError> {
            if self.unavailable.load(Ordering::SeqCst) {
                Err(PortError::service_unavailable("in-memory-reference-data"))
            } else {
                Ok(())
            }
        }
    }

    impl DomainPort for InMemoryReferenceDataPort {}

    #[async_trait]
    impl HealthCheckable for InMemoryReferenceDataPort {
        async fn health_check(&self) -> HealthCheckResult {
            healthy("in-memory-reference-data-port", !self.unavailable.load(Ordering::SeqCst))
        }
    }

    #[async_trait]
    impl ReferenceDataPort for InMemoryReferenceDataPort {
        async fn get_codes(&self, kind: ReferenceDataKind) -> Result<Vec<ReferenceCode>, PortError> {
            self.check_available()?;
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.codes.read().await.get(&kind).cloned().unwrap_or_default())
        }

        async fn get_role_type_attribute_type_constraints(
            &self,
            role_type: Option<&str>,
        ) -> Result<Vec<RoleTypeAttributeTypeConstraint>, PortError> {
            self.check_available()?;
            Ok(self
                .attribute_constraints
                .read()
                .await
                .iter()
                .filter(|c| role_type.map_or(true, |r| c.role_type == r))
                .cloned()
                .collect())
        }

        async fn get_role_type_preference_type_constraints(
            &self,
            role_type: Option<&str>,
        ) -> Result<Vec<RoleTypePreferenceTypeConstraint>, PortError> {
            self.check_available()?;
            Ok(self
                .preference_constraints
                .read()
                .await
                .iter()
                .filter(|c| role_type.map_or(true, |r| c.role_type == r))
                .cloned()
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{InMemoryPartyPort, InMemoryReferenceDataPort};
    use super::*;
    use crate::mandate::Mandatary;

    #[tokio::test]
    async fn test_create_then_get_person() {
        let port = InMemoryPartyPort::new();
        let tenant = TenantId::DEFAULT;
        let person = port.create_person(Person::new(tenant, "Jane Doe")).await.unwrap();

        let found = port.get_person(tenant, person.id).await.unwrap();
        assert_eq!(found.name, "Jane Doe");
        assert!(port.party_exists(tenant, person.id).await.unwrap());
        assert!(port.get_organization(tenant, person.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_create_is_conflict() {
        let port = InMemoryPartyPort::new();
        let person = Person::new(TenantId::DEFAULT, "Jane Doe");
        port.create_person(person.clone()).await.unwrap();

        assert!(port.create_person(person).await.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_tenant_isolation() {
        let port = InMemoryPartyPort::new();
        let person = port.create_person(Person::new(TenantId::new(), "Jane Doe")).await.unwrap();

        assert!(port.get_person(TenantId::new(), person.id).await.unwrap_err().is_not_found());
        let page = port.get_parties(TenantId::new(), &PageRequest::first_page()).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_delete_party_cascades() {
        let port = InMemoryPartyPort::new();
        let tenant = TenantId::DEFAULT;
        let a = port.create_person(Person::new(tenant, "A")).await.unwrap();
        let b = port.create_organization(Organization::new(tenant, "B")).await.unwrap();
        let association = port
            .create_association(Association::new(tenant, "employer", b.id, a.id))
            .await
            .unwrap();
        let mut mandate = Mandate::new(tenant, "power_of_attorney");
        mandate.add_mandatary(Mandatary::new(a.id, "attorney"));
        let mandate = port.create_mandate(mandate).await.unwrap();

        assert!(port.delete_party(tenant, a.id, PartyType::Organization).await.unwrap_err().is_not_found());
        port.delete_party(tenant, a.id, PartyType::Person).await.unwrap();

        assert!(port.get_association(tenant, association.id).await.unwrap_err().is_not_found());
        assert!(port.get_mandate(tenant, mandate.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_association_requires_existing_parties() {
        let port = InMemoryPartyPort::new();
        let error = port
            .create_association(Association::new(TenantId::DEFAULT, "employer", PartyId::new(), PartyId::new()))
            .await
            .unwrap_err();
        assert!(matches!(error, PortError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_unavailable_port() {
        let port = InMemoryPartyPort::new();
        port.set_unavailable(true);
        let error = port.get_party(TenantId::DEFAULT, PartyId::new()).await.unwrap_err();
        assert!(error.is_transient());
    }

    #[tokio::test]
    async fn test_reference_port_counts_loads() {
        let port = InMemoryReferenceDataPort::new();
        port.get_codes(ReferenceDataKind::Gender).await.unwrap();
        port.get_codes(ReferenceDataKind::Title).await.unwrap();
        assert_eq!(port.load_count(), 2);
    }
}
