//! Party service
//!
//! Request-scoped operations on persons, organizations, associations and
//! mandates. Every operation is scoped to a tenant. Writes are validated
//! with [`PartyValidator`] before they reach the [`PartyPort`].
//!
//! Port failures are translated in a fixed order: a missing entity becomes
//! the matching `*NotFound` error, an id clash the matching `Duplicate*`
//! error, a rejected reference `InvalidArgument`, and anything else
//! `ServiceUnavailable` carrying the original error as its source.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use core_kernel::{AssociationId, MandateId, PartyId, PortError, TenantId};

use crate::association::Association;
use crate::error::PartyError;
use crate::mandate::Mandate;
use crate::organization::Organization;
use crate::party::{PageRequest, Party, PartyPage, PartyType};
use crate::person::Person;
use crate::ports::PartyPort;
use crate::reference_service::PartyReferenceService;
use crate::validation::{PartyValidator, ValidationResult};

/// Maps a port error onto the domain error for one entity kind
fn translate(
    error: PortError,
    context: &str,
    not_found: impl FnOnce(String) -> PartyError,
    duplicate: impl FnOnce(String) -> PartyError,
    id: impl ToString,
) -> PartyError {
    match error {
        PortError::NotFound { .. } => not_found(id.to_string()),
        PortError::Conflict { .. } => duplicate(id.to_string()),
        PortError::Validation { message, field } => {
            PartyError::invalid_argument(field.unwrap_or_else(|| "request".to_string()), message)
        }
        other => {
            warn!(error = %other, "{}", context);
            PartyError::service_unavailable(context, other)
        }
    }
}

/// Application service for parties and their relationships
#[derive(Clone)]
pub struct PartyService {
    port: Arc<dyn PartyPort>,
    validator: PartyValidator,
}

impl PartyService {
    /// Creates a new party service
    ///
    /// # Arguments
    ///
    /// * `port` - The party persistence port
    /// * `reference` - The reference data service used for validation
    pub fn new(port: Arc<dyn PartyPort>, reference: Arc<PartyReferenceService>) -> Self {
        Self {
            port,
            validator: PartyValidator::new(reference),
        }
    }

    /// Returns the underlying port, e.g. for health checks
    pub fn port(&self) -> &Arc<dyn PartyPort> {
        &self.port
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    pub async fn validate_person(&self, person: &Person) -> Result<ValidationResult, PartyError> {
        self.validator.validate_person(person).await
    }

    pub async fn validate_organization(&self, organization: &Organization) -> Result<ValidationResult, PartyError> {
        self.validator.validate_organization(organization).await
    }

    pub async fn validate_association(&self, association: &Association) -> Result<ValidationResult, PartyError> {
        self.validator.validate_association(association).await
    }

    pub async fn validate_mandate(&self, mandate: &Mandate) -> Result<ValidationResult, PartyError> {
        self.validator.validate_mandate(mandate).await
    }

    // ------------------------------------------------------------------
    // Parties
    // ------------------------------------------------------------------

    pub async fn party_exists(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PartyError> {
        self.port
            .party_exists(tenant_id, id)
            .await
            .map_err(|e| PartyError::service_unavailable(format!("Failed to check whether the party ({}) exists", id), e))
    }

    #[instrument(skip(self))]
    pub async fn get_party(&self, tenant_id: TenantId, id: PartyId) -> Result<Party, PartyError> {
        self.port.get_party(tenant_id, id).await.map_err(|e| {
            translate(
                e,
                &format!("Failed to retrieve the party ({})", id),
                PartyError::PartyNotFound,
                PartyError::DuplicateParty,
                id,
            )
        })
    }

    /// Lists parties; the page size is capped at 100
    #[instrument(skip(self))]
    pub async fn get_parties(&self, tenant_id: TenantId, request: PageRequest) -> Result<PartyPage<Party>, PartyError> {
        self.port
            .get_parties(tenant_id, &request.normalized())
            .await
            .map_err(|e| PartyError::service_unavailable("Failed to retrieve the parties", e))
    }

    // ------------------------------------------------------------------
    // Persons
    // ------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn get_person(&self, tenant_id: TenantId, id: PartyId) -> Result<Person, PartyError> {
        self.port.get_person(tenant_id, id).await.map_err(|e| {
            translate(
                e,
                &format!("Failed to retrieve the person ({})", id),
                PartyError::PersonNotFound,
                PartyError::DuplicateParty,
                id,
            )
        })
    }

    /// Lists persons; the page size is capped at 100
    #[instrument(skip(self))]
    pub async fn get_persons(&self, tenant_id: TenantId, request: PageRequest) -> Result<PartyPage<Person>, PartyError> {
        self.port
            .get_persons(tenant_id, &request.normalized())
            .await
            .map_err(|e| PartyError::service_unavailable("Failed to retrieve the persons", e))
    }

    /// Validates and stores a new person owned by the tenant
    #[instrument(skip(self, person), fields(person_id = %person.id))]
    pub async fn create_person(&self, tenant_id: TenantId, mut person: Person) -> Result<Person, PartyError> {
        person.tenant_id = tenant_id;
        person.update_name();
        self.validator.validate_person(&person).await?.into_result("person")?;

        let id = person.id;
        let person = self.port.create_person(person).await.map_err(|e| {
            translate(
                e,
                &format!("Failed to create the person ({})", id),
                PartyError::PersonNotFound,
                PartyError::DuplicateParty,
                id,
            )
        })?;

        info!(person_id = %person.id, "Created person");
        Ok(person)
    }

    /// Validates and replaces an existing person
    #[instrument(skip(self, person), fields(person_id = %person.id))]
    pub async fn update_person(&self, tenant_id: TenantId, mut person: Person) -> Result<Person, PartyError> {
        person.tenant_id = tenant_id;
        person.update_name();
        self.validator.validate_person(&person).await?.into_result("person")?;

        let id = person.id;
        let person = self.port.update_person(person).await.map_err(|e| {
            translate(
                e,
                &format!("Failed to update the person ({})", id),
                PartyError::PersonNotFound,
                PartyError::DuplicateParty,
                id,
            )
        })?;

        info!(person_id = %person.id, "Updated person");
        Ok(person)
    }

    #[instrument(skip(self))]
    pub async fn delete_person(&self, tenant_id: TenantId, id: PartyId) -> Result<(), PartyError> {
        self.port
            .delete_party(tenant_id, id, PartyType::Person)
            .await
            .map_err(|e| {
                translate(
                    e,
                    &format!("Failed to delete the person ({})", id),
                    PartyError::PersonNotFound,
                    PartyError::DuplicateParty,
                    id,
                )
            })?;

        info!(person_id = %id, "Deleted person");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Organizations
    // ------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn get_organization(&self, tenant_id: TenantId, id: PartyId) -> Result<Organization, PartyError> {
        self.port.get_organization(tenant_id, id).await.map_err(|e| {
            translate(
                e,
                &format!("Failed to retrieve the organization ({})", id),
                PartyError::OrganizationNotFound,
                PartyError::DuplicateParty,
                id,
            )
        })
    }

    /// Lists organizations; the page size is capped at 100
    #[instrument(skip(self))]
    pub async fn get_organizations(
        &self,
        tenant_id: TenantId,
        request: PageRequest,
    ) -> Result<PartyPage<Organization>, PartyError> {
        self.port
            .get_organizations(tenant_id, &request.normalized())
            .await
            .map_err(|e| PartyError::service_unavailable("Failed to retrieve the organizations", e))
    }

    /// Validates and stores a new organization owned by the tenant
    #[instrument(skip(self, organization), fields(organization_id = %organization.id))]
    pub async fn create_organization(
        &self,
        tenant_id: TenantId,
        mut organization: Organization,
    ) -> Result<Organization, PartyError> {
        organization.tenant_id = tenant_id;
        self.validator
            .validate_organization(&organization)
            .await?
            .into_result("organization")?;

        let id = organization.id;
        let organization = self.port.create_organization(organization).await.map_err(|e| {
            translate(
                e,
                &format!("Failed to create the organization ({})", id),
                PartyError::OrganizationNotFound,
                PartyError::DuplicateParty,
                id,
            )
        })?;

        info!(organization_id = %organization.id, "Created organization");
        Ok(organization)
    }

    /// Validates and replaces an existing organization
    #[instrument(skip(self, organization), fields(organization_id = %organization.id))]
    pub async fn update_organization(
        &self,
        tenant_id: TenantId,
        mut organization: Organization,
    ) -> Result<Organization, PartyError> {
        organization.tenant_id = tenant_id;
        self.validator
            .validate_organization(&organization)
            .await?
            .into_result("organization")?;

        let id = organization.id;
        let organization = self.port.update_organization(organization).await.map_err(|e| {
            translate(
                e,
                &format!("Failed to update the organization ({})", id),
                PartyError::OrganizationNotFound,
                PartyError::DuplicateParty,
                id,
            )
        })?;

        info!(organization_id = %organization.id, "Updated organization");
        Ok(organization)
    }

    #[instrument(skip(self))]
    pub async fn delete_organization(&self, tenant_id: TenantId, id: PartyId) -> Result<(), PartyError> {
        self.port
            .delete_party(tenant_id, id, PartyType::Organization)
            .await
            .map_err(|e| {
                translate(
                    e,
                    &format!("Failed to delete the organization ({})", id),
                    PartyError::OrganizationNotFound,
                    PartyError::DuplicateParty,
                    id,
                )
            })?;

        info!(organization_id = %id, "Deleted organization");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Associations
    // ------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn get_association(&self, tenant_id: TenantId, id: AssociationId) -> Result<Association, PartyError> {
        self.port.get_association(tenant_id, id).await.map_err(|e| {
            translate(
                e,
                &format!("Failed to retrieve the association ({})", id),
                PartyError::AssociationNotFound,
                PartyError::DuplicateAssociation,
                id,
            )
        })
    }

    /// Lists the associations of a party
    ///
    /// Returns `PartyNotFound` if the party does not exist.
    #[instrument(skip(self))]
    pub async fn get_associations_for_party(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        request: PageRequest,
    ) -> Result<PartyPage<Association>, PartyError> {
        if !self.party_exists(tenant_id, party_id).await? {
            return Err(PartyError::PartyNotFound(party_id.to_string()));
        }

        self.port
            .get_associations_for_party(tenant_id, party_id, &request.normalized())
            .await
            .map_err(|e| {
                PartyError::service_unavailable(
                    format!("Failed to retrieve the associations for the party ({})", party_id),
                    e,
                )
            })
    }

    #[instrument(skip(self, association), fields(association_id = %association.id))]
    pub async fn create_association(
        &self,
        tenant_id: TenantId,
        mut association: Association,
    ) -> Result<Association, PartyError> {
        association.tenant_id = tenant_id;
        self.validator
            .validate_association(&association)
            .await?
            .into_result("association")?;

        let id = association.id;
        let association = self.port.create_association(association).await.map_err(|e| {
            translate(
                e,
                &format!("Failed to create the association ({})", id),
                PartyError::AssociationNotFound,
                PartyError::DuplicateAssociation,
                id,
            )
        })?;

        info!(association_id = %association.id, "Created association");
        Ok(association)
    }

    #[instrument(skip(self, association), fields(association_id = %association.id))]
    pub async fn update_association(
        &self,
        tenant_id: TenantId,
        mut association: Association,
    ) -> Result<Association, PartyError> {
        association.tenant_id = tenant_id;
        self.validator
            .validate_association(&association)
            .await?
            .into_result("association")?;

        let id = association.id;
        self.port.update_association(association).await.map_err(|e| {
            translate(
                e,
                &format!("Failed to update the association ({})", id),
                PartyError::AssociationNotFound,
                PartyError::DuplicateAssociation,
                id,
            )
        })
    }

    #[instrument(skip(self))]
    pub async fn delete_association(&self, tenant_id: TenantId, id: AssociationId) -> Result<(), PartyError> {
        self.port.delete_association(tenant_id, id).await.map_err(|e| {
            translate(
                e,
                &format!("Failed to delete the association ({})", id),
                PartyError::AssociationNotFound,
                PartyError::DuplicateAssociation,
                id,
            )
        })
    }

    // ------------------------------------------------------------------
    // Mandates
    // ------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn get_mandate(&self, tenant_id: TenantId, id: MandateId) -> Result<Mandate, PartyError> {
        self.port.get_mandate(tenant_id, id).await.map_err(|e| {
            translate(
                e,
                &format!("Failed to retrieve the mandate ({})", id),
                PartyError::MandateNotFound,
                PartyError::DuplicateMandate,
                id,
            )
        })
    }

    /// Lists the mandates where the party is a mandatary
    ///
    /// Returns `PartyNotFound` if the party does not exist.
    #[instrument(skip(self))]
    pub async fn get_mandates_for_party(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        request: PageRequest,
    ) -> Result<PartyPage<Mandate>, PartyError> {
        if !self.party_exists(tenant_id, party_id).await? {
            return Err(PartyError::PartyNotFound(party_id.to_string()));
        }

        self.port
            .get_mandates_for_party(tenant_id, party_id, &request.normalized())
            .await
            .map_err(|e| {
                PartyError::service_unavailable(
                    format!("Failed to retrieve the mandates for the party ({})", party_id),
                    e,
                )
            })
    }

    #[instrument(skip(self, mandate), fields(mandate_id = %mandate.id))]
    pub async fn create_mandate(&self, tenant_id: TenantId, mut mandate: Mandate) -> Result<Mandate, PartyError> {
        mandate.tenant_id = tenant_id;
        self.validator.validate_mandate(&mandate).await?.into_result("mandate")?;

        let id = mandate.id;
        let mandate = self.port.create_mandate(mandate).await.map_err(|e| {
            translate(
                e,
                &format!("Failed to create the mandate ({})", id),
                PartyError::MandateNotFound,
                PartyError::DuplicateMandate,
                id,
            )
        })?;

        info!(mandate_id = %mandate.id, "Created mandate");
        Ok(mandate)
    }

    #[instrument(skip(self, mandate), fields(mandate_id = %mandate.id))]
    pub async fn update_mandate(&self, tenant_id: TenantId, mut mandate: Mandate) -> Result<Mandate, PartyError> {
        mandate.tenant_id = tenant_id;
        self.validator.validate_mandate(&mandate).await?.into_result("mandate")?;

        let id = mandate.id;
        self.port.update_mandate(mandate).await.map_err(|e| {
            translate(
                e,
                &format!("Failed to update the mandate ({})", id),
                PartyError::MandateNotFound,
                PartyError::DuplicateMandate,
                id,
            )
        })
    }

    #[instrument(skip(self))]
    pub async fn delete_mandate(&self, tenant_id: TenantId, id: MandateId) -> Result<(), PartyError> {
        self.port.delete_mandate(tenant_id, id).await.map_err(|e| {
            translate(
                e,
                &format!("Failed to delete the mandate ({})", id),
                PartyError::MandateNotFound,
                PartyError::DuplicateMandate,
                id,
            )
        })
    }
}
