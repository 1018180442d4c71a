//! Specification service — orchestrates authorization, referential and
//! conflict rules across the specification aggregate and its child
//! collections.

use specreg_core::context::CurrentUser;
use specreg_core::error::{RegistryError, RegistryResult};
use specreg_core::models::additional_requirement::{
    AdditionalRequirement, CreateAdditionalRequirement, UpdateAdditionalRequirement,
};
use specreg_core::models::core_element::{CoreElement, CreateCoreElement, UpdateCoreElement};
use specreg_core::models::extension_element::{
    CreateExtensionElement, ExtensionElement, UpdateExtensionElement,
};
use specreg_core::models::specification::{
    CreateSpecification, RegistrationStatus, Specification, SpecificationWithGroup,
    UpdateSpecification,
};
use specreg_core::models::user::Role;
use specreg_core::repository::{
    AdditionalRequirementRepository, CoreElementRepository, ExtensionElementRepository,
    PageParams, PagedResult, SpecificationFilter, SpecificationRepository, UserGroupRepository,
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::policy;

/// Detail view: the header with its paginated child collections.
#[derive(Debug, Clone)]
pub struct SpecificationDetail {
    pub specification: SpecificationWithGroup,
    pub core_elements: PagedResult<CoreElement>,
    pub extension_elements: PagedResult<ExtensionElement>,
}

/// Convert a generic persistence failure into the service-level save
/// error; conflicts and the more specific codes pass through.
fn save_error(err: RegistryError) -> RegistryError {
    match err {
        RegistryError::Database(message) => RegistryError::BadRequest { message },
        other => other,
    }
}

pub struct SpecificationService<S, C, E, A, G> {
    spec_repo: S,
    core_repo: C,
    extension_repo: E,
    add_req_repo: A,
    group_repo: G,
}

impl<S, C, E, A, G> SpecificationService<S, C, E, A, G>
where
    S: SpecificationRepository,
    C: CoreElementRepository,
    E: ExtensionElementRepository,
    A: AdditionalRequirementRepository,
    G: UserGroupRepository,
{
    pub fn new(spec_repo: S, core_repo: C, extension_repo: E, add_req_repo: A, group_repo: G) -> Self {
        Self {
            spec_repo,
            core_repo,
            extension_repo,
            add_req_repo,
            group_repo,
        }
    }

    /// The ownership gate, consulted before every mutation of a
    /// specification or its children.
    async fn can_user_edit(
        &self,
        specification_id: Uuid,
        user: Option<&CurrentUser>,
    ) -> RegistryResult<bool> {
        let Some(user) = user else {
            warn!(%specification_id, "Permission check failed: no caller context");
            return Ok(false);
        };
        if user.is_admin() {
            return Ok(true);
        }

        let spec = match self.spec_repo.get_by_id(specification_id).await {
            Ok(with_group) => with_group.specification,
            Err(RegistryError::NotFound { .. }) => {
                warn!(%specification_id, "Permission check failed: specification not found");
                return Ok(false);
            }
            Err(other) => return Err(other),
        };

        let allowed = policy::can_edit(spec.user_group_id, Some(user));
        if !allowed {
            warn!(
                user_id = %user.user_id,
                role = %user.role,
                user_group = ?user.user_group_id,
                owner_group = ?spec.user_group_id,
                %specification_id,
                "User does not have permission to edit specification"
            );
        }
        Ok(allowed)
    }

    // --- Specification header operations ---

    /// Public listing: submitted and in-progress specifications are
    /// hidden.
    pub async fn list_public(
        &self,
        filter: &SpecificationFilter,
        page: PageParams,
    ) -> RegistryResult<PagedResult<SpecificationWithGroup>> {
        self.spec_repo.list_paginated(filter, page, false).await
    }

    /// Administrative listing: everything, including unreviewed rows.
    pub async fn list_admin(
        &self,
        filter: &SpecificationFilter,
        page: PageParams,
    ) -> RegistryResult<PagedResult<SpecificationWithGroup>> {
        self.spec_repo.list_paginated(filter, page, true).await
    }

    /// Listing scoped to the caller: admins see everything, users see
    /// their own group's specifications.
    pub async fn list_by_user_group(
        &self,
        user: Option<&CurrentUser>,
        page: PageParams,
    ) -> RegistryResult<PagedResult<SpecificationWithGroup>> {
        let Some(user) = user else {
            warn!("Group listing requested without caller context");
            return Err(RegistryError::Unauthorized);
        };

        match user.role {
            Role::Admin => {
                self.spec_repo
                    .list_paginated(&SpecificationFilter::default(), page, true)
                    .await
            }
            Role::User => {
                let Some(group_id) = user.user_group_id else {
                    warn!(user_id = %user.user_id, "User without group requested group listing");
                    return Err(RegistryError::forbidden("user has no group"));
                };
                self.spec_repo.list_by_group_paginated(group_id, page).await
            }
        }
    }

    /// Detail view by ID with paginated child collections. Not gated:
    /// any caller who knows the ID may read it.
    pub async fn get(
        &self,
        id: Uuid,
        core_page: PageParams,
        extension_page: PageParams,
    ) -> RegistryResult<SpecificationDetail> {
        let specification = self.spec_repo.get_by_id(id).await?;
        let core_elements = self
            .core_repo
            .list_by_specification_paginated(id, core_page)
            .await?;
        let extension_elements = self
            .extension_repo
            .list_by_specification_paginated(id, extension_page)
            .await?;

        Ok(SpecificationDetail {
            specification,
            core_elements,
            extension_elements,
        })
    }

    pub async fn create(
        &self,
        mut input: CreateSpecification,
        user: Option<&CurrentUser>,
    ) -> RegistryResult<Specification> {
        let Some(user) = user else {
            warn!("Attempt to create specification without caller context");
            return Err(RegistryError::Unauthorized);
        };

        if input
            .implementation_status
            .as_deref()
            .is_none_or(|s| s.trim().is_empty())
        {
            input.implementation_status = Some("Planned".into());
        }
        if input.registration_status.is_none() {
            input.registration_status = Some(RegistrationStatus::Submitted);
        }

        match user.role {
            Role::User => {
                // Users always create into their own group.
                let Some(group_id) = user.user_group_id else {
                    warn!(user_id = %user.user_id, "User without group attempted to create specification");
                    return Err(RegistryError::forbidden("user has no group"));
                };
                input.user_group_id = Some(group_id);
            }
            Role::Admin => {
                // Admins may target an explicit group (validated) or
                // create an unowned specification.
                if let Some(group_id) = input.user_group_id {
                    self.group_repo.get_by_id(group_id).await.map_err(|e| match e {
                        RegistryError::NotFound { .. } => {
                            RegistryError::ref_not_found("user group", group_id)
                        }
                        other => other,
                    })?;
                }
            }
        }

        self.spec_repo.create(input).await.map_err(|e| {
            error!(user_id = %user.user_id, "Failed to save new specification: {e}");
            save_error(e)
        })
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateSpecification,
        user: Option<&CurrentUser>,
    ) -> RegistryResult<Specification> {
        let Some(user) = user else {
            warn!(%id, "Attempt to update specification without caller context");
            return Err(RegistryError::Unauthorized);
        };

        let existing = self.spec_repo.get_by_id(id).await?.specification;

        if !self.can_user_edit(id, Some(user)).await? {
            return Err(RegistryError::forbidden("not an owner of this specification"));
        }

        if !user.is_admin() && input.changes_group(existing.user_group_id) {
            warn!(user_id = %user.user_id, %id, "Non-admin attempted to change owning group");
            return Err(RegistryError::forbidden(
                "only admins may change the owning group",
            ));
        }

        if let Some(Some(target)) = input.user_group_id {
            if Some(target) != existing.user_group_id {
                self.group_repo.get_by_id(target).await.map_err(|e| match e {
                    RegistryError::NotFound { .. } => {
                        RegistryError::ref_not_found("user group", target)
                    }
                    other => other,
                })?;
            }
        }

        self.spec_repo.update(id, input).await.map_err(|e| {
            error!(user_id = %user.user_id, %id, "Failed to save updated specification: {e}");
            save_error(e)
        })
    }

    pub async fn delete(&self, id: Uuid, user: Option<&CurrentUser>) -> RegistryResult<()> {
        // The delete path treats a missing context as Forbidden rather
        // than Unauthorized.
        let Some(user) = user else {
            warn!(%id, "Attempt to delete specification without caller context");
            return Err(RegistryError::forbidden("no caller context"));
        };

        self.spec_repo.get_by_id(id).await?;

        if !self.can_user_edit(id, Some(user)).await? {
            return Err(RegistryError::forbidden("not an owner of this specification"));
        }

        let has_core = self.spec_repo.has_core_elements(id).await?;
        let has_extension = self.spec_repo.has_extension_elements(id).await?;
        if has_core || has_extension {
            warn!(user_id = %user.user_id, %id, "Delete blocked by existing child elements");
            return Err(RegistryError::conflict(
                "specification still has core or extension elements",
            ));
        }

        self.spec_repo.delete(id).await.map_err(|e| {
            error!(user_id = %user.user_id, %id, "Failed to delete specification: {e}");
            RegistryError::DeleteFailed {
                entity: "specification".into(),
                id: id.to_string(),
            }
        })
    }

    /// Admin-only: set or clear the owning group of a specification.
    pub async fn assign_to_group(
        &self,
        specification_id: Uuid,
        user_group_id: Option<Uuid>,
        user: Option<&CurrentUser>,
    ) -> RegistryResult<()> {
        let Some(user) = user else {
            warn!(%specification_id, "Attempt to assign specification without caller context");
            return Err(RegistryError::Unauthorized);
        };
        if !user.is_admin() {
            warn!(
                user_id = %user.user_id,
                role = %user.role,
                %specification_id,
                "Non-admin attempted to assign specification to group"
            );
            return Err(RegistryError::forbidden("admin only"));
        }

        self.spec_repo.get_by_id(specification_id).await?;

        if let Some(group_id) = user_group_id {
            self.group_repo.get_by_id(group_id).await.map_err(|e| match e {
                RegistryError::NotFound { .. } => {
                    RegistryError::ref_not_found("user group", group_id)
                }
                other => other,
            })?;
        }

        self.spec_repo
            .assign_group(specification_id, user_group_id)
            .await
            .map_err(save_error)
    }

    // --- Core element operations ---

    pub async fn list_core_elements(
        &self,
        specification_id: Uuid,
        page: PageParams,
    ) -> RegistryResult<PagedResult<CoreElement>> {
        if !self.spec_repo.exists(specification_id).await? {
            return Err(RegistryError::not_found("specification", specification_id));
        }
        self.core_repo
            .list_by_specification_paginated(specification_id, page)
            .await
    }

    pub async fn get_core_element(
        &self,
        specification_id: Uuid,
        element_id: Uuid,
    ) -> RegistryResult<CoreElement> {
        self.core_repo
            .get_by_id_and_specification(element_id, specification_id)
            .await
    }

    pub async fn add_core_element(
        &self,
        specification_id: Uuid,
        mut input: CreateCoreElement,
        user: Option<&CurrentUser>,
    ) -> RegistryResult<CoreElement> {
        if user.is_none() {
            return Err(RegistryError::Unauthorized);
        }
        if !self.can_user_edit(specification_id, user).await? {
            return Err(RegistryError::forbidden("not an owner of this specification"));
        }
        if !self.spec_repo.exists(specification_id).await? {
            return Err(RegistryError::not_found("specification", specification_id));
        }
        if !self
            .core_repo
            .core_invoice_model_exists(&input.business_term_id)
            .await?
        {
            return Err(RegistryError::ref_not_found(
                "core invoice model entry",
                &input.business_term_id,
            ));
        }

        input.specification_id = specification_id;
        let element = self.core_repo.create(input).await.map_err(save_error)?;
        self.spec_repo.touch_modified(specification_id).await?;
        Ok(element)
    }

    pub async fn update_core_element(
        &self,
        specification_id: Uuid,
        element_id: Uuid,
        input: UpdateCoreElement,
        user: Option<&CurrentUser>,
    ) -> RegistryResult<CoreElement> {
        if user.is_none() {
            return Err(RegistryError::Unauthorized);
        }
        if !self.can_user_edit(specification_id, user).await? {
            return Err(RegistryError::forbidden("not an owner of this specification"));
        }

        let existing = self
            .core_repo
            .get_by_id_and_specification(element_id, specification_id)
            .await?;

        if let Some(term) = &input.business_term_id {
            if *term != existing.business_term_id
                && !self.core_repo.core_invoice_model_exists(term).await?
            {
                return Err(RegistryError::ref_not_found("core invoice model entry", term));
            }
        }

        let element = self
            .core_repo
            .update(element_id, specification_id, input)
            .await
            .map_err(save_error)?;
        self.spec_repo.touch_modified(specification_id).await?;
        Ok(element)
    }

    pub async fn delete_core_element(
        &self,
        specification_id: Uuid,
        element_id: Uuid,
        user: Option<&CurrentUser>,
    ) -> RegistryResult<()> {
        if user.is_none() {
            return Err(RegistryError::Unauthorized);
        }
        if !self.can_user_edit(specification_id, user).await? {
            return Err(RegistryError::forbidden("not an owner of this specification"));
        }

        self.core_repo
            .get_by_id_and_specification(element_id, specification_id)
            .await?;

        self.core_repo
            .delete(element_id, specification_id)
            .await
            .map_err(save_error)?;
        self.spec_repo.touch_modified(specification_id).await?;
        Ok(())
    }

    // --- Extension element operations ---

    pub async fn list_extension_elements(
        &self,
        specification_id: Uuid,
        page: PageParams,
    ) -> RegistryResult<PagedResult<ExtensionElement>> {
        if !self.spec_repo.exists(specification_id).await? {
            return Err(RegistryError::not_found("specification", specification_id));
        }
        self.extension_repo
            .list_by_specification_paginated(specification_id, page)
            .await
    }

    pub async fn get_extension_element(
        &self,
        specification_id: Uuid,
        element_id: Uuid,
    ) -> RegistryResult<ExtensionElement> {
        self.extension_repo
            .get_by_id_and_specification(element_id, specification_id)
            .await
    }

    pub async fn add_extension_element(
        &self,
        specification_id: Uuid,
        mut input: CreateExtensionElement,
        user: Option<&CurrentUser>,
    ) -> RegistryResult<ExtensionElement> {
        if user.is_none() {
            return Err(RegistryError::Unauthorized);
        }
        if !self.can_user_edit(specification_id, user).await? {
            return Err(RegistryError::forbidden("not an owner of this specification"));
        }
        if !self.spec_repo.exists(specification_id).await? {
            return Err(RegistryError::not_found("specification", specification_id));
        }
        if !self
            .extension_repo
            .extension_element_exists(&input.extension_component_id, &input.business_term_id)
            .await?
        {
            return Err(RegistryError::ref_not_found(
                "extension component model element",
                format!(
                    "{}/{}",
                    input.extension_component_id, input.business_term_id
                ),
            ));
        }

        input.specification_id = specification_id;
        let element = self.extension_repo.create(input).await.map_err(save_error)?;
        self.spec_repo.touch_modified(specification_id).await?;
        Ok(element)
    }

    pub async fn update_extension_element(
        &self,
        specification_id: Uuid,
        element_id: Uuid,
        input: UpdateExtensionElement,
        user: Option<&CurrentUser>,
    ) -> RegistryResult<ExtensionElement> {
        if user.is_none() {
            return Err(RegistryError::Unauthorized);
        }
        if !self.can_user_edit(specification_id, user).await? {
            return Err(RegistryError::forbidden("not an owner of this specification"));
        }

        let existing = self
            .extension_repo
            .get_by_id_and_specification(element_id, specification_id)
            .await?;

        // Re-validate the composite reference when either half changes.
        let target_component = input
            .extension_component_id
            .as_deref()
            .unwrap_or(&existing.extension_component_id);
        let target_term = input
            .business_term_id
            .as_deref()
            .unwrap_or(&existing.business_term_id);
        let reference_changed = target_component != existing.extension_component_id
            || target_term != existing.business_term_id;
        if reference_changed
            && !self
                .extension_repo
                .extension_element_exists(target_component, target_term)
                .await?
        {
            return Err(RegistryError::ref_not_found(
                "extension component model element",
                format!("{target_component}/{target_term}"),
            ));
        }

        let element = self
            .extension_repo
            .update(element_id, specification_id, input)
            .await
            .map_err(save_error)?;
        self.spec_repo.touch_modified(specification_id).await?;
        Ok(element)
    }

    pub async fn delete_extension_element(
        &self,
        specification_id: Uuid,
        element_id: Uuid,
        user: Option<&CurrentUser>,
    ) -> RegistryResult<()> {
        if user.is_none() {
            return Err(RegistryError::Unauthorized);
        }
        if !self.can_user_edit(specification_id, user).await? {
            return Err(RegistryError::forbidden("not an owner of this specification"));
        }

        self.extension_repo
            .get_by_id_and_specification(element_id, specification_id)
            .await?;

        self.extension_repo
            .delete(element_id, specification_id)
            .await
            .map_err(save_error)?;
        self.spec_repo.touch_modified(specification_id).await?;
        Ok(())
    }

    // --- Additional requirement operations ---

    pub async fn list_additional_requirements(
        &self,
        specification_id: Uuid,
    ) -> RegistryResult<Vec<AdditionalRequirement>> {
        if !self.spec_repo.exists(specification_id).await? {
            return Err(RegistryError::not_found("specification", specification_id));
        }
        self.add_req_repo
            .list_by_specification(specification_id)
            .await
    }

    pub async fn get_additional_requirement(
        &self,
        specification_id: Uuid,
        business_term_id: &str,
    ) -> RegistryResult<AdditionalRequirement> {
        self.add_req_repo.get(specification_id, business_term_id).await
    }

    pub async fn add_additional_requirement(
        &self,
        specification_id: Uuid,
        mut input: CreateAdditionalRequirement,
        user: Option<&CurrentUser>,
    ) -> RegistryResult<AdditionalRequirement> {
        if user.is_none() {
            return Err(RegistryError::Unauthorized);
        }
        if !self.can_user_edit(specification_id, user).await? {
            return Err(RegistryError::forbidden("not an owner of this specification"));
        }
        if !self.spec_repo.exists(specification_id).await? {
            return Err(RegistryError::not_found("specification", specification_id));
        }
        // Fast-fail duplicate check; the composite record key remains
        // the source of truth under concurrency.
        if self
            .add_req_repo
            .exists(specification_id, &input.business_term_id)
            .await?
        {
            return Err(RegistryError::conflict(format!(
                "additional requirement for term {} already exists",
                input.business_term_id
            )));
        }

        input.specification_id = specification_id;
        let requirement = self.add_req_repo.create(input).await.map_err(save_error)?;
        self.spec_repo.touch_modified(specification_id).await?;
        Ok(requirement)
    }

    pub async fn update_additional_requirement(
        &self,
        specification_id: Uuid,
        business_term_id: &str,
        input: UpdateAdditionalRequirement,
        user: Option<&CurrentUser>,
    ) -> RegistryResult<AdditionalRequirement> {
        if user.is_none() {
            return Err(RegistryError::Unauthorized);
        }
        if !self.can_user_edit(specification_id, user).await? {
            return Err(RegistryError::forbidden("not an owner of this specification"));
        }

        self.add_req_repo.get(specification_id, business_term_id).await?;

        let requirement = self
            .add_req_repo
            .update(specification_id, business_term_id, input)
            .await
            .map_err(save_error)?;
        self.spec_repo.touch_modified(specification_id).await?;
        Ok(requirement)
    }

    pub async fn delete_additional_requirement(
        &self,
        specification_id: Uuid,
        business_term_id: &str,
        user: Option<&CurrentUser>,
    ) -> RegistryResult<()> {
        if user.is_none() {
            return Err(RegistryError::Unauthorized);
        }
        if !self.can_user_edit(specification_id, user).await? {
            return Err(RegistryError::forbidden("not an owner of this specification"));
        }

        self.add_req_repo.get(specification_id, business_term_id).await?;

        self.add_req_repo
            .delete(specification_id, business_term_id)
            .await
            .map_err(save_error)?;
        self.spec_repo.touch_modified(specification_id).await?;
        Ok(())
    }
}
