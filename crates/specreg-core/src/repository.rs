//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Child-element repositories scope
//! every lookup to the parent specification ID so that a child is never
//! visible under a different parent.

use std::str::FromStr;

use uuid::Uuid;

use crate::error::RegistryResult;
use crate::models::{
    additional_requirement::{
        AdditionalRequirement, CreateAdditionalRequirement, UpdateAdditionalRequirement,
    },
    core_element::{CoreElement, CreateCoreElement, UpdateCoreElement},
    extension_element::{CreateExtensionElement, ExtensionElement, UpdateExtensionElement},
    extension_model::{ExtensionComponent, ExtensionComponentElement},
    invoice_model::CoreInvoiceModelEntry,
    specification::{
        CreateSpecification, Specification, SpecificationWithGroup, UpdateSpecification,
    },
    user::{CreateUser, UpdateUser, User},
    user_group::{CreateUserGroup, UpdateUserGroup, UserGroup, UserGroupSummary},
};

/// Upper bound on the page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Default page size when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Pagination parameters for list queries.
///
/// Values are clamped at construction: page number has a floor of 1,
/// page size is clamped to `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    page_number: u32,
    page_size: u32,
}

impl PageParams {
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number: page_number.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows to skip before the first item of this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number - 1) * u64::from(self.page_size)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// A paginated result set.
///
/// Constructed from the page items and the total matching count taken
/// before pagination was applied.
#[derive(Debug, Clone)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_number: u32,
    pub page_size: u32,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total_count: u64, page: PageParams) -> Self {
        Self {
            items,
            total_count,
            page_number: page.page_number(),
            page_size: page.page_size(),
        }
    }

    pub fn total_pages(&self) -> u32 {
        let total = self.total_count.div_ceil(u64::from(self.page_size));
        u32::try_from(total).unwrap_or(u32::MAX)
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }
}

/// Fields the specification listing can be sorted by.
///
/// Parsing is case-insensitive; an unrecognized field name parses to an
/// error and callers fall back to the default sort (descending
/// modified-date).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Purpose,
    Sector,
    Country,
    SpecificationType,
    ModifiedDate,
    CreatedDate,
    Identifier,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" | "specificationname" => Ok(Self::Name),
            "purpose" => Ok(Self::Purpose),
            "sector" => Ok(Self::Sector),
            "country" => Ok(Self::Country),
            "type" | "specificationtype" => Ok(Self::SpecificationType),
            "modifieddate" => Ok(Self::ModifiedDate),
            "createddate" => Ok(Self::CreatedDate),
            "identifier" | "specificationidentifier" => Ok(Self::Identifier),
            other => Err(format!("unknown sort field: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Query filters for the specification listing.
#[derive(Debug, Clone, Default)]
pub struct SpecificationFilter {
    /// Case-insensitive substring match across name, purpose and sector.
    pub search_term: Option<String>,
    /// `None` falls back to descending modified-date.
    pub sort_by: Option<SortField>,
    pub sort_order: SortOrder,
    /// Exact case-insensitive matches.
    pub specification_type: Option<String>,
    pub sector: Option<String>,
    pub country: Option<String>,
    /// Case-insensitive substring matches against the business-term IDs
    /// of the respective child collections, translated into parent-ID
    /// membership predicates.
    pub core_business_term_id: Option<String>,
    pub extension_business_term_id: Option<String>,
    pub add_req_business_term_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Specification aggregate
// ---------------------------------------------------------------------------

pub trait SpecificationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateSpecification,
    ) -> impl Future<Output = RegistryResult<Specification>> + Send;

    fn get_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = RegistryResult<SpecificationWithGroup>> + Send;

    fn update(
        &self,
        id: Uuid,
        input: UpdateSpecification,
    ) -> impl Future<Output = RegistryResult<Specification>> + Send;

    /// Set or clear the owning group and stamp the modified date.
    fn assign_group(
        &self,
        id: Uuid,
        user_group_id: Option<Uuid>,
    ) -> impl Future<Output = RegistryResult<()>> + Send;

    fn delete(&self, id: Uuid) -> impl Future<Output = RegistryResult<()>> + Send;

    /// Filtered, sorted, paginated listing. When
    /// `include_submitted_and_in_progress` is false, rows whose
    /// registration status is (case-insensitively) "submitted" or
    /// "in progress" are excluded; rows without a status are always
    /// included.
    fn list_paginated(
        &self,
        filter: &SpecificationFilter,
        page: PageParams,
        include_submitted_and_in_progress: bool,
    ) -> impl Future<Output = RegistryResult<PagedResult<SpecificationWithGroup>>> + Send;

    /// Unpaginated listing with the same status filter, sorted by
    /// descending modified-date.
    fn list_all(
        &self,
        include_submitted_and_in_progress: bool,
    ) -> impl Future<Output = RegistryResult<Vec<SpecificationWithGroup>>> + Send;

    /// All specifications owned by a group, sorted by business
    /// identifier.
    fn list_by_group(
        &self,
        user_group_id: Uuid,
    ) -> impl Future<Output = RegistryResult<Vec<SpecificationWithGroup>>> + Send;

    fn list_by_group_paginated(
        &self,
        user_group_id: Uuid,
        page: PageParams,
    ) -> impl Future<Output = RegistryResult<PagedResult<SpecificationWithGroup>>> + Send;

    fn exists(&self, id: Uuid) -> impl Future<Output = RegistryResult<bool>> + Send;

    fn has_core_elements(&self, id: Uuid) -> impl Future<Output = RegistryResult<bool>> + Send;

    fn has_extension_elements(&self, id: Uuid)
    -> impl Future<Output = RegistryResult<bool>> + Send;

    /// Refresh the modified date. Best-effort: a no-op when the row no
    /// longer exists.
    fn touch_modified(&self, id: Uuid) -> impl Future<Output = RegistryResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Child collections (scoped to a parent specification)
// ---------------------------------------------------------------------------

pub trait CoreElementRepository: Send + Sync {
    fn create(
        &self,
        input: CreateCoreElement,
    ) -> impl Future<Output = RegistryResult<CoreElement>> + Send;

    fn get_by_id_and_specification(
        &self,
        id: Uuid,
        specification_id: Uuid,
    ) -> impl Future<Output = RegistryResult<CoreElement>> + Send;

    fn update(
        &self,
        id: Uuid,
        specification_id: Uuid,
        input: UpdateCoreElement,
    ) -> impl Future<Output = RegistryResult<CoreElement>> + Send;

    fn delete(
        &self,
        id: Uuid,
        specification_id: Uuid,
    ) -> impl Future<Output = RegistryResult<()>> + Send;

    /// All core elements of a specification, ordered by the referenced
    /// model entry's row position, then element ID.
    fn list_by_specification(
        &self,
        specification_id: Uuid,
    ) -> impl Future<Output = RegistryResult<Vec<CoreElement>>> + Send;

    fn list_by_specification_paginated(
        &self,
        specification_id: Uuid,
        page: PageParams,
    ) -> impl Future<Output = RegistryResult<PagedResult<CoreElement>>> + Send;

    fn core_invoice_model_exists(
        &self,
        business_term_id: &str,
    ) -> impl Future<Output = RegistryResult<bool>> + Send;
}

pub trait ExtensionElementRepository: Send + Sync {
    fn create(
        &self,
        input: CreateExtensionElement,
    ) -> impl Future<Output = RegistryResult<ExtensionElement>> + Send;

    fn get_by_id_and_specification(
        &self,
        id: Uuid,
        specification_id: Uuid,
    ) -> impl Future<Output = RegistryResult<ExtensionElement>> + Send;

    fn update(
        &self,
        id: Uuid,
        specification_id: Uuid,
        input: UpdateExtensionElement,
    ) -> impl Future<Output = RegistryResult<ExtensionElement>> + Send;

    fn delete(
        &self,
        id: Uuid,
        specification_id: Uuid,
    ) -> impl Future<Output = RegistryResult<()>> + Send;

    /// All extension elements of a specification, ordered by the
    /// composite reference `(extension_component_id, business_term_id)`.
    fn list_by_specification(
        &self,
        specification_id: Uuid,
    ) -> impl Future<Output = RegistryResult<Vec<ExtensionElement>>> + Send;

    fn list_by_specification_paginated(
        &self,
        specification_id: Uuid,
        page: PageParams,
    ) -> impl Future<Output = RegistryResult<PagedResult<ExtensionElement>>> + Send;

    fn extension_element_exists(
        &self,
        extension_component_id: &str,
        business_term_id: &str,
    ) -> impl Future<Output = RegistryResult<bool>> + Send;
}

pub trait AdditionalRequirementRepository: Send + Sync {
    fn create(
        &self,
        input: CreateAdditionalRequirement,
    ) -> impl Future<Output = RegistryResult<AdditionalRequirement>> + Send;

    fn get(
        &self,
        specification_id: Uuid,
        business_term_id: &str,
    ) -> impl Future<Output = RegistryResult<AdditionalRequirement>> + Send;

    fn exists(
        &self,
        specification_id: Uuid,
        business_term_id: &str,
    ) -> impl Future<Output = RegistryResult<bool>> + Send;

    fn update(
        &self,
        specification_id: Uuid,
        business_term_id: &str,
        input: UpdateAdditionalRequirement,
    ) -> impl Future<Output = RegistryResult<AdditionalRequirement>> + Send;

    fn delete(
        &self,
        specification_id: Uuid,
        business_term_id: &str,
    ) -> impl Future<Output = RegistryResult<()>> + Send;

    /// All additional requirements of a specification, ordered by row
    /// position.
    fn list_by_specification(
        &self,
        specification_id: Uuid,
    ) -> impl Future<Output = RegistryResult<Vec<AdditionalRequirement>>> + Send;
}

// ---------------------------------------------------------------------------
// Shared reference models (read-only for the registry)
// ---------------------------------------------------------------------------

pub trait CoreInvoiceModelRepository: Send + Sync {
    fn get(
        &self,
        business_term_id: &str,
    ) -> impl Future<Output = RegistryResult<CoreInvoiceModelEntry>> + Send;

    /// Ordered by row position, then business-term ID.
    fn list_paginated(
        &self,
        page: PageParams,
    ) -> impl Future<Output = RegistryResult<PagedResult<CoreInvoiceModelEntry>>> + Send;
}

pub trait ExtensionModelRepository: Send + Sync {
    fn list_components(
        &self,
    ) -> impl Future<Output = RegistryResult<Vec<ExtensionComponent>>> + Send;

    fn list_elements(
        &self,
        extension_component_id: &str,
    ) -> impl Future<Output = RegistryResult<Vec<ExtensionComponentElement>>> + Send;
}

// ---------------------------------------------------------------------------
// Users & groups
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = RegistryResult<User>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = RegistryResult<User>> + Send;

    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = RegistryResult<Option<User>>> + Send;

    fn get_by_email(&self, email: &str)
    -> impl Future<Output = RegistryResult<Option<User>>> + Send;

    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = RegistryResult<User>> + Send;

    fn delete(&self, id: Uuid) -> impl Future<Output = RegistryResult<()>> + Send;

    /// Ordered by username.
    fn list(&self) -> impl Future<Output = RegistryResult<Vec<User>>> + Send;

    fn list_by_group(
        &self,
        user_group_id: Uuid,
    ) -> impl Future<Output = RegistryResult<Vec<User>>> + Send;
}

pub trait UserGroupRepository: Send + Sync {
    fn create(
        &self,
        input: CreateUserGroup,
    ) -> impl Future<Output = RegistryResult<UserGroup>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = RegistryResult<UserGroup>> + Send;

    fn get_by_name(
        &self,
        group_name: &str,
    ) -> impl Future<Output = RegistryResult<Option<UserGroup>>> + Send;

    fn update(
        &self,
        id: Uuid,
        input: UpdateUserGroup,
    ) -> impl Future<Output = RegistryResult<UserGroup>> + Send;

    /// Restricted delete: fails with a conflict while users or
    /// specifications still reference the group.
    fn delete(&self, id: Uuid) -> impl Future<Output = RegistryResult<()>> + Send;

    /// Ordered by group name.
    fn list(&self) -> impl Future<Output = RegistryResult<Vec<UserGroup>>> + Send;

    fn list_with_counts(
        &self,
    ) -> impl Future<Output = RegistryResult<Vec<UserGroupSummary>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_clamp_floor() {
        let page = PageParams::new(0, 0);
        assert_eq!(page.page_number(), 1);
        assert_eq!(page.page_size(), 1);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn page_params_clamp_ceiling() {
        let page = PageParams::new(3, 500);
        assert_eq!(page.page_size(), MAX_PAGE_SIZE);
        assert_eq!(page.offset(), 2 * u64::from(MAX_PAGE_SIZE));
    }

    #[test]
    fn paged_result_derives_total_pages() {
        let page = PageParams::new(1, 10);
        let result: PagedResult<u32> = PagedResult::new(vec![], 25, page);
        assert_eq!(result.total_pages(), 3);

        let exact: PagedResult<u32> = PagedResult::new(vec![], 30, page);
        assert_eq!(exact.total_pages(), 3);

        let empty: PagedResult<u32> = PagedResult::new(vec![], 0, page);
        assert_eq!(empty.total_pages(), 0);
    }

    #[test]
    fn paged_result_navigation_flags() {
        // 25 rows, 10 per page -> 3 pages.
        let first: PagedResult<u32> = PagedResult::new(vec![], 25, PageParams::new(1, 10));
        assert!(first.has_next());
        assert!(!first.has_previous());

        let middle: PagedResult<u32> = PagedResult::new(vec![], 25, PageParams::new(2, 10));
        assert!(middle.has_next());
        assert!(middle.has_previous());

        let last: PagedResult<u32> = PagedResult::new(vec![], 25, PageParams::new(3, 10));
        assert!(!last.has_next());
        assert!(last.has_previous());
    }

    #[test]
    fn sort_field_parses_case_insensitively() {
        assert_eq!("Country".parse::<SortField>(), Ok(SortField::Country));
        assert_eq!(
            "MODIFIEDDATE".parse::<SortField>(),
            Ok(SortField::ModifiedDate)
        );
        assert_eq!(
            "specificationName".parse::<SortField>(),
            Ok(SortField::Name)
        );
        assert!("zzz".parse::<SortField>().is_err());
    }

    #[test]
    fn sort_order_defaults_to_ascending() {
        assert_eq!(SortOrder::default(), SortOrder::Asc);
        assert_eq!("DESC".parse::<SortOrder>(), Ok(SortOrder::Desc));
    }
}
