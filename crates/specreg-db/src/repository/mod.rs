//! SurrealDB repository implementations.

mod additional_requirement;
mod core_element;
mod extension_element;
mod extension_model;
mod invoice_model;
mod specification;
mod user;
mod user_group;

pub use additional_requirement::SurrealAdditionalRequirementRepository;
pub use core_element::SurrealCoreElementRepository;
pub use extension_element::SurrealExtensionElementRepository;
pub use extension_model::SurrealExtensionModelRepository;
pub use invoice_model::SurrealCoreInvoiceModelRepository;
pub use specification::SurrealSpecificationRepository;
pub use user::SurrealUserRepository;
pub use user_group::SurrealUserGroupRepository;
