//! Business-rule services for the specification registry.
//!
//! Services are generic over the `specreg-core` repository traits so
//! this crate carries no database dependency. Every mutating operation
//! takes the caller's context as an explicit parameter and applies the
//! ownership gate before touching a specification or its children.

pub mod groups;
pub mod policy;
pub mod specification;
pub mod users;

pub use groups::UserGroupService;
pub use policy::can_edit;
pub use specification::{SpecificationDetail, SpecificationService};
pub use users::{RegisterUser, UserService};
