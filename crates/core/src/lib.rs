//! `kaziflow-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers, the domain error model, and the validated value
//! objects shared by the authentication and session layers.

pub mod code;
pub mod email;
pub mod error;
pub mod id;
pub mod phone;
pub mod pin;

pub use code::CompanyCode;
pub use email::EmailAddress;
pub use error::{DomainError, DomainResult};
pub use id::{ActorId, CommunicationId, TenantId};
pub use phone::{DialCode, PhoneNumber};
pub use pin::Pin;
