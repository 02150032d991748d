//! Field Auth SDK
//!
//! This crate provides the public API for the `field_auth` module:
//!
//! - [`FieldResolver`] - Resolver trait wrapped by the authorization guard
//! - [`CheckSpec`], [`OperatorKind`] - Check declarations
//! - [`PathStep`] - Compiled field-path steps
//! - [`Decision`], [`Denial`], [`DenyReason`] - Authorization outcomes
//! - [`FieldAuthError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use field_auth_sdk::{CheckSpec, FieldResolver};
//!
//! let checks = vec![CheckSpec::new("role", "EQUAL", "admin")];
//! let guarded = registry.wrap("Query", "salary", Arc::new(resolver));
//!
//! let value = guarded.resolve(&root, &args, &context, &info).await?;
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod error;
pub mod models;

// Re-export main types at crate root
pub use api::FieldResolver;
pub use error::FieldAuthError;
pub use models::{CheckSpec, Decision, Denial, DenyReason, OperatorKind, PathStep, ResolveInfo};
