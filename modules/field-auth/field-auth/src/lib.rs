//! Field Auth
//!
//! Field-level authorization guard for declarative API schemas. Each
//! protected field carries a list of comparison checks against the request
//! context; the guard compiles them once and enforces them on every
//! resolution.
//!
//! - [`config`] - Guard configuration
//! - [`domain::path`] - Field-path compiler
//! - [`domain::evaluator`] - Check evaluation
//! - [`domain::guard`] - Guarded resolver
//! - [`domain::registry`] - Per-schema guard registry
//! - [`sdl`] - `@auth` directive declaration
//!
//! ## Usage
//!
//! ```ignore
//! use field_auth::{FieldAuthConfig, GuardDeclarations, GuardRegistry};
//!
//! let config = FieldAuthConfig::from_yaml(&config_yaml)?;
//! let declarations = GuardDeclarations::from_yaml(&guards_yaml)?;
//! let registry = GuardRegistry::build(&config, &declarations)?;
//!
//! let salary = registry.wrap("Employee", "salary", Arc::new(DefaultFieldResolver));
//! let value = salary.resolve(&employee, &args, &context, &info).await?;
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod sdl;

pub use config::{FieldAuthConfig, GreaterThanMode};
pub use domain::{
    CompiledCheck, CompiledPath, DefaultFieldResolver, Evaluator, GuardDeclarations,
    GuardRegistry, GuardedResolver, TypeDeclaration, compile_check, compile_checks, compile_path,
    walk,
};
pub use sdl::directive_sdl;
