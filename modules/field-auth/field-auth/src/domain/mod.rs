//! Domain layer for the field auth guard.
//!
//! - [`path`] - field-path compiler
//! - [`walk`](mod@walk) - resolves compiled paths against a request context
//! - [`coerce`] - comparison semantics against declared literals
//! - [`evaluator`] - check compilation and authorization
//! - [`guard`] - resolver wrapper enforcing a checklist
//! - [`registry`] - declarations compiled into per-field guards

pub mod coerce;
pub mod evaluator;
pub mod guard;
pub mod path;
pub mod registry;
pub mod walk;

pub use evaluator::{CompiledCheck, Evaluator, compile_check, compile_checks};
pub use guard::{DefaultFieldResolver, GuardedResolver};
pub use path::{CompiledPath, compile_path};
pub use registry::{GuardDeclarations, GuardRegistry, TypeDeclaration};
pub use walk::walk;
