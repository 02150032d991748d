//! Guard declarations and the registry built from them.
//!
//! Declarations are compiled all at once: one malformed path or unknown
//! operator anywhere fails [`GuardRegistry::build`] and nothing is
//! registered.
//!
//! ## Checklist resolution
//!
//! | type checks | field checks | enforced |
//! |-------------|--------------|----------|
//! | declared    | *            | type checks |
//! | absent      | declared     | field checks |
//! | absent      | absent       | none (authentication gate only) |

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use field_auth_sdk::{CheckSpec, FieldAuthError, FieldResolver};
use serde::Deserialize;
use tracing::info;

use super::evaluator::{CompiledCheck, Evaluator, compile_checks};
use super::guard::GuardedResolver;
use crate::config::{FieldAuthConfig, parse_yaml};

/// Check declarations for a whole schema, keyed by type name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardDeclarations {
    pub types: BTreeMap<String, TypeDeclaration>,
}

impl GuardDeclarations {
    /// Parse declarations from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`FieldAuthError::InvalidConfig`] on malformed YAML or unknown keys.
    pub fn from_yaml(yaml: &str) -> Result<Self, FieldAuthError> {
        parse_yaml("guard declarations", yaml)
    }

    /// Declare field-level checks.
    #[must_use]
    pub fn field(
        mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        checks: Vec<CheckSpec>,
    ) -> Self {
        self.types
            .entry(type_name.into())
            .or_default()
            .fields
            .insert(field_name.into(), checks);
        self
    }

    /// Declare type-level checks (override every field of the type).
    #[must_use]
    pub fn type_checks(mut self, type_name: impl Into<String>, checks: Vec<CheckSpec>) -> Self {
        self.types.entry(type_name.into()).or_default().checks = Some(checks);
        self
    }
}

/// Declarations for one type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeDeclaration {
    /// Type-level checks; when present they replace field-level checks.
    pub checks: Option<Vec<CheckSpec>>,
    /// Field-level checks keyed by field name.
    pub fields: BTreeMap<String, Vec<CheckSpec>>,
}

#[derive(Debug)]
struct TypeGuards {
    type_checks: Option<Arc<[CompiledCheck]>>,
    fields: HashMap<String, Arc<[CompiledCheck]>>,
}

/// Compiled guards for a schema.
///
/// Built once at schema construction; read-only afterwards.
#[derive(Debug)]
pub struct GuardRegistry {
    evaluator: Arc<Evaluator>,
    types: HashMap<String, TypeGuards>,
    unguarded: Arc<[CompiledCheck]>,
}

impl GuardRegistry {
    /// Compile every declaration.
    ///
    /// # Errors
    ///
    /// - [`FieldAuthError::UnknownOperator`] for any unknown operator token
    /// - [`FieldAuthError::PathSyntax`] for any malformed field path
    pub fn build(
        config: &FieldAuthConfig,
        declarations: &GuardDeclarations,
    ) -> Result<Self, FieldAuthError> {
        let mut types: HashMap<String, TypeGuards> =
            HashMap::with_capacity(declarations.types.len());
        let mut field_count = 0usize;

        for (type_name, decl) in &declarations.types {
            let type_checks = decl
                .checks
                .as_deref()
                .map(compile_checks)
                .transpose()?
                .map(Arc::from);

            let mut fields: HashMap<String, Arc<[CompiledCheck]>> =
                HashMap::with_capacity(decl.fields.len());
            for (field_name, specs) in &decl.fields {
                fields.insert(field_name.clone(), Arc::from(compile_checks(specs)?));
            }
            field_count += fields.len();

            types.insert(
                type_name.clone(),
                TypeGuards {
                    type_checks,
                    fields,
                },
            );
        }

        info!(
            types = types.len(),
            fields = field_count,
            user_field = config.user_field().unwrap_or(""),
            "field guards compiled"
        );

        Ok(Self {
            evaluator: Arc::new(Evaluator::new(config)),
            types,
            unguarded: Arc::from(Vec::new()),
        })
    }

    /// The checklist enforced for `type_name.field_name`.
    #[must_use]
    pub fn checks_for(&self, type_name: &str, field_name: &str) -> Arc<[CompiledCheck]> {
        let Some(guards) = self.types.get(type_name) else {
            return Arc::clone(&self.unguarded);
        };
        guards
            .type_checks
            .as_ref()
            .or_else(|| guards.fields.get(field_name))
            .map_or_else(|| Arc::clone(&self.unguarded), Arc::clone)
    }

    /// Whether any checks were declared for `type_name.field_name`.
    #[must_use]
    pub fn is_guarded(&self, type_name: &str, field_name: &str) -> bool {
        self.types.get(type_name).is_some_and(|guards| {
            guards.type_checks.is_some() || guards.fields.contains_key(field_name)
        })
    }

    /// Wrap a resolver with the checklist for `type_name.field_name`.
    #[must_use]
    pub fn wrap(
        &self,
        type_name: &str,
        field_name: &str,
        inner: Arc<dyn FieldResolver>,
    ) -> GuardedResolver {
        GuardedResolver::new(
            inner,
            self.checks_for(type_name, field_name),
            Arc::clone(&self.evaluator),
        )
    }

    #[must_use]
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }
}
