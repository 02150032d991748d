#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end guard behaviour: declarations in YAML, registry build,
//! wrapped resolvers, request contexts.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use field_auth::{
    DefaultFieldResolver, FieldAuthConfig, GuardDeclarations, GuardRegistry, directive_sdl,
};
use field_auth_sdk::{DenyReason, FieldAuthError, FieldResolver, OperatorKind, ResolveInfo};
use serde_json::{Value, json};
use tracing_test::traced_test;

const CONFIG: &str = r#"
user_field: "user"
greater_than: strict
"#;

const DECLARATIONS: &str = r#"
types:
  Query:
    fields:
      payroll:
        - field: "role"
          op: "EQ"
          value: "admin"
      adultContent:
        - field: "age"
          op: "GTE"
          value: "18"
      regionalReport:
        - field: "user.regions"
          op: "CONTAINS"
          value: "emea"
        - field: "user.clearance"
          op: "GT"
          value: "2"
  Employee:
    checks:
      - field: "user.groups[0]"
        op: "EQUAL"
        value: "hr"
"#;

struct CountingResolver {
    calls: AtomicUsize,
    value: Value,
}

impl CountingResolver {
    fn returning(value: Value) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            value,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FieldResolver for CountingResolver {
    async fn resolve(
        &self,
        _root: &Value,
        _args: &Value,
        _context: &Value,
        _info: &ResolveInfo,
    ) -> Result<Value, FieldAuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.value.clone())
    }
}

fn registry() -> GuardRegistry {
    let config = FieldAuthConfig::from_yaml(CONFIG).unwrap();
    let declarations = GuardDeclarations::from_yaml(DECLARATIONS).unwrap();
    GuardRegistry::build(&config, &declarations).unwrap()
}

#[tokio::test]
async fn admin_reads_payroll() {
    let reg = registry();
    let inner = CountingResolver::returning(json!([{"name": "alice", "salary": 1}]));
    let payroll = reg.wrap("Query", "payroll", inner.clone());

    let context = json!({"user": {"id": 7}, "role": "admin"});
    let value = payroll
        .resolve(
            &json!({}),
            &json!({}),
            &context,
            &ResolveInfo::new("Query", "payroll"),
        )
        .await
        .unwrap();

    assert_eq!(value, json!([{"name": "alice", "salary": 1}]));
    assert_eq!(inner.calls(), 1);
}

#[tokio::test]
async fn empty_context_is_unauthenticated_before_any_check() {
    let reg = registry();
    let info = ResolveInfo::new("Query", "payroll");

    let guarded = reg.wrap("Query", "payroll", Arc::new(DefaultFieldResolver));
    let decision = guarded.authorize(&json!({}), &info);
    assert_eq!(
        decision.denial().map(|d| &d.reason),
        Some(&DenyReason::Unauthenticated)
    );

    let inner = CountingResolver::returning(json!(null));
    let payroll = reg.wrap("Query", "payroll", inner.clone());
    let err = payroll
        .resolve(&json!({}), &json!({}), &json!({}), &info)
        .await
        .unwrap_err();

    assert_eq!(err, FieldAuthError::Unauthenticated);
    assert_eq!(err.to_string(), "User not authenticated");
    assert_eq!(inner.calls(), 0);
}

#[tokio::test]
#[traced_test]
async fn minor_is_forbidden_with_diagnostics_in_logs_only() {
    let reg = registry();
    let info = ResolveInfo::new("Query", "adultContent");
    let inner = CountingResolver::returning(json!("content"));
    let guarded = reg.wrap("Query", "adultContent", inner.clone());
    let context = json!({"user": {"id": 1}, "age": 15});

    let decision = guarded.authorize(&context, &info);
    let denial = decision.denial().unwrap();
    assert_eq!(
        denial.reason,
        DenyReason::CheckFailed {
            path: "age".to_owned(),
            op: OperatorKind::GreaterThanEqual,
            declared: "18".to_owned(),
            actual: "15".to_owned(),
        }
    );

    let err = guarded
        .resolve(&json!({}), &json!({}), &context, &info)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        FieldAuthError::Forbidden {
            field_name: "adultContent".to_owned()
        }
    );
    assert!(!err.to_string().contains("15"));
    assert_eq!(inner.calls(), 0);

    assert!(logs_contain("context.age (15)"));
    assert!(logs_contain("adultContent"));
}

#[tokio::test]
async fn evaluation_stops_at_first_failing_check() {
    let reg = registry();
    let info = ResolveInfo::new("Query", "regionalReport");
    let guarded = reg.wrap("Query", "regionalReport", Arc::new(DefaultFieldResolver));

    // both checks fail; only the first is reported
    let context = json!({"user": {"regions": ["apac"], "clearance": 1}});
    let decision = guarded.authorize(&context, &info);
    match &decision.denial().unwrap().reason {
        DenyReason::CheckFailed { path, op, .. } => {
            assert_eq!(path, "user.regions");
            assert_eq!(*op, OperatorKind::Contains);
        }
        other => panic!("unexpected reason: {other:?}"),
    }

    // first passes, second fails
    let context = json!({"user": {"regions": ["emea", "apac"], "clearance": 2}});
    let decision = guarded.authorize(&context, &info);
    match &decision.denial().unwrap().reason {
        DenyReason::CheckFailed { path, actual, .. } => {
            assert_eq!(path, "user.clearance");
            assert_eq!(actual, "2");
        }
        other => panic!("unexpected reason: {other:?}"),
    }

    let context = json!({"user": {"regions": ["emea"], "clearance": 3}});
    assert!(guarded.authorize(&context, &info).is_allowed());
}

#[tokio::test]
async fn type_level_checks_guard_every_field() {
    let reg = registry();
    let root = json!({"name": "bob", "salary": 90});
    let hr = json!({"user": {"groups": ["hr", "staff"]}});
    let staff = json!({"user": {"groups": ["staff", "hr"]}});

    for field in ["name", "salary"] {
        let info = ResolveInfo::new("Employee", field);
        let guarded = reg.wrap("Employee", field, Arc::new(DefaultFieldResolver));

        let value = guarded
            .resolve(&root, &json!({}), &hr, &info)
            .await
            .unwrap();
        assert_eq!(value, root[field]);

        let err = guarded
            .resolve(&root, &json!({}), &staff, &info)
            .await
            .unwrap_err();
        assert!(err.is_denial());
    }
}

#[tokio::test]
async fn undeclared_fields_only_require_authentication() {
    let reg = registry();
    let info = ResolveInfo::new("Query", "hello");
    let guarded = reg.wrap("Query", "hello", Arc::new(DefaultFieldResolver));
    let root = json!({"hello": "world"});

    let value = guarded
        .resolve(&root, &json!({}), &json!({"user": "u-1"}), &info)
        .await
        .unwrap();
    assert_eq!(value, json!("world"));

    let err = guarded
        .resolve(&root, &json!({}), &json!({"user": ""}), &info)
        .await
        .unwrap_err();
    assert_eq!(err, FieldAuthError::Unauthenticated);
}

#[tokio::test]
async fn disabled_authentication_gate_runs_checks_only() {
    let config = FieldAuthConfig::from_yaml("user_field: \"\"\n").unwrap();
    let declarations = GuardDeclarations::from_yaml(DECLARATIONS).unwrap();
    let reg = GuardRegistry::build(&config, &declarations).unwrap();
    let info = ResolveInfo::new("Query", "payroll");
    let guarded = reg.wrap("Query", "payroll", Arc::new(DefaultFieldResolver));

    assert!(guarded.authorize(&json!({"role": "admin"}), &info).is_allowed());
    assert!(!guarded.authorize(&json!({"role": "guest"}), &info).is_allowed());
}

#[test]
fn declared_operators_match_directive_enum() {
    let sdl = directive_sdl();
    for (token, _) in OperatorKind::TOKENS {
        assert!(sdl.contains(token));
    }
    assert!(sdl.contains("directive @auth("));
}
