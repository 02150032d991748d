//! Declaration surface for the host schema.

use field_auth_sdk::OperatorKind;

/// Name of the schema directive.
pub const DIRECTIVE_NAME: &str = "auth";

/// Render the SDL that declares the `@auth` directive and its input types.
///
/// The operation enum lists every accepted token, aliases included, so the
/// host schema rejects unknown operators before they reach the guard.
#[must_use]
pub fn directive_sdl() -> String {
    let operations = OperatorKind::TOKENS
        .iter()
        .map(|(token, _)| format!("    {token}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "enum AuthDirectiveOperation {{\n{operations}\n}}\n\n\
         input AuthDirectiveInput {{\n    \
         field: String!\n    \
         op: AuthDirectiveOperation!\n    \
         value: String!\n\
         }}\n\n\
         directive @{DIRECTIVE_NAME}(\n    \
         checks: [AuthDirectiveInput!]\n\
         ) on FIELD_DEFINITION | OBJECT\n"
    )
}
