//! Expression evaluation.
//!
//! Expressions embedded in templates are Tera expressions. They are never parsed
//! here: each one is wrapped in a tiny Tera template and rendered against the
//! current scope.

use serde_json::{Map, Value};
use tera::{Context, Tera};

use crate::core::BladeError;

const VALUE_SLOT: &str = "__blade_value";

/// Tera test backing `@isset`: the value exists and is not null.
pub const PRESENT_TEST: &str = "present";

/// Evaluates opaque expressions against a render scope.
pub struct Evaluator {
    tera: Tera,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator").finish_non_exhaustive()
    }
}

impl Evaluator {
    /// Create an evaluator with Tera's built-in filters, tests and functions,
    /// plus the `present` test.
    #[must_use]
    pub fn new() -> Self {
        let mut tera = Tera::default();
        tera.register_tester(PRESENT_TEST, |value: Option<&Value>, _args: &[Value]| {
            Ok(value.is_some_and(|v| !v.is_null()))
        });
        Self { tera }
    }

    /// Evaluate `expression` to a value.
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::Expression`] if Tera rejects or fails to evaluate it.
    pub fn value(
        &mut self,
        expression: &str,
        scope: &Map<String, Value>,
    ) -> Result<Value, BladeError> {
        let snippet = format!(
            "{{% set {VALUE_SLOT} = {expression} %}}{{{{ {VALUE_SLOT} | json_encode() }}}}"
        );
        let encoded = self.render(&snippet, expression, scope)?;
        serde_json::from_str(&encoded).map_err(|e| BladeError::Expression {
            expression: expression.to_string(),
            reason: format!("value is not representable as JSON: {e}"),
        })
    }

    /// Evaluate `expression` as a condition. Undefined variables are false.
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::Expression`] if Tera rejects or fails to evaluate it.
    pub fn truthy(
        &mut self,
        expression: &str,
        scope: &Map<String, Value>,
    ) -> Result<bool, BladeError> {
        let snippet = format!("{{% if {expression} %}}1{{% endif %}}");
        Ok(self.render(&snippet, expression, scope)? == "1")
    }

    /// Evaluate `expression` and render it as text.
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::Expression`] if Tera rejects or fails to evaluate it.
    pub fn display(
        &mut self,
        expression: &str,
        scope: &Map<String, Value>,
    ) -> Result<String, BladeError> {
        let snippet = format!("{{{{ {expression} }}}}");
        self.render(&snippet, expression, scope)
    }

    fn render(
        &mut self,
        snippet: &str,
        expression: &str,
        scope: &Map<String, Value>,
    ) -> Result<String, BladeError> {
        let context = Context::from_serialize(scope).map_err(|e| BladeError::Expression {
            expression: expression.to_string(),
            reason: format_tera_error(&e),
        })?;

        self.tera.render_str(snippet, &context).map_err(|e| {
            tracing::debug!("Expression `{expression}` failed: {e}");
            BladeError::Expression {
                expression: expression.to_string(),
                reason: format_tera_error(&e),
            }
        })
    }
}

/// Flatten a Tera error chain into one readable message without Tera's internal
/// one-off template name.
#[must_use]
pub fn format_tera_error(error: &tera::Error) -> String {
    use std::error::Error;

    let mut messages = Vec::new();
    let mut current: Option<&dyn Error> = Some(error);
    while let Some(err) = current {
        let cleaned = err
            .to_string()
            .replace("while rendering '__tera_one_off'", "")
            .replace("Failed to render '__tera_one_off'", "")
            .replace("Failed to parse '__tera_one_off'", "")
            .replace("'__tera_one_off'", "expression")
            .trim()
            .to_string();
        if !cleaned.is_empty() && !messages.contains(&cleaned) {
            messages.push(cleaned);
        }
        current = err.source();
    }

    if messages.is_empty() {
        "invalid expression".to_string()
    } else {
        messages.join(": ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scope() -> Map<String, Value> {
        let Value::Object(map) = json!({
            "name": "Ada",
            "count": 3,
            "items": ["a", "b"],
            "user": {"admin": true},
        }) else {
            unreachable!()
        };
        map
    }

    #[test]
    fn test_value() {
        let mut evaluator = Evaluator::new();
        let scope = scope();
        assert_eq!(evaluator.value("count + 1", &scope).unwrap(), json!(4));
        assert_eq!(evaluator.value("items | length", &scope).unwrap(), json!(2));
        assert_eq!(evaluator.value("'x' ~ name", &scope).unwrap(), json!("xAda"));
        assert_eq!(evaluator.value("user", &scope).unwrap(), json!({"admin": true}));
    }

    #[test]
    fn test_truthy() {
        let mut evaluator = Evaluator::new();
        let scope = scope();
        assert!(evaluator.truthy("user.admin", &scope).unwrap());
        assert!(evaluator.truthy("count > 2 and name == 'Ada'", &scope).unwrap());
        assert!(!evaluator.truthy("missing is defined", &scope).unwrap());
    }

    #[test]
    fn test_present_rejects_null_and_undefined() {
        let mut evaluator = Evaluator::new();
        let mut scope = scope();
        scope.insert("nothing".to_string(), Value::Null);
        scope.insert("zero".to_string(), json!(0));

        assert!(evaluator.truthy("name is present", &scope).unwrap());
        assert!(evaluator.truthy("zero is present", &scope).unwrap());
        assert!(!evaluator.truthy("nothing is present", &scope).unwrap());
        assert!(!evaluator.truthy("missing is present", &scope).unwrap());
        assert!(!evaluator.truthy("user.missing is present", &scope).unwrap());
        assert!(evaluator.truthy("nothing is defined", &scope).unwrap());
    }

    #[test]
    fn test_display() {
        let mut evaluator = Evaluator::new();
        let scope = scope();
        assert_eq!(evaluator.display("name | upper", &scope).unwrap(), "ADA");
        assert_eq!(evaluator.display("missing | default(value='-')", &scope).unwrap(), "-");
    }

    #[test]
    fn test_errors_name_the_expression() {
        let mut evaluator = Evaluator::new();
        let err = evaluator.display("nope.deeper", &scope()).unwrap_err();
        let BladeError::Expression { expression, reason } = err else {
            panic!("expected expression error");
        };
        assert_eq!(expression, "nope.deeper");
        assert!(!reason.contains("__tera_one_off"));
    }
}
