//! `{{VARIABLE}}` substitution for the static files of the emitted stack.

use crate::domain::naming::Identifier;
use std::collections::BTreeMap;

/// Context for template rendering.
///
/// Immutable after creation; `with_variable` returns the extended context.
///
/// ## Built-in Variables
///
/// | Variable | Example |
/// |----------|---------|
/// | `PROJECT_NAME` | "Billing Portal" |
/// | `PROJECT_NAME_SNAKE` | "billing_portal" |
/// | `PROJECT_NAME_KEBAB` | "billing-portal" |
/// | `PROJECT_NAME_PASCAL` | "BillingPortal" |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    variables: BTreeMap<String, String>,
}

impl RenderContext {
    pub fn new(project_name: impl Into<String>) -> Self {
        let name = project_name.into();
        let ident = Identifier::parse(&name);

        let mut variables = BTreeMap::new();
        variables.insert("PROJECT_NAME_SNAKE".to_string(), ident.snake());
        variables.insert("PROJECT_NAME_KEBAB".to_string(), ident.kebab());
        variables.insert("PROJECT_NAME_PASCAL".to_string(), ident.upper_camel());
        variables.insert("PROJECT_NAME".to_string(), name);

        Self { variables }
    }

    /// Add or override a variable.
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Replace every `{{KEY}}` in one left-to-right pass.
    ///
    /// Unknown placeholders stay as written. Substituted values are never
    /// re-scanned, so a value containing `{{X}}` comes out literally.
    pub fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = &after[..end];
                    match self.get(key) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push_str("{{");
                            out.push_str(key);
                            out.push_str("}}");
                        }
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_variables() {
        let ctx = RenderContext::new("my awesome project");
        assert_eq!(ctx.get("PROJECT_NAME"), Some("my awesome project"));
        assert_eq!(ctx.get("PROJECT_NAME_SNAKE"), Some("my_awesome_project"));
        assert_eq!(ctx.get("PROJECT_NAME_KEBAB"), Some("my-awesome-project"));
        assert_eq!(ctx.get("PROJECT_NAME_PASCAL"), Some("MyAwesomeProject"));
    }

    #[test]
    fn renders_known_and_keeps_unknown() {
        let ctx = RenderContext::new("shop").with_variable("PORT", "3001");
        assert_eq!(
            ctx.render("{{PROJECT_NAME_KEBAB}}:{{PORT}} {{MISSING}}"),
            "shop:3001 {{MISSING}}"
        );
    }

    #[test]
    fn values_are_not_rescanned() {
        let ctx = RenderContext::new("{{PROJECT_NAME_KEBAB}}");
        assert_eq!(ctx.render("{{PROJECT_NAME}}"), "{{PROJECT_NAME_KEBAB}}");
    }

    #[test]
    fn unterminated_placeholder_is_literal() {
        let ctx = RenderContext::new("x");
        assert_eq!(ctx.render("a {{PROJECT_NAME"), "a {{PROJECT_NAME");
        assert_eq!(ctx.render("{ {{PROJECT_NAME}} }"), "{ x }");
    }
}
