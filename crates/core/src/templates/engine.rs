use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read template file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("undefined placeholder '{0}'")]
    Undefined(String),

    #[error("unknown filter '{filter}' on placeholder '{name}'")]
    UnknownFilter { name: String, filter: String },
}

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("valid regex"));

/// Flat name → value mapping a template is rendered with.
pub type RenderContext = Map<String, Value>;

/// Per-call rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Fail on placeholders (or filters) the context can't satisfy instead
    /// of leaving them in the output.
    pub strict: bool,
}

impl RenderOptions {
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn lenient() -> Self {
        Self { strict: false }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::strict()
    }
}

/// Renders template files with a flat context.
pub trait Renderer {
    fn render_file(
        &self,
        path: &Path,
        ctx: &RenderContext,
        options: RenderOptions,
    ) -> Result<String, RenderError>;
}

/// `{{ name }}` / `{{ name | filter }}` substitution.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRenderer;

impl Renderer for PlaceholderRenderer {
    fn render_file(
        &self,
        path: &Path,
        ctx: &RenderContext,
        options: RenderOptions,
    ) -> Result<String, RenderError> {
        let template = fs::read_to_string(path)
            .map_err(|e| RenderError::Io { path: path.to_path_buf(), source: e })?;
        render_string(&template, ctx, options)
    }
}

impl<R: Renderer + ?Sized> Renderer for &R {
    fn render_file(
        &self,
        path: &Path,
        ctx: &RenderContext,
        options: RenderOptions,
    ) -> Result<String, RenderError> {
        (**self).render_file(path, ctx, options)
    }
}

/// Render a string template with variable substitution.
///
/// Supports:
/// - Simple variables: `{{var_name}}`
/// - Filters: `{{var_name | filter}}` (slugify, lower, upper, trim)
///
/// Strings render as-is, other scalars through their JSON form, null as the
/// empty string and lists/maps as compact JSON.
pub fn render_string(
    template: &str,
    ctx: &RenderContext,
    options: RenderOptions,
) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER_RE.captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&template[last..whole.start()]);
        last = whole.end();

        let expr = caps[1].trim();
        let (name, filter) = match parse_filter_expr(expr) {
            Some((name, filter)) => (name, Some(filter)),
            None => (expr, None),
        };

        let Some(value) = ctx.get(name) else {
            if options.strict {
                return Err(RenderError::Undefined(name.to_string()));
            }
            out.push_str(whole.as_str());
            continue;
        };

        let text = value_to_string(value);
        match filter {
            None => out.push_str(&text),
            Some(filter) => match apply_filter(&text, filter) {
                Some(filtered) => out.push_str(&filtered),
                None if options.strict => {
                    return Err(RenderError::UnknownFilter {
                        name: name.to_string(),
                        filter: filter.to_string(),
                    });
                }
                None => out.push_str(&text),
            },
        }
    }

    out.push_str(&template[last..]);
    Ok(out)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parse a filter expression like "var_name | filter_name".
/// Returns (var_name, filter_name) if valid, None otherwise.
fn parse_filter_expr(expr: &str) -> Option<(&str, &str)> {
    let (var_name, filter) = expr.split_once('|')?;
    let var_name = var_name.trim();
    let filter = filter.trim();
    if var_name.is_empty() || filter.is_empty() {
        return None;
    }
    Some((var_name, filter))
}

/// Apply a filter to a value. Unknown filters yield `None`.
fn apply_filter(value: &str, filter: &str) -> Option<String> {
    match filter {
        "slugify" => Some(slugify(value)),
        "lowercase" | "lower" => Some(value.to_lowercase()),
        "uppercase" | "upper" => Some(value.to_uppercase()),
        "trim" => Some(value.trim().to_string()),
        _ => None,
    }
}

/// Convert a string to a URL-friendly slug.
///
/// - Converts to lowercase
/// - Replaces spaces and underscores with hyphens
/// - Removes non-alphanumeric characters (except hyphens)
/// - Collapses multiple hyphens into one
/// - Trims leading/trailing hyphens
pub fn slugify(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
        } else if (c == ' ' || c == '_' || c == '-') && !result.ends_with('-') {
            result.push('-');
        }
    }

    result.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(value: Value) -> RenderContext {
        match value {
            Value::Object(map) => map,
            _ => RenderContext::new(),
        }
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("foo_bar_baz"), "foo-bar-baz");
        assert_eq!(slugify("  leading and trailing  "), "leading-and-trailing");
    }

    #[test]
    fn test_render_replaces_known_variables() {
        let out =
            render_string("Hello {{who}}\n", &ctx(json!({"who": "world"})), RenderOptions::strict())
                .unwrap();
        assert_eq!(out, "Hello world\n");
    }

    #[test]
    fn test_render_trims_placeholder_whitespace() {
        let out = render_string("{{ a }}-{{b}}", &ctx(json!({"a": 1, "b": true})), RenderOptions::strict())
            .unwrap();
        assert_eq!(out, "1-true");
    }

    #[test]
    fn test_render_structured_values() {
        let c = ctx(json!({"l": ["a", 1], "n": null}));
        let out = render_string("{{l}}|{{n}}|", &c, RenderOptions::strict()).unwrap();
        assert_eq!(out, r#"["a",1]||"#);
    }

    #[test]
    fn test_adjacent_and_braced_placeholders() {
        let c = ctx(json!({"a": "x", "b": "y"}));
        for _ in 0..2 {
            let out = render_string("{{a}}{{b}} {{{a}}} {a}", &c, RenderOptions::strict()).unwrap();
            assert_eq!(out, "xy {x} {a}");
        }
    }

    #[test]
    fn test_strict_fails_on_unknown_placeholder() {
        let err = render_string("Hello {{who}}", &RenderContext::new(), RenderOptions::strict())
            .unwrap_err();
        assert!(matches!(err, RenderError::Undefined(ref n) if n == "who"));
    }

    #[test]
    fn test_lenient_leaves_unknown_placeholder() {
        let out = render_string(
            "Hello {{name}} and {{unknown}}!",
            &ctx(json!({"name": "Agustin"})),
            RenderOptions::lenient(),
        )
        .unwrap();
        assert_eq!(out, "Hello Agustin and {{unknown}}!");
    }

    #[test]
    fn test_filters() {
        let c = ctx(json!({"title": "My New Task", "name": "HELLO"}));
        let out = render_string(
            "tasks/{{title | slugify}}.md {{name | lower}} {{name|upper}}",
            &c,
            RenderOptions::strict(),
        )
        .unwrap();
        assert_eq!(out, "tasks/my-new-task.md hello HELLO");
    }

    #[test]
    fn test_unknown_filter() {
        let c = ctx(json!({"name": "hello"}));
        let err = render_string("{{name | shout}}", &c, RenderOptions::strict()).unwrap_err();
        assert!(matches!(err, RenderError::UnknownFilter { .. }));

        let out = render_string("{{name | shout}}", &c, RenderOptions::lenient()).unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn test_render_file_missing() {
        let err = PlaceholderRenderer
            .render_file(Path::new("/nonexistent/x.tpl"), &RenderContext::new(), RenderOptions::strict())
            .unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }
}
