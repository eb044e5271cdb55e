//! Text emission: `ValueDescriptor` → mock expression, and per-operation
//! MSW artifacts (response-mock function + request handler + module header).
//!
//! The engine stays language-agnostic; everything target-language-specific
//! lives here. Rendered output is deterministic so generated files diff
//! cleanly.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::doc::Operation;
use crate::options::{Delay, MockOptions};
use crate::resolve::Synthesis;
use crate::value::ValueDescriptor;

/// Name of the caller-supplied partial override object. Spread last in every
/// synthesized object so override fields win; kept identical across all
/// operations so generated artifacts compose uniformly.
pub const OVERRIDE_VAR: &str = "overrideResponse";

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier regex"));

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("word regex"));

// --------------------------- Value rendering ------------------------------- //

pub fn render_value(value: &ValueDescriptor) -> String {
    match value {
        ValueDescriptor::Literal(expr) => expr.clone(),
        ValueDescriptor::Undefined => "undefined".to_string(),
        ValueDescriptor::EmptyObject => "{}".to_string(),
        ValueDescriptor::Object { fields, spread } => {
            let mut parts: Vec<String> = fields
                .iter()
                .map(|(key, value)| format!("{}: {}", render_key(key), render_value(value)))
                .collect();
            if *spread {
                parts.push(format!("...{OVERRIDE_VAR}"));
            }
            format!("{{{}}}", parts.join(", "))
        }
        ValueDescriptor::Choice(branches) => {
            let rendered: Vec<String> = branches.iter().map(render_value).collect();
            format!("faker.helpers.arrayElement([{}])", rendered.join(", "))
        }
        ValueDescriptor::OpenMap { key, value } => {
            format!("{{ [{key}]: {} }}", render_value(value))
        }
        ValueDescriptor::ArrayOf { item, min_items, max_items } => format!(
            "Array.from({{ length: faker.number.int({{ min: {min_items}, max: {max_items} }}) }}, () => ({}))",
            render_value(item)
        ),
    }
}

/// Quote object keys that are not valid identifiers.
fn render_key(key: &str) -> String {
    if IDENT_RE.is_match(key) {
        key.to_string()
    } else {
        format!("'{}'", key.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

// ------------------------- Operation artifacts ----------------------------- //

#[derive(Debug, Clone)]
pub struct OperationArtifact {
    pub mock_fn: String,
    pub handler: String,
    pub handler_name: String,
    /// Schema type names actually used by this artifact's text.
    pub imports: Vec<String>,
}

pub fn render_operation(
    op: &Operation,
    synthesis: Option<&Synthesis>,
    opts: &MockOptions,
) -> OperationArtifact {
    let mock_fn_name = format!("get{}ResponseMock", pascal(&op.id));
    let handler_name = format!("get{}MockHandler", pascal(&op.id));

    let return_type = op.response.as_ref().and_then(|r| r.reference_target());

    let body = synthesis
        .map(|s| render_value(&s.value))
        .filter(|v| v != "undefined");
    let has_body = body.is_some();

    let mock_fn = match &body {
        Some(expr) => {
            let annotation = return_type.map(|t| format!(": {t}")).unwrap_or_default();
            format!(
                "export const {mock_fn_name} = ({OVERRIDE_VAR}: any = {{}}){annotation} => ({expr})\n"
            )
        }
        None => String::new(),
    };

    let route = msw_route(opts.base_url.as_deref(), &op.route);
    let delay = delay_expr(&opts.delay_for(&op.id));
    let (response_expr, handler_param) = if has_body {
        let param_type = return_type.unwrap_or("any");
        (
            format!("JSON.stringify({OVERRIDE_VAR} !== undefined ? {OVERRIDE_VAR} : {mock_fn_name}())"),
            format!("{OVERRIDE_VAR}?: {param_type}"),
        )
    } else {
        ("null".to_string(), String::new())
    };

    let handler = format!(
        r#"export const {handler_name} = ({handler_param}) => {{
  return http.{verb}('{route}', async () => {{
    await delay({delay});
    return new HttpResponse({response_expr}, {{
      status: {status},
      headers: {{ 'Content-Type': 'application/json' }},
    }})
  }})
}}
"#,
        verb = op.verb,
        status = op.status,
    );

    // Only keep type imports the emitted text actually mentions.
    let mut imports: Vec<String> = Vec::new();
    if let Some(synthesis) = synthesis {
        let mut mentioned: IndexSet<&str> = IndexSet::new();
        mentioned.extend(WORD_RE.find_iter(&mock_fn).map(|m| m.as_str()));
        mentioned.extend(WORD_RE.find_iter(&handler).map(|m| m.as_str()));
        for import in &synthesis.imports {
            if mentioned.contains(import.name.as_str()) {
                imports.push(import.name.clone());
            }
        }
    }

    OperationArtifact { mock_fn, handler, handler_name, imports }
}

/// Assemble the complete generated module: header imports, response mocks,
/// handlers, and an aggregate handler list.
pub fn render_module(artifacts: &[OperationArtifact], opts: &MockOptions) -> String {
    let mut out = String::new();
    out.push_str(&render_header(artifacts, opts.locale.as_deref()));
    out.push('\n');

    for artifact in artifacts {
        if !artifact.mock_fn.is_empty() {
            out.push_str(&artifact.mock_fn);
            out.push('\n');
        }
    }
    for artifact in artifacts {
        out.push_str(&artifact.handler);
        out.push('\n');
    }

    let names: Vec<&str> = artifacts.iter().map(|a| a.handler_name.as_str()).collect();
    if names.is_empty() {
        out.push_str("export const getMockHandlers = () => []\n");
    } else {
        out.push_str(&format!(
            "export const getMockHandlers = () => [\n  {},\n]\n",
            names.join("(),\n  ") + "()"
        ));
    }
    out
}

fn render_header(artifacts: &[OperationArtifact], locale: Option<&str>) -> String {
    let faker_dep = match locale {
        Some(locale) => format!("@faker-js/faker/locale/{locale}"),
        None => "@faker-js/faker".to_string(),
    };

    let mut type_imports: Vec<&str> = Vec::new();
    for artifact in artifacts {
        for name in &artifact.imports {
            if !type_imports.contains(&name.as_str()) {
                type_imports.push(name);
            }
        }
    }

    let mut header = String::new();
    header.push_str("import { http, HttpResponse, delay } from 'msw'\n");
    header.push_str(&format!("import {{ faker }} from '{faker_dep}'\n"));
    if !type_imports.is_empty() {
        header.push_str(&format!(
            "import type {{ {} }} from './models'\n",
            type_imports.join(", ")
        ));
    }
    header
}

// ------------------------------ Small helpers ------------------------------ //

/// `listPets` / `list-pets` / `list_pets` → `ListPets`.
pub fn pascal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = true;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            if upper_next {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
            upper_next = false;
        } else {
            upper_next = true;
        }
    }
    out
}

/// OpenAPI route → MSW route: `{petId}` params become `:petId`, prefixed
/// with the base URL (wildcard by default).
pub fn msw_route(base_url: Option<&str>, route: &str) -> String {
    let mut converted = String::with_capacity(route.len());
    let mut rest = route;
    while let Some(start) = rest.find('{') {
        converted.push_str(&rest[..start]);
        match rest[start..].find('}') {
            Some(end) => {
                converted.push(':');
                converted.push_str(&rest[start + 1..start + end]);
                rest = &rest[start + end + 1..];
            }
            None => {
                converted.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    converted.push_str(rest);
    format!("{}{converted}", base_url.unwrap_or("*"))
}

fn delay_expr(delay: &Delay) -> String {
    match delay {
        Delay::Millis(ms) => ms.to_string(),
        // Function expression: invoke lazily inside the handler.
        Delay::Expr(expr) => format!("({expr})()"),
    }
}

// ------------------------------- Tests ------------------------------------ //
