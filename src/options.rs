//! Generation policy: global flags, per-operation overrides, delay.
//!
//! Property overrides are addressed by property name or by the node's
//! dot/hash path; a `/…/` form compiles to a regex matcher. A matched node
//! skips engine synthesis entirely and emits the override expression,
//! still contributing any import the override declares.

use indexmap::IndexMap;
use regex::Regex;

/// Handler delay, in the emitted artifact's terms.
#[derive(Debug, Clone, PartialEq)]
pub enum Delay {
    Millis(u64),
    /// A function expression, invoked lazily at render time.
    Expr(String),
}

pub const DEFAULT_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, Default)]
pub struct MockOptions {
    /// Force every property present, ignoring the schema's `required` set.
    pub required: bool,
    pub delay: Option<Delay>,
    pub base_url: Option<String>,
    /// Faker locale subpath for the artifact's import header.
    pub locale: Option<String>,
    /// Global property overrides, applied to every operation.
    pub properties: Vec<PropertyOverride>,
    /// Per-operation overrides, keyed by operationId.
    pub operations: IndexMap<String, OperationOverride>,
}

#[derive(Debug, Clone, Default)]
pub struct OperationOverride {
    pub delay: Option<Delay>,
    pub properties: Vec<PropertyOverride>,
}

#[derive(Debug, Clone)]
pub struct PropertyOverride {
    matcher: Matcher,
    /// Replacement expression, emitted verbatim.
    pub expr: String,
    /// Symbols the expression needs in scope.
    pub imports: Vec<String>,
}

#[derive(Debug, Clone)]
enum Matcher {
    Exact(String),
    Pattern(Regex),
}

#[derive(Debug, thiserror::Error)]
pub enum OverrideParseError {
    #[error("override must be `selector=expression`, got `{0}`")]
    MissingEquals(String),
    #[error("bad override pattern `{0}`: {1}")]
    BadPattern(String, regex::Error),
}

impl PropertyOverride {
    pub fn new(selector: &str, expr: impl Into<String>) -> Result<Self, OverrideParseError> {
        let matcher = if selector.len() > 1 && selector.starts_with('/') && selector.ends_with('/') {
            let body = &selector[1..selector.len() - 1];
            let re = Regex::new(body)
                .map_err(|err| OverrideParseError::BadPattern(selector.to_string(), err))?;
            Matcher::Pattern(re)
        } else {
            Matcher::Exact(selector.to_string())
        };
        Ok(Self { matcher, expr: expr.into(), imports: Vec::new() })
    }

    /// CLI form: `selector=expression`.
    pub fn parse(raw: &str) -> Result<Self, OverrideParseError> {
        let (selector, expr) = raw
            .split_once('=')
            .ok_or_else(|| OverrideParseError::MissingEquals(raw.to_string()))?;
        Self::new(selector.trim(), expr.trim())
    }

    pub fn with_imports(mut self, imports: Vec<String>) -> Self {
        self.imports = imports;
        self
    }

    fn matches(&self, name: &str, path: &str) -> bool {
        match &self.matcher {
            Matcher::Exact(sel) => {
                sel == name || sel == path || path.ends_with(&format!(".{sel}"))
            }
            Matcher::Pattern(re) => re.is_match(name) || re.is_match(path),
        }
    }
}

impl MockOptions {
    /// Override for a node. Precedence: operationId entry > tag entries
    /// (declaration order) > globals.
    pub fn lookup_override(
        &self,
        operation_id: &str,
        tags: &[String],
        name: &str,
        path: &str,
    ) -> Option<&PropertyOverride> {
        let scoped = std::iter::once(operation_id)
            .chain(tags.iter().map(String::as_str))
            .filter_map(|key| self.operations.get(key));
        for table in scoped {
            if let Some(found) = table.properties.iter().find(|p| p.matches(name, path)) {
                return Some(found);
            }
        }
        self.properties.iter().find(|p| p.matches(name, path))
    }

    /// Delay precedence: operation override > global option > 1000 ms.
    pub fn delay_for(&self, operation_id: &str) -> Delay {
        self.operations
            .get(operation_id)
            .and_then(|op| op.delay.clone())
            .or_else(|| self.delay.clone())
            .unwrap_or(Delay::Millis(DEFAULT_DELAY_MS))
    }
}

// ------------------------------- Tests ------------------------------------ //
