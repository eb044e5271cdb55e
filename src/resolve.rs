//! Mock value resolution engine.
//!
//! One top-level call walks a schema graph into a `ValueDescriptor`,
//! visiting each referenced type at most once. Dispatch is shape-directed:
//! reference → composition → properties → additionalProperties → array →
//! primitive, with an explicit empty-object fallback for anything else.
//!
//! Design notes:
//! - The `ResolutionContext` is owned by the top-level call and passed
//!   `&mut` down the recursion; nothing here is global or shared across
//!   independent synthesis calls.
//! - `expanded_refs` only grows within one call tree. A referenced name is
//!   recorded before recursing into its target, and a property (or
//!   composition branch) that is a direct reference to an in-flight name
//!   short-circuits instead of recursing. That bounds every referenced
//!   type to a single expansion per top-level synthesis.
//! - The only propagated failure is an unresolvable `$ref`; every other
//!   shape degrades to a well-defined descriptor.

pub mod combine;
pub mod object;

use indexmap::IndexSet;

use crate::doc::Document;
use crate::leaf;
use crate::options::MockOptions;
use crate::schema::{CompositionKind, SchemaNode, Shape};
use crate::value::{Import, ImportSet, Resolved, ValueDescriptor};

/// Computed-key expression standing for "any key" in open-map entries.
pub const ANY_KEY_EXPR: &str = "faker.string.alphanumeric(5)";

/// Rendered array length bounds when the schema declares none.
const ARRAY_MIN_DEFAULT: u32 = 1;
const ARRAY_MAX_DEFAULT: u32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("unresolved $ref target `{target}` at {path}")]
    UnresolvedRef { target: String, path: String },
}

/// Read-only collaborators for one synthesis call.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub doc: &'a Document,
    /// Override lookup keys only; the engine has no other use for them.
    pub operation_id: &'a str,
    pub tags: &'a [String],
}

/// State threaded through one full resolution call tree.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    /// Reference names already being expanded on the active path.
    /// Grows for the whole top-level call, never shrinks.
    pub expanded_refs: IndexSet<String>,
    /// Symbols any produced literal needs in scope, first-seen order.
    pub imports: ImportSet,
}

/// Sibling-branch bookkeeping for composed schemas.
#[derive(Debug, Clone)]
pub struct Combine {
    pub separator: CompositionKind,
    /// Property names already emitted by earlier branches.
    pub included: Vec<String>,
}

/// A finished top-level synthesis: descriptor plus accumulated metadata.
#[derive(Debug)]
pub struct Synthesis {
    pub value: ValueDescriptor,
    pub overridden: bool,
    pub included: Vec<String>,
    pub imports: ImportSet,
}

/// Resolve one named schema with a fresh context.
pub fn synthesize(
    node: &SchemaNode,
    opts: &MockOptions,
    scope: &Scope,
) -> Result<Synthesis, ResolveError> {
    let mut ctx = ResolutionContext::default();
    let resolved = resolve(node, &node.name, &node.path, opts, scope, None, &mut ctx)?;
    Ok(Synthesis {
        value: resolved.value,
        overridden: resolved.overridden,
        included: resolved.included,
        imports: ctx.imports,
    })
}

/// Shape-directed dispatcher. `name`/`path` are the node's effective
/// address at this position in the walk (a referenced schema keeps the
/// caller's address, not its component-definition one).
pub fn resolve(
    node: &SchemaNode,
    name: &str,
    path: &str,
    opts: &MockOptions,
    scope: &Scope,
    combine: Option<&Combine>,
    ctx: &mut ResolutionContext,
) -> Result<Resolved, ResolveError> {
    // Overrides replace synthesis wholesale, wherever they match.
    if let Some(ov) = opts.lookup_override(scope.operation_id, scope.tags, name, path) {
        for import in &ov.imports {
            ctx.imports.insert(Import::new(import));
        }
        return Ok(Resolved {
            value: ValueDescriptor::Literal(ov.expr.clone()),
            overridden: true,
            included: Vec::new(),
        });
    }

    match &node.shape {
        Shape::Reference { target } => {
            let ref_path = format!("{path}.{name}");
            resolve_reference(target, name, &ref_path, opts, scope, combine, ctx)
        }
        Shape::Composition { kind, branches } => {
            combine::combine_schemas(*kind, branches, name, path, opts, scope, combine, ctx)
        }
        Shape::Object { properties, required } => {
            object::synthesize_object(properties, required, path, opts, scope, combine, ctx)
        }
        Shape::OpenMap { value } => object::synthesize_open_map(value, name, path, opts, scope, ctx),
        Shape::AnyMap => Ok(Resolved::plain(ValueDescriptor::EmptyObject)),
        Shape::Array { items, min_items, max_items } => {
            let item_path = format!("{path}.items");
            let item = resolve(items, name, &item_path, opts, scope, None, ctx)?;
            Ok(Resolved {
                value: ValueDescriptor::ArrayOf {
                    item: Box::new(item.value),
                    min_items: min_items.unwrap_or(ARRAY_MIN_DEFAULT),
                    max_items: max_items.unwrap_or(ARRAY_MAX_DEFAULT),
                },
                overridden: item.overridden,
                included: item.included,
            })
        }
        Shape::Primitive(prim) => {
            Ok(Resolved::plain(ValueDescriptor::Literal(leaf::synthesize(prim))))
        }
        Shape::Unspecified => Ok(Resolved::plain(ValueDescriptor::EmptyObject)),
    }
}

/// Look up a `$ref` target and re-enter the dispatcher with the caller's
/// name/path. The target name is recorded as in-flight *before* recursing,
/// and as an import for downstream emitters.
fn resolve_reference(
    target: &str,
    name: &str,
    path: &str,
    opts: &MockOptions,
    scope: &Scope,
    combine: Option<&Combine>,
    ctx: &mut ResolutionContext,
) -> Result<Resolved, ResolveError> {
    let node = scope.doc.lookup(target).ok_or_else(|| ResolveError::UnresolvedRef {
        target: target.to_string(),
        path: path.to_string(),
    })?;
    ctx.expanded_refs.insert(target.to_string());
    ctx.imports.insert(Import::new(target));
    resolve(node, name, path, opts, scope, combine, ctx)
}

// ------------------------------- Tests ------------------------------------ //
