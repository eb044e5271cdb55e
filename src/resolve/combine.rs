//! Composition combiner: allOf / oneOf / anyOf.
//!
//! allOf is a left-to-right field union with first-branch-wins precedence:
//! `included` threads forward so each later branch sees, and skips, names an
//! earlier branch already emitted. oneOf/anyOf synthesize every branch
//! independently into a choice the render layer picks from.
//!
//! The combiner carries its own reference-name cycle guard: a branch that is
//! a direct reference to a name already in flight is skipped, so cycles
//! rooted in compositions (no intervening named object property) terminate
//! the same way object-property cycles do.

use crate::options::MockOptions;
use crate::schema::{CompositionKind, SchemaNode};
use crate::value::{Resolved, ValueDescriptor};

use super::{Combine, ResolutionContext, ResolveError, Scope, resolve};

pub(crate) fn combine_schemas(
    kind: CompositionKind,
    branches: &[SchemaNode],
    name: &str,
    path: &str,
    opts: &MockOptions,
    scope: &Scope,
    combine: Option<&Combine>,
    ctx: &mut ResolutionContext,
) -> Result<Resolved, ResolveError> {
    match kind {
        CompositionKind::AllOf => {
            merge_all_of(branches, name, path, opts, scope, combine, ctx)
        }
        CompositionKind::OneOf | CompositionKind::AnyOf => {
            choose_between(kind, branches, name, path, opts, scope, ctx)
        }
    }
}

fn merge_all_of(
    branches: &[SchemaNode],
    name: &str,
    path: &str,
    opts: &MockOptions,
    scope: &Scope,
    combine: Option<&Combine>,
    ctx: &mut ResolutionContext,
) -> Result<Resolved, ResolveError> {
    // Seed with whatever an enclosing composition already emitted.
    let mut included: Vec<String> = combine.map(|c| c.included.clone()).unwrap_or_default();
    let mut fields: Vec<(String, ValueDescriptor)> = Vec::new();

    for branch in branches {
        if is_cycling_reference(branch, ctx) {
            continue;
        }
        let state = Combine { separator: CompositionKind::AllOf, included: included.clone() };
        let resolved = resolve(branch, name, path, opts, scope, Some(&state), ctx)?;
        if let ValueDescriptor::Object { fields: branch_fields, .. } = resolved.value {
            fields.extend(branch_fields);
        }
        // Non-object branches contribute no fields but may still have
        // recorded included names (nested compositions). A nested allOf
        // echoes its seed names back, so only take what is new.
        for emitted in resolved.included {
            if !included.contains(&emitted) {
                included.push(emitted);
            }
        }
    }

    Ok(Resolved {
        value: ValueDescriptor::Object { fields, spread: true },
        overridden: false,
        included,
    })
}

fn choose_between(
    kind: CompositionKind,
    branches: &[SchemaNode],
    name: &str,
    path: &str,
    opts: &MockOptions,
    scope: &Scope,
    ctx: &mut ResolutionContext,
) -> Result<Resolved, ResolveError> {
    debug_assert!(matches!(kind, CompositionKind::OneOf | CompositionKind::AnyOf));

    let mut values: Vec<ValueDescriptor> = Vec::with_capacity(branches.len());
    let mut included: Vec<String> = Vec::new();

    for branch in branches {
        if is_cycling_reference(branch, ctx) {
            continue;
        }
        // Each branch starts its own field list but shares the cycle guard
        // and import accumulator.
        let resolved = resolve(branch, name, path, opts, scope, None, ctx)?;
        for emitted in resolved.included {
            if !included.contains(&emitted) {
                included.push(emitted);
            }
        }
        values.push(resolved.value);
    }

    if values.is_empty() {
        return Ok(Resolved::plain(ValueDescriptor::EmptyObject));
    }

    Ok(Resolved {
        value: ValueDescriptor::Choice(values),
        overridden: false,
        included,
    })
}

fn is_cycling_reference(branch: &SchemaNode, ctx: &ResolutionContext) -> bool {
    branch
        .reference_target()
        .is_some_and(|target| ctx.expanded_refs.contains(target))
}

// ------------------------------- Tests ------------------------------------ //
