// Strongly-typed value IR for mock emission. No serde_json::Value here.

use indexmap::IndexSet;

/// External symbol the rendered artifact must bring into scope
/// (referenced schema types, helpers declared by overrides).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Import {
    pub name: String,
}

impl Import {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Ordered, de-duplicated import accumulator (first-seen order wins).
pub type ImportSet = IndexSet<Import>;

#[derive(Debug, Clone, PartialEq)]
pub enum ValueDescriptor {
    /// Field name → descriptor, already in emission order.
    /// `spread` appends the caller-supplied override object last, so
    /// whichever fields are present on the override win at render time.
    Object {
        fields: Vec<(String, ValueDescriptor)>,
        spread: bool,
    },
    /// oneOf/anyOf: the render layer picks one branch at artifact runtime.
    Choice(Vec<ValueDescriptor>),
    /// Opaque expression text from the leaf synthesizer or an override.
    Literal(String),
    /// Optional property deliberately left absent.
    Undefined,
    /// Unrecognized or "any" shape.
    EmptyObject,
    /// Single representative entry of an open map (additionalProperties).
    /// `key` is a computed-key expression, not a plain string.
    OpenMap {
        key: String,
        value: Box<ValueDescriptor>,
    },
    /// Homogeneous array: one item descriptor, render-chosen length.
    ArrayOf {
        item: Box<ValueDescriptor>,
        min_items: u32,
        max_items: u32,
    },
}

/// Result of one synthesis call (top-level or nested).
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub value: ValueDescriptor,
    /// True when an override expression replaced engine synthesis.
    pub overridden: bool,
    /// Property names actually emitted by the nearest object synthesis,
    /// for sibling-branch deduplication (allOf) and caller bookkeeping.
    pub included: Vec<String>,
}

impl Resolved {
    pub fn plain(value: ValueDescriptor) -> Self {
        Self { value, overridden: false, included: Vec::new() }
    }
}
