//! Primitive kind model and the symbolic type registry.
//!
//! Every value node carries one of the closed [`Kind`] variants; the registry
//! maps the symbolic kind names callers use (`"string"`, `"integer"`, ...) to
//! a resolved [`KindSpec`]. Custom names can be registered at runtime, but the
//! rendering behavior of a spec is always one of the built-in kinds.

use indexmap::IndexMap;
use sv_core::error::Error;
use sv_core::{common_enum, common_struct, Result};

/// Canonical runtime types that unwrap with `->valueOf()` when assigned into
/// a bare scalar.
pub const SCALAR_CAST: [&str; 3] = ["stdlib::integer", "stdlib::string", "stdlib::boolean"];

common_enum! {
    /// The closed set of primitive kinds a value node can take.
    #[derive(Copy, Eq, Hash)]
    pub enum Kind {
        String,
        Integer,
        Boolean,
        Scalar,
        Array,
        Map,
        Hash,
    }
}

impl Kind {
    pub const ALL: [Kind; 7] = [
        Kind::String,
        Kind::Integer,
        Kind::Boolean,
        Kind::Scalar,
        Kind::Array,
        Kind::Map,
        Kind::Hash,
    ];

    /// The symbolic name the registry and callers use for this kind.
    pub fn symbol(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Integer => "integer",
            Kind::Boolean => "boolean",
            Kind::Scalar => "scalar",
            Kind::Array => "array",
            Kind::Map => "map",
            Kind::Hash => "hash",
        }
    }

    /// Canonical runtime-type name used in constructor calls.
    pub fn canonical(&self) -> &'static str {
        match self {
            Kind::String => "stdlib::string",
            Kind::Integer => "stdlib::integer",
            Kind::Boolean => "stdlib::boolean",
            Kind::Scalar => "scalar",
            Kind::Array => "stdlib::array",
            Kind::Map => "stdlib::hashmap",
            Kind::Hash => "hash",
        }
    }

    /// The stdlib package implementing the canonical type, where one exists.
    pub fn package(&self) -> Option<&'static str> {
        match self {
            Kind::String => Some("stdlib.string"),
            Kind::Integer => Some("stdlib.integer"),
            Kind::Boolean => Some("stdlib.boolean"),
            Kind::Array => Some("stdlib.array"),
            Kind::Map => Some("stdlib.hashmap"),
            Kind::Scalar | Kind::Hash => None,
        }
    }

    /// Container kinds hold nested elements described by an element kind.
    pub fn is_container(&self) -> bool {
        matches!(self, Kind::Array | Kind::Map)
    }

    /// Whether construction renders a bare scalar rather than a boxed type.
    pub fn is_bare_scalar(&self) -> bool {
        matches!(self, Kind::Scalar)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

common_struct! {
    /// A resolved registry entry: the rendering kind plus the canonical
    /// runtime-type name constructor calls are emitted against.
    pub struct KindSpec {
        pub kind: Kind,
        pub canonical: String,
    }
}

impl KindSpec {
    pub fn new(kind: Kind, canonical: impl Into<String>) -> Self {
        Self {
            kind,
            canonical: canonical.into(),
        }
    }

    pub fn builtin(kind: Kind) -> Self {
        Self::new(kind, kind.canonical())
    }
}

/// Insertion-ordered map from symbolic kind names to their specs.
///
/// There is no unregistration; `register` with an existing name overwrites.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entries: IndexMap<String, KindSpec>,
}

impl TypeRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry pre-populated with every built-in kind.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for kind in Kind::ALL {
            registry.register(kind.symbol(), KindSpec::builtin(kind));
        }
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, spec: KindSpec) {
        self.entries.insert(name.into(), spec);
    }

    pub fn resolve(&self, name: &str) -> Result<&KindSpec> {
        self.entries
            .get(name)
            .ok_or_else(|| Error::UnknownKind(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|name| name.as_str())
    }
}
