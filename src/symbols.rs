//! Host-populated symbol model.
//!
//! The binder resolves every call to a method symbol before this engine
//! runs; the engine only reads the facts recorded here. Extension-method
//! receivers are normalised into [`MethodSymbol::receiver`] by the binder
//! and never appear as positional parameters.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Handle into a [`MethodTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(pub usize);

/// Arena of method symbols shared by the classifier and the validator.
#[derive(Debug, Default)]
pub struct MethodTable {
    methods: Vec<MethodSymbol>,
}

impl MethodTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, method: MethodSymbol) -> MethodId {
        let id = MethodId(self.methods.len());
        self.methods.push(method);
        id
    }

    #[must_use]
    pub fn get(&self, id: MethodId) -> Option<&MethodSymbol> {
        self.methods.get(id.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Member visibility, as declared in source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Visibility {
    Public,
    #[default]
    Internal,
    Protected,
    Private,
    ProtectedInternal,
    PrivateProtected,
}

/// What kind of callable a symbol is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    Ordinary,
    PropertyAccessor,
    EventAccessor,
    Constructor,
    Destructor,
    LocalFunction,
    Lambda,
    Operator,
    Conversion,
}

/// Declaration modifiers the validator consults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct MethodModifiers {
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_extension: bool,
}

impl MethodModifiers {
    /// Whether calls to the method go through override dispatch.
    #[must_use]
    pub fn dispatches_virtually(self) -> bool {
        self.is_virtual || self.is_abstract || self.is_override
    }
}

/// One enclosing type in a member's container chain, outermost first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Container {
    pub name: String,
    pub type_param_count: usize,
}

impl Container {
    #[must_use]
    pub fn new(name: impl Into<String>, type_param_count: usize) -> Self {
        Self {
            name: name.into(),
            type_param_count,
        }
    }
}

/// By-reference binding mode of a receiver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RefKind {
    #[default]
    Value,
    Ref,
    In,
}

/// Ref-safety annotation restricting how long a by-reference receiver may
/// be retained beyond the call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scoped {
    #[default]
    None,
    Scoped,
    UnscopedRef,
}

/// Receiver (`this`) parameter of an instance or extension method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receiver {
    pub ty: TypeRef,
    pub ref_kind: RefKind,
    pub scoped: Scoped,
}

impl Receiver {
    #[must_use]
    pub fn by_value(ty: TypeRef) -> Self {
        Self {
            ty,
            ref_kind: RefKind::Value,
            scoped: Scoped::None,
        }
    }

    #[must_use]
    pub fn by_ref(ty: TypeRef) -> Self {
        Self {
            ty,
            ref_kind: RefKind::Ref,
            scoped: Scoped::None,
        }
    }

    #[must_use]
    pub fn with_scoped(mut self, scoped: Scoped) -> Self {
        self.scoped = scoped;
        self
    }
}

/// Positional parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
    pub ref_kind: RefKind,
    pub is_params: bool,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            ref_kind: RefKind::Value,
            is_params: false,
        }
    }

    #[must_use]
    pub fn with_ref_kind(mut self, ref_kind: RefKind) -> Self {
        self.ref_kind = ref_kind;
        self
    }

    #[must_use]
    pub fn with_params(mut self) -> Self {
        self.is_params = true;
        self
    }
}

/// Nullable-reference annotation on a named type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Nullability {
    /// Declared outside an annotation context; compares silently.
    #[default]
    Oblivious,
    NonNull,
    Nullable,
}

/// Element of a tuple type; names participate only in soft comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TupleElement {
    pub name: Option<String>,
    pub ty: TypeRef,
}

impl TupleElement {
    #[must_use]
    pub fn unnamed(ty: TypeRef) -> Self {
        Self { name: None, ty }
    }

    #[must_use]
    pub fn named(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: Some(name.into()),
            ty,
        }
    }
}

/// Type reference, shaped for the signature-compatibility axes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeRef {
    Named {
        name: String,
        args: Vec<TypeRef>,
        nullability: Nullability,
    },
    Tuple(Vec<TupleElement>),
    /// Late-bound `dynamic`; its underlying type is `object`.
    Dynamic,
    /// Platform-sized integer (`nint`/`nuint`).
    NativeInt {
        unsigned: bool,
    },
    /// Reference to the n-th type parameter in scope.
    TypeParam(usize),
}

/// Spellings that denote the platform-sized integers, keyed to signedness.
static NATIVE_INT_NAMES: Lazy<HashMap<&'static str, bool>> = Lazy::new(|| {
    HashMap::from([
        ("nint", false),
        ("nuint", true),
        ("IntPtr", false),
        ("UIntPtr", true),
        ("Std.IntPtr", false),
        ("Std.UIntPtr", true),
    ])
});

impl TypeRef {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
            nullability: Nullability::Oblivious,
        }
    }

    #[must_use]
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args,
            nullability: Nullability::Oblivious,
        }
    }

    #[must_use]
    pub fn with_nullability(self, nullability: Nullability) -> Self {
        match self {
            TypeRef::Named { name, args, .. } => TypeRef::Named {
                name,
                args,
                nullability,
            },
            other => other,
        }
    }

    /// The signedness of the type when it denotes a platform-sized
    /// integer, under any of its interchangeable spellings.
    #[must_use]
    pub fn as_native_int(&self) -> Option<bool> {
        match self {
            TypeRef::NativeInt { unsigned } => Some(*unsigned),
            TypeRef::Named { name, args, .. } if args.is_empty() => {
                NATIVE_INT_NAMES.get(name.as_str()).copied()
            }
            _ => None,
        }
    }
}

/// A bound method symbol, as the binder records it.
#[derive(Clone, Debug)]
pub struct MethodSymbol {
    pub name: String,
    pub kind: MethodKind,
    pub visibility: Visibility,
    pub modifiers: MethodModifiers,
    /// Enclosing type chain, outermost first.
    pub containers: Vec<Container>,
    /// Count of the method's own generic type parameters.
    pub arity: usize,
    pub receiver: Option<Receiver>,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeRef,
    /// Marked as callable only from unmanaged code.
    pub unmanaged_callers_only: bool,
    pub owner_namespace: Option<String>,
    pub owner_package: Option<String>,
}

impl MethodSymbol {
    /// A public static ordinary method with no parameters, returning
    /// nothing; the usual starting point for building symbols.
    #[must_use]
    pub fn ordinary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MethodKind::Ordinary,
            visibility: Visibility::Public,
            modifiers: MethodModifiers {
                is_static: true,
                ..MethodModifiers::default()
            },
            containers: Vec::new(),
            arity: 0,
            receiver: None,
            parameters: Vec::new(),
            return_type: TypeRef::named("void"),
            unmanaged_callers_only: false,
            owner_namespace: None,
            owner_package: None,
        }
    }

    /// Combined generic arity: the method's own type parameters plus
    /// those contributed by its container chain.
    #[must_use]
    pub fn combined_generic_arity(&self) -> usize {
        self.arity
            + self
                .containers
                .iter()
                .map(|container| container.type_param_count)
                .sum::<usize>()
    }

    /// Whether any enclosing type declares type parameters.
    #[must_use]
    pub fn has_generic_container(&self) -> bool {
        self.containers
            .iter()
            .any(|container| container.type_param_count > 0)
    }

    /// `Container.Nested.name` display form for messages.
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut parts: Vec<&str> = self
            .containers
            .iter()
            .map(|container| container.name.as_str())
            .collect();
        parts.push(self.name.as_str());
        parts.join(".")
    }

    /// Name of the immediately enclosing type, when there is one.
    #[must_use]
    pub fn owner_type(&self) -> Option<&str> {
        self.containers
            .last()
            .map(|container| container.name.as_str())
    }
}
