//! Type and declaration nodes
//!
//! A [`Type`] may be referenced from any number of declarations: `int a, b;`
//! points both declarations at the specifier type, and every `struct S`
//! reference after the definition points at the one struct type. A
//! [`Decl`] is always owned by exactly one parent (the program, a struct or
//! function type, or a declaration statement).

use std::fmt;
use std::sync::OnceLock;

use super::location::{Comments, Span};
use super::{DeclId, ExprId, InitId, StmtId, TypeId};

/// Type constructor tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Void,
    Bool,
    Char,
    Schar,
    Uchar,
    Short,
    Ushort,
    Int,
    Uint,
    Long,
    Ulong,
    Longlong,
    Ulonglong,
    Float,
    Double,
    LongDouble,
    Ptr,
    Array,
    Func,
    Struct,
    Union,
    Enum,
    Typedef,
}

impl TypeKind {
    pub fn name(self) -> &'static str {
        match self {
            TypeKind::Void => "Void",
            TypeKind::Bool => "Bool",
            TypeKind::Char => "Char",
            TypeKind::Schar => "Schar",
            TypeKind::Uchar => "Uchar",
            TypeKind::Short => "Short",
            TypeKind::Ushort => "Ushort",
            TypeKind::Int => "Int",
            TypeKind::Uint => "Uint",
            TypeKind::Long => "Long",
            TypeKind::Ulong => "Ulong",
            TypeKind::Longlong => "Longlong",
            TypeKind::Ulonglong => "Ulonglong",
            TypeKind::Float => "Float",
            TypeKind::Double => "Double",
            TypeKind::LongDouble => "LongDouble",
            TypeKind::Ptr => "Ptr",
            TypeKind::Array => "Array",
            TypeKind::Func => "Func",
            TypeKind::Struct => "Struct",
            TypeKind::Union => "Union",
            TypeKind::Enum => "Enum",
            TypeKind::Typedef => "Typedef",
        }
    }

    /// Arithmetic and `void` kinds that carry no base type.
    pub fn is_basic(self) -> bool {
        !matches!(
            self,
            TypeKind::Ptr
                | TypeKind::Array
                | TypeKind::Func
                | TypeKind::Struct
                | TypeKind::Union
                | TypeKind::Enum
                | TypeKind::Typedef
        )
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            TypeKind::Bool
                | TypeKind::Char
                | TypeKind::Schar
                | TypeKind::Uchar
                | TypeKind::Short
                | TypeKind::Ushort
                | TypeKind::Int
                | TypeKind::Uint
                | TypeKind::Long
                | TypeKind::Ulong
                | TypeKind::Longlong
                | TypeKind::Ulonglong
                | TypeKind::Enum
                | TypeKind::Typedef
        )
    }

    pub fn is_record(self) -> bool {
        matches!(self, TypeKind::Struct | TypeKind::Union)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `const` / `volatile` qualifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeQual {
    pub is_const: bool,
    pub is_volatile: bool,
}

impl TypeQual {
    pub fn is_empty(self) -> bool {
        !self.is_const && !self.is_volatile
    }
}

/// A type expression.
///
/// Field usage by kind:
/// - basic kinds: nothing, or `width` for a bit-field member
/// - `Ptr`: `base` is the pointee
/// - `Array`: `base` is the element type, `width` the length if given
/// - `Func`: `base` is the return type, `decls` the parameters
/// - `Struct`/`Union`: `tag`, `decls` the members (empty until defined)
/// - `Enum`: `tag`, `decls` the enumerators
/// - `Typedef`: `name` of the typedef
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub kind: TypeKind,
    pub qual: TypeQual,
    pub base: Option<TypeId>,
    pub tag: Option<String>,
    pub name: Option<String>,
    pub decls: Vec<DeclId>,
    pub width: Option<ExprId>,
    /// Function parameters end in `...`.
    pub variadic: bool,
    pub span: Span,
}

impl Type {
    fn bare(kind: TypeKind, span: Span) -> Self {
        Self {
            kind,
            qual: TypeQual::default(),
            base: None,
            tag: None,
            name: None,
            decls: Vec::new(),
            width: None,
            variadic: false,
            span,
        }
    }

    pub fn basic(kind: TypeKind, span: Span) -> Self {
        debug_assert!(kind.is_basic(), "{kind} is not a basic type");
        Self::bare(kind, span)
    }

    /// An integer member of `width` bits.
    pub fn bit_field(kind: TypeKind, width: ExprId, span: Span) -> Self {
        debug_assert!(kind.is_integer(), "bit-field of non-integer type {kind}");
        Self {
            width: Some(width),
            ..Self::bare(kind, span)
        }
    }

    pub fn pointer(base: TypeId, span: Span) -> Self {
        Self {
            base: Some(base),
            ..Self::bare(TypeKind::Ptr, span)
        }
    }

    pub fn array(base: TypeId, width: Option<ExprId>, span: Span) -> Self {
        Self {
            base: Some(base),
            width,
            ..Self::bare(TypeKind::Array, span)
        }
    }

    pub fn function(ret: TypeId, params: Vec<DeclId>, variadic: bool, span: Span) -> Self {
        Self {
            base: Some(ret),
            decls: params,
            variadic,
            ..Self::bare(TypeKind::Func, span)
        }
    }

    /// A struct or union; `members` may be filled in later by the builder
    /// when the tag is defined after its first use.
    pub fn record(kind: TypeKind, tag: Option<String>, members: Vec<DeclId>, span: Span) -> Self {
        debug_assert!(kind.is_record(), "{kind} is not a struct or union");
        Self {
            tag,
            decls: members,
            ..Self::bare(kind, span)
        }
    }

    pub fn enumeration(tag: Option<String>, enumerators: Vec<DeclId>, span: Span) -> Self {
        Self {
            tag,
            decls: enumerators,
            ..Self::bare(TypeKind::Enum, span)
        }
    }

    pub fn typedef_name(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::bare(TypeKind::Typedef, span)
        }
    }

    pub fn qualified(mut self, qual: TypeQual) -> Self {
        self.qual = qual;
        self
    }
}

/// Storage class written on a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Storage {
    #[default]
    None,
    Auto,
    Register,
    Static,
    Extern,
    Typedef,
}

/// A named entity: variable, function, parameter, member, enumerator,
/// typedef, or a tag-only declaration such as `struct S { ... };` (whose
/// name is empty).
#[derive(Debug)]
pub struct Decl {
    pub name: String,
    pub storage: Storage,
    pub is_inline: bool,
    pub ty: TypeId,
    pub init: Option<InitId>,
    pub body: Option<StmtId>,
    pub span: Span,
    pub comments: Comments,

    // output group, assigned once by the emission router
    pub(crate) group: OnceLock<String>,
}

impl Decl {
    pub fn new(name: impl Into<String>, ty: TypeId, span: Span) -> Self {
        Self {
            name: name.into(),
            storage: Storage::None,
            is_inline: false,
            ty,
            init: None,
            body: None,
            span,
            comments: Comments::default(),
            group: OnceLock::new(),
        }
    }

    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_init(mut self, init: InitId) -> Self {
        debug_assert!(self.body.is_none(), "declaration with both body and initializer");
        self.init = Some(init);
        self
    }

    pub fn with_body(mut self, body: StmtId) -> Self {
        debug_assert!(self.init.is_none(), "declaration with both body and initializer");
        self.body = Some(body);
        self
    }

    pub fn is_typedef(&self) -> bool {
        self.storage == Storage::Typedef
    }

    /// Output group assigned by the router, if any.
    pub fn group(&self) -> Option<&str> {
        self.group.get().map(String::as_str)
    }
}
