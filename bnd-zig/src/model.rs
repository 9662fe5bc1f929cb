//! Model types — the declaration list read from JSON, the parsed C type tree,
//! the classifier's categories, and the registries built before emission.
//!
//! The input types mirror the upstream JSON document one-to-one. Everything
//! else is derived from them and never mutated once a pass has finished.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Input document
// ---------------------------------------------------------------------------

/// One API module as produced by the header-parsing stage.
#[derive(Debug, Deserialize)]
pub struct Module {
    /// Module name (e.g. `sokol_gfx`).
    pub module: String,
    /// Identifier prefix shared by the module's symbols (e.g. `sg_`).
    pub prefix: String,
    #[serde(default)]
    pub decls: Vec<Decl>,
}

/// A single top-level declaration, tagged by its `kind` field.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Decl {
    Struct(StructDecl),
    Enum(EnumDecl),
    Consts(ConstsDecl),
    Func(FuncDecl),
}

#[derive(Debug, Deserialize)]
pub struct StructDecl {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

/// A struct field with its raw C type string.
#[derive(Debug, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Deserialize)]
pub struct EnumDecl {
    pub name: String,
    #[serde(default)]
    pub items: Vec<EnumItem>,
}

/// An enum item. `value` is only present when the header spells it out.
#[derive(Debug, Deserialize)]
pub struct EnumItem {
    pub name: String,
    #[serde(default)]
    pub value: Option<ItemValue>,
}

/// A group of integer constants (an anonymous enum or a block of `#define`s).
#[derive(Debug, Deserialize)]
pub struct ConstsDecl {
    #[serde(default)]
    pub items: Vec<ConstItem>,
}

#[derive(Debug, Deserialize)]
pub struct ConstItem {
    pub name: String,
    pub value: ItemValue,
}

/// A function declaration. `ty` is the C declarator, e.g. `void (const sg_desc *)`.
#[derive(Debug, Deserialize)]
pub struct FuncDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
}

#[derive(Debug, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// A literal value as spelled in the input: the upstream stage writes header
/// text verbatim, but hand-written inputs often use plain JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ItemValue {
    Int(i64),
    Text(String),
}

impl ItemValue {
    /// Integer value of the literal, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ItemValue::Int(v) => Some(*v),
            ItemValue::Text(s) => parse_c_int(s),
        }
    }
}

impl fmt::Display for ItemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemValue::Int(v) => write!(f, "{v}"),
            ItemValue::Text(s) => f.write_str(s.trim()),
        }
    }
}

/// Parse a C integer literal: decimal, hex (`0x1F`), octal (`017`), with an
/// optional leading `-` and trailing `U`/`L` suffixes.
pub fn parse_c_int(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negated, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, s),
    };
    let s = s.trim_end_matches(['u', 'U', 'l', 'L']);

    let magnitude = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()?
    } else if let Some(octal) = s.strip_prefix('0') {
        if octal.is_empty() {
            0
        } else {
            u64::from_str_radix(octal, 8).ok()?
        }
    } else if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        s.parse::<u64>().ok()?
    } else {
        return None;
    };

    let value = i64::try_from(magnitude).ok()?;
    Some(if negated { -value } else { value })
}

// ---------------------------------------------------------------------------
// Parsed C type tree
// ---------------------------------------------------------------------------

/// A parsed C type string. Only the shapes a flat C API surface uses can be
/// represented; see [`parse_type`](crate::parse::parse_type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CType {
    /// A single identifier, optionally `const`-qualified (`float`, `sg_desc`).
    Named { name: String, is_const: bool },
    /// One level of pointer.
    Ptr { pointee: Box<CType> },
    /// Fixed-size array with one or two dimensions, outermost first.
    Array { element: Box<CType>, dims: Vec<usize> },
    /// `ret (*)(params...)`. An empty `params` means `()` or `(void)`.
    FnPtr {
        return_type: Box<CType>,
        params: Vec<CType>,
    },
}

// ---------------------------------------------------------------------------
// Primitive vocabulary
// ---------------------------------------------------------------------------

/// The fixed set of C primitive keywords the generator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prim {
    Int,
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl Prim {
    pub const ALL: [Prim; 12] = [
        Prim::Int,
        Prim::Bool,
        Prim::I8,
        Prim::U8,
        Prim::I16,
        Prim::U16,
        Prim::I32,
        Prim::U32,
        Prim::I64,
        Prim::U64,
        Prim::F32,
        Prim::F64,
    ];

    pub fn from_c(name: &str) -> Option<Prim> {
        Prim::ALL.into_iter().find(|p| p.c_name() == name)
    }

    pub fn c_name(self) -> &'static str {
        match self {
            Prim::Int => "int",
            Prim::Bool => "bool",
            Prim::I8 => "int8_t",
            Prim::U8 => "uint8_t",
            Prim::I16 => "int16_t",
            Prim::U16 => "uint16_t",
            Prim::I32 => "int32_t",
            Prim::U32 => "uint32_t",
            Prim::I64 => "int64_t",
            Prim::U64 => "uint64_t",
            Prim::F32 => "float",
            Prim::F64 => "double",
        }
    }

    pub fn zig_name(self) -> &'static str {
        match self {
            Prim::Int | Prim::I32 => "i32",
            Prim::Bool => "bool",
            Prim::I8 => "i8",
            Prim::U8 => "u8",
            Prim::I16 => "i16",
            Prim::U16 => "u16",
            Prim::U32 => "u32",
            Prim::I64 => "i64",
            Prim::U64 => "u64",
            Prim::F32 => "f32",
            Prim::F64 => "f64",
        }
    }

    /// Zero literal for the primitive's kind.
    pub fn default_literal(self) -> &'static str {
        match self {
            Prim::Bool => "false",
            Prim::F32 | Prim::F64 => "0.0",
            _ => "0",
        }
    }
}

// ---------------------------------------------------------------------------
// Classification result
// ---------------------------------------------------------------------------

/// What kind of C type a type string denotes, resolved against a
/// [`TypeRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    /// `void` — only meaningful as a function result.
    Void,
    Prim(Prim),
    Struct(String),
    Enum(String),
    /// `void *`
    VoidPtr,
    /// `const void *`
    ConstVoidPtr,
    /// `const char *`
    StringPtr,
    /// `const <prim> *`
    PrimPtr(Prim),
    /// `const <struct> *`
    StructPtr(String),
    FuncPtr {
        result: Box<Category>,
        params: Vec<Category>,
    },
    Array1 {
        element: Box<Category>,
        len: usize,
    },
    Array2 {
        element: Box<Category>,
        outer: usize,
        inner: usize,
    },
    Unrecognized,
}

impl Category {
    /// True if this category, or anything nested inside it, is unresolved.
    pub fn is_unresolved(&self) -> bool {
        match self {
            Category::Unrecognized => true,
            Category::FuncPtr { result, params } => {
                result.is_unresolved() || params.iter().any(Category::is_unresolved)
            }
            Category::Array1 { element, .. } | Category::Array2 { element, .. } => {
                element.is_unresolved()
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Registries
// ---------------------------------------------------------------------------

/// Names known to the current generation run.
///
/// Built by [`build_type_registry`](crate::classify::build_type_registry)
/// (struct and enum names) and then extended by
/// [`analyze_layouts`](crate::classify::analyze_layouts) (compatible structs).
/// Read-only during emission.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    structs: HashSet<String>,
    /// Enum name → transformed item names in declaration order.
    enums: HashMap<String, Vec<String>>,
    compatible: HashSet<String>,
}

impl TypeRegistry {
    pub fn register_struct(&mut self, name: &str) {
        self.structs.insert(name.to_string());
    }

    pub fn register_enum(&mut self, name: &str, items: Vec<String>) {
        self.enums.insert(name.to_string(), items);
    }

    pub fn mark_compatible(&mut self, name: &str) {
        self.compatible.insert(name.to_string());
    }

    pub fn is_struct(&self, name: &str) -> bool {
        self.structs.contains(name)
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.contains_key(name)
    }

    /// Returns true if the struct was judged layout-compatible.
    pub fn is_compatible(&self, name: &str) -> bool {
        self.compatible.contains(name)
    }

    /// The enum's first declared item, used as its default value.
    pub fn enum_default_item(&self, name: &str) -> Option<&str> {
        self.enums.get(name)?.first().map(String::as_str)
    }

    pub fn struct_count(&self) -> usize {
        self.structs.len()
    }

    pub fn compatible_count(&self) -> usize {
        self.compatible.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_int_literals() {
        assert_eq!(parse_c_int("42"), Some(42));
        assert_eq!(parse_c_int("0x7FFFFFFF"), Some(0x7FFF_FFFF));
        assert_eq!(parse_c_int("0"), Some(0));
        assert_eq!(parse_c_int("017"), Some(15));
        assert_eq!(parse_c_int("16u"), Some(16));
        assert_eq!(parse_c_int("-1"), Some(-1));
        assert_eq!(parse_c_int("(1<<3)"), None);
        assert_eq!(parse_c_int(""), None);
    }

    #[test]
    fn prim_vocabulary_is_total() {
        for p in Prim::ALL {
            assert_eq!(Prim::from_c(p.c_name()), Some(p));
        }
        assert_eq!(Prim::from_c("char"), None);
    }

    #[test]
    fn item_values_deserialize_from_string_or_number() {
        let items: Vec<EnumItem> = serde_json::from_str(
            r#"[{"name": "A", "value": "0x10"}, {"name": "B", "value": 3}, {"name": "C"}]"#,
        )
        .unwrap();
        assert_eq!(items[0].value.as_ref().and_then(ItemValue::as_int), Some(16));
        assert_eq!(items[1].value.as_ref().and_then(ItemValue::as_int), Some(3));
        assert!(items[2].value.is_none());
    }
}
