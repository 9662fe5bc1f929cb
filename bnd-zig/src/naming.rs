//! Name translation — C identifiers → Zig naming conventions.
//!
//! Types are UpperCamelCase without the module prefix, enum items drop the
//! `PREFIX_CATEGORY_` head, constants are lower-cased snake_case.

/// `sg_pass_action` → `PassAction`.
///
/// The first `_`-delimited segment is the module prefix and is dropped.
pub fn as_zig_type(name: &str) -> String {
    name.to_lowercase()
        .split('_')
        .skip(1)
        .map(capitalize)
        .collect()
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `SG_BACKEND_GLCORE33` → `Glcore33`, `_SG_BACKEND_DEFAULT` → `Default`,
/// `SG_TEXTURETYPE_3D` → `_3D`.
///
/// The leading underscore of an alias spelling is ignored, then the module
/// prefix and category segments are dropped. Remaining segments starting
/// with a letter are title-cased; segments starting with a digit keep their
/// spelling and a leading digit gets an `_` in front. A name with nothing
/// after those two segments (`M_E`) is kept as written.
pub fn as_enum_item_name(name: &str) -> String {
    let name = name.strip_prefix('_').unwrap_or(name);
    let mut item = name
        .split('_')
        .skip(2)
        .map(|part| {
            if part.starts_with(|c: char| c.is_ascii_digit()) {
                part.to_string()
            } else {
                capitalize(&part.to_lowercase())
            }
        })
        .collect::<Vec<_>>()
        .join("_");
    if item.is_empty() {
        item = name.to_string();
    }
    if item.starts_with(|c: char| c.is_ascii_digit()) {
        item.insert(0, '_');
    }
    item
}

/// `SG_MAX_SHADERSTAGE_BUFFERS` with prefix `sg_` → `max_shaderstage_buffers`.
pub fn as_const_name(name: &str, prefix: &str) -> String {
    let lower = name.to_lowercase();
    match lower.strip_prefix(prefix) {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

/// Zig keywords and primitive names that cannot be used as bare identifiers.
const ZIG_RESERVED: &[&str] = &[
    "addrspace",
    "align",
    "allowzero",
    "and",
    "anyframe",
    "anyopaque",
    "anytype",
    "asm",
    "async",
    "await",
    "bool",
    "break",
    "callconv",
    "catch",
    "comptime",
    "const",
    "continue",
    "defer",
    "else",
    "enum",
    "errdefer",
    "error",
    "export",
    "extern",
    "false",
    "fn",
    "for",
    "if",
    "inline",
    "linksection",
    "noalias",
    "noinline",
    "noreturn",
    "nosuspend",
    "null",
    "opaque",
    "or",
    "orelse",
    "packed",
    "pub",
    "resume",
    "return",
    "struct",
    "suspend",
    "switch",
    "test",
    "threadlocal",
    "true",
    "try",
    "type",
    "undefined",
    "union",
    "unreachable",
    "usingnamespace",
    "var",
    "void",
    "volatile",
    "while",
];

/// Field and parameter names pass through unchanged unless they collide with
/// a Zig keyword, in which case they are quoted as `@"name"`.
pub fn as_field_name(name: &str) -> String {
    if ZIG_RESERVED.contains(&name) {
        format!("@\"{name}\"")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names() {
        assert_eq!(as_zig_type("module_some_type"), "SomeType");
        assert_eq!(as_zig_type("sg_desc"), "Desc");
        assert_eq!(as_zig_type("sg_pass_action"), "PassAction");
    }

    #[test]
    fn enum_item_names() {
        assert_eq!(as_enum_item_name("MODULE_ENUM_FOO"), "Foo");
        assert_eq!(as_enum_item_name("_MODULE_ENUM_FOO"), "Foo");
        assert_eq!(as_enum_item_name("MODULE_ENUM_3D"), "_3D");
        assert_eq!(as_enum_item_name("SG_PIXELFORMAT_RGBA8_SNORM"), "Rgba8_Snorm");
        assert_eq!(as_enum_item_name("_SG_BACKEND_FORCE_U32"), "Force_U32");
    }

    #[test]
    fn short_enum_item_names_are_kept() {
        assert_eq!(as_enum_item_name("M_E"), "M_E");
        assert_eq!(as_enum_item_name("_M_E"), "M_E");
        assert_eq!(as_enum_item_name("NONE"), "NONE");
        assert_eq!(as_enum_item_name("_"), "");
    }

    #[test]
    fn const_names() {
        assert_eq!(as_const_name("MODULE_MAX_ITEMS", "module_"), "max_items");
        assert_eq!(as_const_name("OTHER_LIMIT", "module_"), "other_limit");
    }

    #[test]
    fn reserved_field_names_are_quoted() {
        assert_eq!(as_field_name("type"), "@\"type\"");
        assert_eq!(as_field_name("width"), "width");
    }
}
