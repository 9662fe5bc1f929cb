//! Emitter — model declarations + registry → Zig source text.

use std::fmt::{self, Write};

use tracing::{debug, warn};

use crate::classify::{classify, classify_ctype};
use crate::config::GenOptions;
use crate::model::*;
use crate::naming::{as_const_name, as_enum_item_name, as_field_name, as_zig_type};
use crate::parse;

/// Prefix shared by every placeholder the emitter writes for a type it could
/// not translate.
pub const MARKER: &str = "// FIXME:";

/// Generic deep-merge used by the per-struct `init` functions.
const INIT_WITH_HELPER: &str = r#"fn init_with(target_ptr: anytype, opts: anytype) void {
    switch (@typeInfo(@TypeOf(target_ptr.*))) {
        .Array => {
            inline for (opts, 0..) |item, i| {
                init_with(&target_ptr.*[i], item);
            }
        },
        .Struct => {
            inline for (@typeInfo(@TypeOf(opts)).Struct.fields) |field| {
                init_with(&@field(target_ptr.*, field.name), @field(opts, field.name));
            }
        },
        else => {
            target_ptr.* = opts;
        },
    }
}
"#;

/// Emit a whole module. The registry must already hold the struct, enum and
/// compatibility information for `module`.
pub fn emit_module(
    module: &Module,
    registry: &TypeRegistry,
    options: &GenOptions,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    out.push_str("// machine generated, do not edit\n\n");
    out.push_str("//--- helper functions ---\n");
    if options.init_helper {
        out.push_str(INIT_WITH_HELPER);
    }
    out.push_str("//--- API declarations ---\n");

    for decl in &module.decls {
        match decl {
            Decl::Struct(s) => emit_struct(&mut out, s, registry, options)?,
            Decl::Enum(e) => emit_enum(&mut out, e, options)?,
            Decl::Consts(c) => emit_consts(&mut out, c, &module.prefix)?,
            Decl::Func(f) => emit_function(&mut out, f, registry, options)?,
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Struct emission
// ---------------------------------------------------------------------------

fn emit_struct(
    out: &mut String,
    s: &StructDecl,
    registry: &TypeRegistry,
    options: &GenOptions,
) -> fmt::Result {
    let zig_name = as_zig_type(&s.name);
    let layout = if registry.is_compatible(&s.name) {
        "extern struct"
    } else {
        "struct"
    };
    writeln!(out, "pub const {zig_name} = {layout} {{")?;

    for field in &s.fields {
        let category = classify(&field.ty, registry);
        match field_line(&field.name, &category, registry) {
            Some(line) => writeln!(out, "    {line}")?,
            None => {
                let reason = field_failure(&category);
                warn!(owner = %s.name, field = %field.name, ty = %field.ty, reason, "field placeholder");
                writeln!(
                    out,
                    "    {MARKER} {reason} for field '{}': '{}'",
                    field.name, field.ty
                )?;
            }
        }
    }

    if options.init_helper {
        if s.fields.iter().any(|f| f.name == "init") {
            warn!(owner = %s.name, "field 'init' shadows the init function");
            writeln!(
                out,
                "    {MARKER} init function not generated, field 'init' uses the name"
            )?;
        } else {
            writeln!(out, "    pub fn init(options: anytype) {zig_name} {{")?;
            writeln!(out, "        var item: {zig_name} = .{{}};")?;
            out.push_str("        init_with(&item, options);\n");
            out.push_str("        return item;\n");
            out.push_str("    }\n");
        }
    }
    out.push_str("};\n");

    debug!(name = %s.name, fields = s.fields.len(), layout, "emitted struct");
    Ok(())
}

/// `name: Type = default,` for a field, or `None` if either half is missing.
fn field_line(name: &str, category: &Category, registry: &TypeRegistry) -> Option<String> {
    let ty = zig_field_type(category)?;
    let default = default_value(category, registry)?;
    Some(format!("{}: {ty} = {default},", as_field_name(name)))
}

fn field_failure(category: &Category) -> &'static str {
    match category {
        _ if category.is_unresolved() => "unresolved type",
        // `void` is not a field type in C.
        Category::Void => "unresolved type",
        Category::Array2 { element, .. } if matches!(**element, Category::Prim(_)) => {
            "unsupported 2D array of primitive type"
        }
        Category::Enum(_) => "unsupported enum without items",
        _ => "unsupported type",
    }
}

// ---------------------------------------------------------------------------
// Default values
// ---------------------------------------------------------------------------

/// Zero-equivalent initializer for a field of the given category.
///
/// Returns `None` for categories that have no sensible default: `void`,
/// unresolved types, 2D arrays of primitives and enums without items.
pub fn default_value(category: &Category, registry: &TypeRegistry) -> Option<String> {
    match category {
        Category::Prim(p) => Some(p.default_literal().to_string()),
        Category::Struct(_) => Some(".{}".to_string()),
        Category::Enum(name) => registry
            .enum_default_item(name)
            .map(|item| format!(".{item}")),
        Category::VoidPtr
        | Category::ConstVoidPtr
        | Category::StringPtr
        | Category::PrimPtr(_)
        | Category::StructPtr(_)
        | Category::FuncPtr { .. } => Some("null".to_string()),
        Category::Array1 { element, len } => {
            let ty = zig_field_type(element)?;
            let value = default_value(element, registry)?;
            Some(format!("[_]{ty}{{{value}}} ** {len}"))
        }
        Category::Array2 {
            element,
            outer,
            inner,
        } => {
            if matches!(**element, Category::Prim(_)) {
                return None;
            }
            let ty = zig_field_type(element)?;
            let value = default_value(element, registry)?;
            Some(format!(
                "[_][{inner}]{ty}{{[_]{ty}{{{value}}} ** {inner}}} ** {outer}"
            ))
        }
        Category::Void | Category::Unrecognized => None,
    }
}

// ---------------------------------------------------------------------------
// Category → Zig type mapping
// ---------------------------------------------------------------------------

/// Zig type for a struct field.
pub fn zig_field_type(category: &Category) -> Option<String> {
    match category {
        Category::PrimPtr(p) => Some(format!("?[*]const {}", p.zig_name())),
        Category::Array1 { element, len } => {
            Some(format!("[{len}]{}", zig_field_type(element)?))
        }
        Category::Array2 {
            element,
            outer,
            inner,
        } => Some(format!("[{outer}][{inner}]{}", zig_field_type(element)?)),
        other => zig_extern_type(other),
    }
}

/// Zig type for an extern function parameter (or function-pointer argument).
/// Arrays and `void` are not valid here.
pub fn zig_extern_type(category: &Category) -> Option<String> {
    match category {
        Category::Prim(p) => Some(p.zig_name().to_string()),
        Category::Struct(name) | Category::Enum(name) => Some(as_zig_type(name)),
        Category::VoidPtr => Some("?*anyopaque".to_string()),
        Category::ConstVoidPtr => Some("?*const anyopaque".to_string()),
        Category::StringPtr => Some("[*c]const u8".to_string()),
        Category::PrimPtr(p) => Some(format!("[*c]const {}", p.zig_name())),
        Category::StructPtr(name) => Some(format!("[*c]const {}", as_zig_type(name))),
        Category::FuncPtr { result, params } => {
            let params = params
                .iter()
                .map(zig_extern_type)
                .collect::<Option<Vec<_>>>()?;
            Some(format!(
                "?*const fn ({}) callconv(.C) {}",
                params.join(", "),
                zig_result_type(result)?
            ))
        }
        Category::Void
        | Category::Array1 { .. }
        | Category::Array2 { .. }
        | Category::Unrecognized => None,
    }
}

/// Zig type for a function result: like [`zig_extern_type`] but `void` is allowed.
pub fn zig_result_type(category: &Category) -> Option<String> {
    match category {
        Category::Void => Some("void".to_string()),
        other => zig_extern_type(other),
    }
}

// ---------------------------------------------------------------------------
// Enum emission
// ---------------------------------------------------------------------------

fn emit_enum(out: &mut String, e: &EnumDecl, options: &GenOptions) -> fmt::Result {
    writeln!(out, "pub const {} = enum(i32) {{", as_zig_type(&e.name))?;

    // `None` once an explicit value could not be evaluated; later items then
    // rely on Zig's own auto-increment.
    let mut next: Option<i64> = Some(0);
    let mut emitted = 0usize;
    for item in &e.items {
        let item_name = as_enum_item_name(&item.name);
        let value = match &item.value {
            Some(v) => match v.as_int() {
                Some(n) => {
                    next = n.checked_add(1);
                    Some(n.to_string())
                }
                None => {
                    next = None;
                    Some(v.to_string())
                }
            },
            None => {
                let n = next;
                next = n.and_then(|n| n.checked_add(1));
                n.map(|n| n.to_string())
            }
        };
        if options.is_sentinel(&item_name) {
            continue;
        }
        if item_name.is_empty() {
            warn!(owner = %e.name, item = %item.name, "enum item placeholder");
            writeln!(out, "    {MARKER} unsupported enum item name '{}'", item.name)?;
            continue;
        }
        match value {
            Some(v) => writeln!(out, "    {item_name} = {v},")?,
            None => writeln!(out, "    {item_name},")?,
        }
        emitted += 1;
    }
    out.push_str("};\n");

    debug!(name = %e.name, items = emitted, "emitted enum");
    Ok(())
}

// ---------------------------------------------------------------------------
// Constant emission
// ---------------------------------------------------------------------------

fn emit_consts(out: &mut String, c: &ConstsDecl, prefix: &str) -> fmt::Result {
    for item in &c.items {
        writeln!(
            out,
            "pub const {} = {};",
            as_const_name(&item.name, prefix),
            item.value
        )?;
    }
    debug!(items = c.items.len(), "emitted consts");
    Ok(())
}

// ---------------------------------------------------------------------------
// Function emission
// ---------------------------------------------------------------------------

fn emit_function(
    out: &mut String,
    f: &FuncDecl,
    registry: &TypeRegistry,
    options: &GenOptions,
) -> fmt::Result {
    let result = match parse::function_result(&f.ty) {
        Ok(ctype) => classify_ctype(&ctype, registry),
        Err(_) => Category::Unrecognized,
    };

    let mut failures = Vec::new();
    let result_ty = zig_result_type(&result).unwrap_or_else(|| {
        failures.push(format!("result of '{}': '{}'", f.name, f.ty));
        "???".to_string()
    });

    let params: Vec<String> = f
        .params
        .iter()
        .map(|p| {
            let ty = zig_extern_type(&classify(&p.ty, registry)).unwrap_or_else(|| {
                failures.push(format!("parameter '{}' of '{}': '{}'", p.name, f.name, p.ty));
                "???".to_string()
            });
            if p.name.is_empty() {
                ty
            } else {
                format!("{}: {ty}", as_field_name(&p.name))
            }
        })
        .collect();

    let decl = format!(
        "pub extern fn {}({}) {result_ty};",
        f.name,
        params.join(", ")
    );

    if failures.is_empty() {
        writeln!(out, "{decl}")?;
        debug!(name = %f.name, params = f.params.len(), "emitted function");
    } else {
        for failure in &failures {
            warn!(function = %f.name, detail = %failure, "function placeholder");
            writeln!(out, "{MARKER} unresolved type for {failure}")?;
        }
        writeln!(out, "// {decl}")?;
    }

    if options.wrappers {
        writeln!(out, "// wrapper for {} not generated", f.name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TypeRegistry {
        let mut r = TypeRegistry::default();
        r.register_struct("sg_color");
        r.register_enum(
            "sg_action",
            vec!["Default".to_string(), "Clear".to_string()],
        );
        r.register_enum("sg_empty", Vec::new());
        r
    }

    fn emit_json(decls: &str, options: &GenOptions) -> String {
        let module: Module = serde_json::from_str(&format!(
            r#"{{"module": "m", "prefix": "m_", "decls": [{decls}]}}"#
        ))
        .unwrap();
        let mut r = crate::classify::build_type_registry(&module);
        crate::classify::analyze_layouts(&module, &mut r);
        emit_module(&module, &r, options).unwrap()
    }

    fn default_of(ty: &str) -> Option<String> {
        let r = registry();
        default_value(&classify(ty, &r), &r)
    }

    #[test]
    fn primitive_defaults() {
        let r = registry();
        for p in Prim::ALL {
            let expected = match p {
                Prim::Bool => "false",
                Prim::F32 | Prim::F64 => "0.0",
                _ => "0",
            };
            assert_eq!(default_value(&Category::Prim(p), &r).as_deref(), Some(expected));
        }
    }

    #[test]
    fn aggregate_and_pointer_defaults() {
        assert_eq!(default_of("sg_color").as_deref(), Some(".{}"));
        assert_eq!(default_of("sg_action").as_deref(), Some(".Default"));
        assert_eq!(default_of("sg_empty"), None);
        assert_eq!(default_of("const char *").as_deref(), Some("null"));
        assert_eq!(default_of("void (*)(void)").as_deref(), Some("null"));
    }

    #[test]
    fn array_defaults() {
        assert_eq!(default_of("float [4]").as_deref(), Some("[_]f32{0.0} ** 4"));
        assert_eq!(
            default_of("sg_color [2]").as_deref(),
            Some("[_]Color{.{}} ** 2")
        );
        assert_eq!(
            default_of("const void *[3]").as_deref(),
            Some("[_]?*const anyopaque{null} ** 3")
        );
        assert_eq!(
            default_of("sg_color [4][2]").as_deref(),
            Some("[_][2]Color{[_]Color{.{}} ** 2} ** 4")
        );
        assert_eq!(default_of("float [4][4]"), None);
    }

    #[test]
    fn field_and_extern_types() {
        let r = registry();
        assert_eq!(
            zig_field_type(&classify("const float *", &r)).as_deref(),
            Some("?[*]const f32")
        );
        assert_eq!(
            zig_extern_type(&classify("const float *", &r)).as_deref(),
            Some("[*c]const f32")
        );
        assert_eq!(
            zig_field_type(&classify("void (*)(const char *, void *)", &r)).as_deref(),
            Some("?*const fn ([*c]const u8, ?*anyopaque) callconv(.C) void")
        );
        assert_eq!(zig_extern_type(&classify("float [4]", &r)), None);
        assert_eq!(zig_extern_type(&Category::Void), None);
        assert_eq!(zig_result_type(&Category::Void).as_deref(), Some("void"));
    }

    #[test]
    fn unparsed_enum_value_leaves_numbering_to_zig() {
        let source = emit_json(
            r#"{"kind": "enum", "name": "m_bits", "items": [
                {"name": "M_BITS_A", "value": "(1<<3)"},
                {"name": "M_BITS_B"},
                {"name": "M_BITS_C", "value": "9"},
                {"name": "M_BITS_D"}
            ]}"#,
            &GenOptions::default(),
        );
        let lines: Vec<&str> = source.lines().collect();
        let start = lines
            .iter()
            .position(|l| *l == "pub const Bits = enum(i32) {")
            .unwrap();
        assert_eq!(
            lines[start + 1..start + 6],
            ["    A = (1<<3),", "    B,", "    C = 9,", "    D = 10,", "};"]
        );
    }

    #[test]
    fn short_enum_item_names() {
        let source = emit_json(
            r#"{"kind": "enum", "name": "m_e", "items": [{"name": "M_E"}, {"name": "_"}]},
               {"kind": "struct", "name": "m_s", "fields": [{"name": "e", "type": "m_e"}]}"#,
            &GenOptions::default(),
        );
        assert!(source.contains("    M_E = 0,\n"), "{source}");
        assert!(
            source.contains("    // FIXME: unsupported enum item name '_'\n"),
            "{source}"
        );
        assert!(source.contains("    e: E = .M_E,\n"), "{source}");
        assert!(!source.contains(" = .,"), "{source}");
    }

    #[test]
    fn void_field_is_unresolved() {
        let source = emit_json(
            r#"{"kind": "struct", "name": "m_s", "fields": [{"name": "v", "type": "void"}]}"#,
            &GenOptions::default(),
        );
        assert!(
            source.contains("    // FIXME: unresolved type for field 'v': 'void'\n"),
            "{source}"
        );
    }

    #[test]
    fn field_named_init_suppresses_init_function() {
        let options = GenOptions {
            init_helper: true,
            ..GenOptions::default()
        };
        let source = emit_json(
            r#"{"kind": "struct", "name": "m_s", "fields": [{"name": "init", "type": "int"}]},
               {"kind": "struct", "name": "m_t", "fields": [{"name": "x", "type": "int"}]}"#,
            &options,
        );
        assert!(source.contains("    init: i32 = 0,\n"), "{source}");
        assert!(
            source.contains(
                "    // FIXME: init function not generated, field 'init' uses the name\n"
            ),
            "{source}"
        );
        assert!(!source.contains("pub fn init(options: anytype) S {"), "{source}");
        assert!(source.contains("    pub fn init(options: anytype) T {\n"), "{source}");
    }
}
