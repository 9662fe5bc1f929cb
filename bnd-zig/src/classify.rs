//! Classification — registry pre-scan, type-string categories, and the
//! layout-compatibility pass.

use tracing::{debug, trace};

use crate::model::*;
use crate::naming;
use crate::parse;

/// Build the struct and enum registries from a full scan of the module.
///
/// Every name is registered before any type string is classified, so a
/// field may refer to a struct or enum declared further down the list.
pub fn build_type_registry(module: &Module) -> TypeRegistry {
    let mut registry = TypeRegistry::default();
    for decl in &module.decls {
        match decl {
            Decl::Struct(s) => registry.register_struct(&s.name),
            Decl::Enum(e) => {
                let items = e
                    .items
                    .iter()
                    .map(|item| naming::as_enum_item_name(&item.name))
                    .filter(|name| !name.is_empty())
                    .collect();
                registry.register_enum(&e.name, items);
            }
            Decl::Consts(_) | Decl::Func(_) => {}
        }
    }
    registry
}

/// Classify a raw C type string against the registry.
///
/// Never fails: strings outside the grammar, or naming unknown types, come
/// back as [`Category::Unrecognized`].
pub fn classify(ty: &str, registry: &TypeRegistry) -> Category {
    match parse::parse_type(ty) {
        Ok(ctype) => classify_ctype(&ctype, registry),
        Err(e) => {
            trace!(ty, err = %e, "type string outside grammar");
            Category::Unrecognized
        }
    }
}

/// Classify an already-parsed type.
pub fn classify_ctype(ctype: &CType, registry: &TypeRegistry) -> Category {
    match ctype {
        CType::Named { name, is_const } => {
            if *is_const {
                // `const T` by value only appears as an array element.
                return Category::Unrecognized;
            }
            classify_name(name, registry)
        }
        CType::Ptr { pointee } => classify_pointer(pointee, registry),
        CType::FnPtr {
            return_type,
            params,
        } => Category::FuncPtr {
            result: Box::new(classify_ctype(return_type, registry)),
            params: params
                .iter()
                .map(|p| classify_ctype(p, registry))
                .collect(),
        },
        CType::Array { element, dims } => {
            let element = Box::new(classify_element(element, registry));
            match dims.as_slice() {
                [len] => Category::Array1 { element, len: *len },
                [outer, inner] => Category::Array2 {
                    element,
                    outer: *outer,
                    inner: *inner,
                },
                _ => Category::Unrecognized,
            }
        }
    }
}

/// Primitive keywords win over struct names, which win over enum names.
fn classify_name(name: &str, registry: &TypeRegistry) -> Category {
    if let Some(prim) = Prim::from_c(name) {
        Category::Prim(prim)
    } else if registry.is_struct(name) {
        Category::Struct(name.to_string())
    } else if registry.is_enum(name) {
        Category::Enum(name.to_string())
    } else if name == "void" {
        Category::Void
    } else {
        Category::Unrecognized
    }
}

fn classify_pointer(pointee: &CType, registry: &TypeRegistry) -> Category {
    let CType::Named { name, is_const } = pointee else {
        return Category::Unrecognized;
    };
    match (name.as_str(), *is_const) {
        ("void", false) => Category::VoidPtr,
        ("void", true) => Category::ConstVoidPtr,
        ("char", true) => Category::StringPtr,
        // Typed pointers are always `const` in the API surface.
        (_, false) => Category::Unrecognized,
        (name, true) => {
            if let Some(prim) = Prim::from_c(name) {
                Category::PrimPtr(prim)
            } else if registry.is_struct(name) {
                Category::StructPtr(name.to_string())
            } else {
                Category::Unrecognized
            }
        }
    }
}

/// Array elements may carry a `const` qualifier, which has no effect on the
/// element's category.
fn classify_element(element: &CType, registry: &TypeRegistry) -> Category {
    match element {
        CType::Named { name, .. } => match classify_name(name, registry) {
            Category::Void => Category::Unrecognized,
            other => other,
        },
        CType::Ptr { pointee } => classify_pointer(pointee, registry),
        _ => Category::Unrecognized,
    }
}

// ---------------------------------------------------------------------------
// Layout compatibility
// ---------------------------------------------------------------------------

/// A struct is layout-compatible when every by-value struct field names a
/// struct already marked compatible in `registry`. Fields of any other
/// category never block compatibility.
pub fn is_layout_compatible(decl: &StructDecl, registry: &TypeRegistry) -> bool {
    decl.fields
        .iter()
        .all(|field| match classify(&field.ty, registry) {
            Category::Struct(name) => registry.is_compatible(&name),
            _ => true,
        })
}

/// Single forward pass over the module marking compatible structs.
///
/// Order-sensitive: a struct holding a struct declared later in the list is
/// never compatible, because the later struct has not been judged yet.
pub fn analyze_layouts(module: &Module, registry: &mut TypeRegistry) {
    for decl in &module.decls {
        let Decl::Struct(s) = decl else {
            continue;
        };
        let compatible = is_layout_compatible(s, registry);
        debug!(name = %s.name, compatible, "struct layout");
        if compatible {
            registry.mark_compatible(&s.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TypeRegistry {
        let mut r = TypeRegistry::default();
        r.register_struct("sg_color");
        r.register_enum("sg_action", vec!["Default".to_string(), "Clear".to_string()]);
        r
    }

    #[test]
    fn primitives() {
        let r = registry();
        for p in Prim::ALL {
            assert_eq!(classify(p.c_name(), &r), Category::Prim(p));
        }
    }

    #[test]
    fn named_types() {
        let r = registry();
        assert_eq!(classify("sg_color", &r), Category::Struct("sg_color".into()));
        assert_eq!(classify("sg_action", &r), Category::Enum("sg_action".into()));
        assert_eq!(classify("sg_unknown", &r), Category::Unrecognized);
        assert_eq!(classify("const int", &r), Category::Unrecognized);
    }

    #[test]
    fn pointers() {
        let r = registry();
        assert_eq!(classify("void *", &r), Category::VoidPtr);
        assert_eq!(classify("const void *", &r), Category::ConstVoidPtr);
        assert_eq!(classify("const char *", &r), Category::StringPtr);
        assert_eq!(classify("const float *", &r), Category::PrimPtr(Prim::F32));
        assert_eq!(
            classify("const sg_color *", &r),
            Category::StructPtr("sg_color".into())
        );
        assert_eq!(classify("sg_color *", &r), Category::Unrecognized);
        assert_eq!(classify("char *", &r), Category::Unrecognized);
        assert_eq!(classify("const sg_action *", &r), Category::Unrecognized);
    }

    #[test]
    fn arrays() {
        let r = registry();
        assert_eq!(
            classify("float [4]", &r),
            Category::Array1 {
                element: Box::new(Category::Prim(Prim::F32)),
                len: 4
            }
        );
        assert_eq!(
            classify("sg_color [4][2]", &r),
            Category::Array2 {
                element: Box::new(Category::Struct("sg_color".into())),
                outer: 4,
                inner: 2
            }
        );
        assert_eq!(
            classify("const void *[3]", &r),
            Category::Array1 {
                element: Box::new(Category::ConstVoidPtr),
                len: 3
            }
        );
    }

    #[test]
    fn function_pointers() {
        let r = registry();
        assert_eq!(
            classify("void (*)(const char *, void *)", &r),
            Category::FuncPtr {
                result: Box::new(Category::Void),
                params: vec![Category::StringPtr, Category::VoidPtr],
            }
        );
        assert!(classify("void (*)(wchar_t)", &r).is_unresolved());
    }

    #[test]
    fn bitfield_is_unrecognized() {
        assert_eq!(classify("uint32_t : 4", &registry()), Category::Unrecognized);
    }
}
