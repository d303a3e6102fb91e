// FILE: src/core/constants.rs

/// Schema type whose `content` holds an expression
pub const EXPRESSION_FIELD_TYPE: &str = "expressionField";

/// Names supplied by the render engine while a page is drawn
pub const RENDER_CONTEXT_NAMES: &[&str] = &["date", "dateTime", "currentPage", "totalPages"];

/// Global objects and functions that expressions may call freely
pub const GLOBAL_NAMES: &[&str] = &[
    // Value properties
    "undefined",
    "NaN",
    "Infinity",
    "globalThis",
    // Fundamental objects
    "Object",
    "Function",
    "Boolean",
    "Symbol",
    "Error",
    // Numbers and dates
    "Number",
    "BigInt",
    "Math",
    "Date",
    "Intl",
    // Text
    "String",
    "RegExp",
    // Collections
    "Array",
    "Map",
    "Set",
    "WeakMap",
    "WeakSet",
    // Structured data
    "JSON",
    "Promise",
    "Reflect",
    // Function properties
    "isNaN",
    "isFinite",
    "parseFloat",
    "parseInt",
    "decodeURI",
    "decodeURIComponent",
    "encodeURI",
    "encodeURIComponent",
];

/// Shape and decoration schema types; these never supply input values
pub const STATIC_SCHEMA_TYPES: &[&str] = &["line", "rectangle", "ellipse"];

/// Nesting limit for the expression parser. The expression itself is the first
/// level; every parenthesized group, array or object literal, call argument,
/// conditional branch, arrow body, template substitution, prefix operator and
/// `**` operand opens another one. Flat chains such as `a + b + c` or `a.b.c`
/// do not nest.
pub const MAX_EXPRESSION_DEPTH: usize = 128;

/// Returns true when `name` is a built-in that is never a required input
pub fn is_builtin(name: &str) -> bool {
    RENDER_CONTEXT_NAMES.contains(&name) || GLOBAL_NAMES.contains(&name)
}

/// Returns true when `schema_type` is a shape or decoration type
pub fn is_static_type(schema_type: &str) -> bool {
    STATIC_SCHEMA_TYPES.contains(&schema_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        assert!(is_builtin("Math"));
        assert!(is_builtin("currentPage"));
        assert!(is_builtin("parseInt"));
        assert!(!is_builtin("math"));
        assert!(!is_builtin("price"));
    }

    #[test]
    fn test_static_types() {
        assert!(is_static_type("rectangle"));
        assert!(!is_static_type("text"));
        assert!(!is_static_type(EXPRESSION_FIELD_TYPE));
    }
}
