//! Flat and hierarchical variable names.
//!
//! Stylesheets name variables flat (`color-text-primary`), design tools group
//! them by path (`color/text/primary`). Every hyphen is a group boundary; the
//! segment after the last one is the leaf.

/// Separator of hierarchical names.
pub const PATH_SEPARATOR: char = '/';

/// `a-b-c` becomes `a/b/c`. Single-segment names pass through unchanged.
pub fn to_hierarchical_name(flat: &str) -> String {
    flat.replace('-', "/")
}

/// Exact inverse of [`to_hierarchical_name`].
pub fn to_flat_name(hierarchical: &str) -> String {
    hierarchical.replace(PATH_SEPARATOR, "-")
}

/// Group path of a flat name: the hierarchical name up to its last separator,
/// or empty for single-segment names.
pub fn group_of(flat: &str) -> String {
    let hierarchical = to_hierarchical_name(flat);
    match hierarchical.rfind(PATH_SEPARATOR) {
        Some(idx) => hierarchical[..idx].to_string(),
        None => String::new(),
    }
}

/// Leaf segment of a flat name.
pub fn leaf_of(flat: &str) -> &str {
    match flat.rfind('-') {
        Some(idx) => &flat[idx + 1..],
        None => flat,
    }
}
