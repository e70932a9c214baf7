//! Slug generation
//!
//! Vietnamese names are folded to plain ASCII (`Chăm sóc da` becomes
//! `cham-soc-da`) so generated slugs always pass slug validation.

use super::ServiceError;

const FOLDS: [(&str, char); 7] = [
    ("àáảãạăằắẳẵặâầấẩẫậ", 'a'),
    ("èéẻẽẹêềếểễệ", 'e'),
    ("ìíỉĩị", 'i'),
    ("òóỏõọôồốổỗộơờớởỡợ", 'o'),
    ("ùúủũụưừứửữự", 'u'),
    ("ỳýỷỹỵ", 'y'),
    ("đ", 'd'),
];

fn fold(c: char) -> Option<char> {
    if c.is_ascii() {
        return Some(c);
    }
    // Combining marks left over from decomposed input
    if ('\u{0300}'..='\u{036f}').contains(&c) {
        return None;
    }
    FOLDS
        .iter()
        .find(|(set, _)| set.contains(c))
        .map(|(_, base)| *base)
        .or(Some('-'))
}

/// Generate a URL-friendly slug from a display name.
///
/// Returns an empty string when the name has no letters or digits.
pub fn generate_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.to_lowercase().chars().filter_map(fold) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Use the explicit slug when given, else derive one from `source`.
pub fn resolve_slug(explicit: Option<&str>, source: &str) -> Result<String, ServiceError> {
    if let Some(slug) = explicit {
        return Ok(slug.to_string());
    }
    let slug = generate_slug(source);
    if slug.is_empty() {
        return Err(ServiceError::invalid(
            "slug",
            "A slug cannot be derived from this name; provide one explicitly",
        ));
    }
    Ok(slug)
}
