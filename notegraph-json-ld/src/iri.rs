//! Compact-IRI and absolute-IRI helpers.

/// Split a compact IRI like `schema:name` into `(prefix, suffix)`.
///
/// Returns `None` for absolute IRIs (`http://...`, suffix starting with
/// `//`) and for strings without a colon.
pub fn parse_prefix(s: &str) -> Option<(&str, &str)> {
    let colon = s.find(':')?;
    let (prefix, suffix) = (&s[..colon], &s[colon + 1..]);

    if prefix.is_empty() || prefix.contains('/') || suffix.starts_with("//") {
        return None;
    }

    Some((prefix, suffix))
}

/// Whether the string contains a colon and therefore may already be an IRI
/// or compact IRI (as opposed to a vocab-relative term).
pub fn looks_like_iri(s: &str) -> bool {
    s.contains(':')
}

/// Whether the IRI carries an RFC 3986 scheme (`http`, `urn`, `did`, ...).
pub fn is_absolute(iri: &str) -> bool {
    match iri.find(':') {
        Some(pos) if pos > 0 => {
            let scheme = &iri[..pos];
            scheme.as_bytes()[0].is_ascii_alphabetic()
                && scheme
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
        }
        _ => false,
    }
}

/// Ensure a namespace IRI ends with `/` or `#` so terms concatenate cleanly.
pub fn with_trailing_separator(iri: &str) -> String {
    if iri.ends_with('/') || iri.ends_with('#') {
        iri.to_string()
    } else {
        format!("{}/", iri)
    }
}

/// Join a relative reference against a base IRI.
pub fn join(base: &str, relative: &str) -> String {
    if is_absolute(relative) {
        relative.to_string()
    } else if relative.starts_with('#') {
        format!("{}{}", base.trim_end_matches('/'), relative)
    } else {
        format!("{}{}", with_trailing_separator(base), relative)
    }
}
