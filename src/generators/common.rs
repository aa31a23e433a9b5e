//! Common utilities for document generation.

/// Escape a value for insertion into HTML text or attribute content.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Sanitize a string for use in filenames.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let mut result = String::new();
    let mut last_dash = false;

    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || ch == '-' || ch == '_') && !last_dash && !result.is_empty() {
            result.push('-');
            last_dash = true;
        }
    }

    let trimmed = result.trim_matches('-');
    if trimmed.is_empty() {
        return fallback.to_string();
    }

    trimmed.to_string()
}

/// Download name for a rendered declaration, e.g. `statutory-declaration-jane-tan.pdf`.
pub fn document_filename(purchaser_name: &str, extension: &str) -> String {
    match sanitize_filename(purchaser_name, "") {
        name if name.is_empty() => format!("statutory-declaration.{extension}"),
        name => format!("statutory-declaration-{name}.{extension}"),
    }
}
