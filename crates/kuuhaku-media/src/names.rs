//! File name cleaning and content types.

const FORBIDDEN: &[char] = &[
    '?', '[', ']', '/', '\\', '=', '<', '>', ':', ';', ',', '\'', '"', '&', '$', '#', '*', '(',
    ')', '|', '~', '`', '!', '{', '}', '%', '+', '\u{2019}', '\u{00ab}', '\u{00bb}', '\u{201d}',
    '\u{201c}',
];

/// Make a string safe to use as a single file name.
///
/// Path separators and shell/URL special characters are removed, whitespace
/// runs become `-`, and leading/trailing dots, dashes and underscores are
/// stripped. Non-ASCII letters are kept. Returns `None` when nothing is left.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_control() || FORBIDDEN.contains(&c) {
            continue;
        }
        if c.is_whitespace() || c == '-' {
            pending_dash = true;
            continue;
        }
        if pending_dash && !out.is_empty() {
            out.push('-');
        }
        pending_dash = false;
        out.push(c);
    }
    let trimmed = out.trim_matches(|c| c == '.' || c == '-' || c == '_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Lowercased extension of a file name.
pub fn extension(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Content type for an image file name.
pub fn mime_for(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("avif") => "image/avif",
        Some("svg") => "image/svg+xml",
        _ => "image/webp",
    }
}

/// File extension for an image content type.
pub fn extension_for_mime(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/avif" => Some("avif"),
        _ => None,
    }
}

/// Ensure `name` carries an extension, appending `ext` if it has none.
pub fn with_default_extension(name: &str, ext: &str) -> String {
    if extension(name).is_some() {
        name.to_string()
    } else {
        format!("{}.{}", name, ext)
    }
}
