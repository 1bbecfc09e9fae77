//! Object names for uploaded models

use std::time::{SystemTime, UNIX_EPOCH};

/// `<prefix>/<name>.<ext>`, or `<prefix>/<unix_millis>_scene.<ext>` when no
/// name is given. A name that already carries the extension keeps it.
pub fn object_name(prefix: &str, name: Option<&str>, extension: &str, unix_millis: u128) -> String {
    let folder = prefix.trim_matches('/');
    let stem = match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name
            .strip_suffix(&format!(".{}", extension))
            .unwrap_or(name)
            .replace('/', "_"),
        None => format!("{}_scene", unix_millis),
    };
    format!("{}/{}.{}", folder, stem, extension)
}

pub fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
