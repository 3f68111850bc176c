//! Service and handler naming.
//!
//! The service name defaults to the component's own type name: the last
//! path segment of [`std::any::type_name`], without generic arguments.
//! Types without a usable name are rejected instead of silently renamed.

use heck::{ToLowerCamelCase, ToSnakeCase};

use crate::error::NameDefect;

const POINTER_PREFIXES: [&str; 4] = ["&mut ", "&", "*const ", "*mut "];
const ANONYMOUS_PREFIXES: [&str; 7] = ["(", "[", "fn(", "fn ", "dyn ", "impl ", "unsafe "];

/// Derive a service name from a full type name.
///
/// ```
/// use service_registry::service::naming::derive_service_name;
///
/// assert_eq!(derive_service_name("game::lobby::Lobby").unwrap(), "Lobby");
/// assert_eq!(derive_service_name("game::Room<game::Chat>").unwrap(), "Room");
/// assert!(derive_service_name("(u8, u8)").is_err());
/// ```
pub fn derive_service_name(type_name: &str) -> Result<String, NameDefect> {
    let mut name = type_name.trim();
    while let Some(rest) = POINTER_PREFIXES
        .iter()
        .find_map(move |prefix| name.strip_prefix(prefix))
    {
        name = rest.trim_start();
    }

    if name.is_empty()
        || name.contains("{{")
        || name.starts_with("extern ")
        || ANONYMOUS_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
    {
        return Err(NameDefect::Anonymous);
    }

    let path = name.split('<').next().unwrap_or(name);
    let last = path.rsplit("::").next().unwrap_or(path).trim();
    if last.is_empty() {
        return Err(NameDefect::Anonymous);
    }
    if !is_exported(last) {
        return Err(NameDefect::NotExported);
    }
    Ok(last.to_string())
}

/// Whether `name` starts with an uppercase ASCII letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// `Login` -> `login`.
pub fn lowercase(method: &str) -> String {
    method.to_lowercase()
}

/// `GetProfile` -> `get_profile`.
pub fn snake_case(method: &str) -> String {
    method.to_snake_case()
}

/// `GetProfile` -> `getProfile`.
pub fn lower_camel_case(method: &str) -> String {
    method.to_lower_camel_case()
}
