use ays_common::error::{AgentError, Result};
use ays_common::types::MAX_NODE_NAME_LEN;

/// Sanitizes a child node name into the `[a-z0-9_-]` charset.
///
/// Every other character becomes a hyphen, then runs of hyphens collapse
/// to one, so `"a child**node"` becomes `"a-child-node"`. Validation runs on
/// the raw input before any replacement.
///
/// # Examples
///
/// ```
/// use ays_payload::node_name::normalize;
///
/// assert_eq!(normalize("a child**node").unwrap(), "a-child-node");
/// assert!(normalize("0name").is_err());
/// ```
pub fn normalize(name: &str) -> Result<String> {
    let Some(first) = name.chars().next() else {
        return Err(AgentError::EmptyName);
    };
    if !first.is_ascii_lowercase() {
        return Err(AgentError::InvalidFirstCharacter(first));
    }
    let len = name.chars().count();
    if len > MAX_NODE_NAME_LEN {
        return Err(AgentError::NameTooLong(len));
    }

    let replaced: String = name
        .chars()
        .map(|c| if is_allowed(c) { c } else { '-' })
        .collect();

    let mut normalized = String::with_capacity(replaced.len());
    for c in replaced.chars() {
        if c == '-' && normalized.ends_with('-') {
            continue;
        }
        normalized.push(c);
    }
    Ok(normalized)
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'
}
