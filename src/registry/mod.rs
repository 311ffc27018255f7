mod attachments;
mod claims;

pub use attachments::{AttachmentService, RequestOutcome, ResolveAction};
pub use claims::{ClaimOutcome, ClaimService};

use crate::error::{Error, Result};

const MAX_HANDLE_LEN: usize = 64;

/// Canonicalizes a handle: trimmed, `#`-prefixed, lowercase. The canonical
/// form is what the store indexes, so every lookup goes through here.
pub fn normalize_handle(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::BadRequest("Handle is required".to_string()));
    }

    let mut handle = if trimmed.starts_with('#') {
        trimmed.to_string()
    } else {
        format!("#{trimmed}")
    };
    handle.make_ascii_lowercase();

    let name = &handle[1..];
    if name.is_empty() {
        return Err(Error::BadRequest("Handle is required".to_string()));
    }
    if name.len() > MAX_HANDLE_LEN {
        return Err(Error::BadRequest(format!(
            "Handle cannot exceed {MAX_HANDLE_LEN} characters"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::BadRequest(
            "Handle can only contain alphanumeric characters, hyphens, and underscores".to_string(),
        ));
    }

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_handle_prefixes_and_lowercases() {
        assert_eq!(normalize_handle("Alpha").unwrap(), "#alpha");
        assert_eq!(normalize_handle("#Alpha").unwrap(), "#alpha");
        assert_eq!(normalize_handle("  beta-2  ").unwrap(), "#beta-2");
    }

    #[test]
    fn test_normalize_handle_rejects_invalid() {
        assert!(normalize_handle("").is_err());
        assert!(normalize_handle("#").is_err());
        assert!(normalize_handle("has space").is_err());
        assert!(normalize_handle("sla/sh").is_err());
        assert!(normalize_handle(&"x".repeat(65)).is_err());
    }
}
