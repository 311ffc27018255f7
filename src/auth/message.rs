use super::AUTH_WINDOW_MINUTES;

/// The operation a signature authorizes. The tag is embedded in the signed
/// message, so a signature for one action cannot be replayed against another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    ClaimHashname,
    UpdateSeed,
    RequestAttachment,
    ResolveAttachment,
}

impl AuthAction {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthAction::ClaimHashname => "claim_hashname",
            AuthAction::UpdateSeed => "update_seed",
            AuthAction::RequestAttachment => "request_attachment",
            AuthAction::ResolveAttachment => "resolve_attachment",
        }
    }
}

impl std::fmt::Display for AuthAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fields bound into one signing exchange. Ephemeral: built to produce
/// the canonical message on both sides, never persisted.
#[derive(Debug, Clone, Copy)]
pub struct AuthChallenge<'a> {
    pub address: &'a str,
    pub action: AuthAction,
    pub nonce: &'a str,
    /// Unix milliseconds, as produced by wallet clients.
    pub timestamp: i64,
    /// Seed id or request id, depending on the action.
    pub subject_id: Option<i64>,
}

/// Builds the human-readable message the wallet signs.
///
/// This is the single source of truth for the signed payload, shared between
/// challenge issuance and verification. Field order and presence are part of
/// the format: any change here is a new message version and invalidates
/// signatures produced against the old layout.
#[must_use]
pub fn signing_message(challenge: &AuthChallenge<'_>) -> String {
    let mut lines = vec![
        "HashNexus Authentication".to_string(),
        String::new(),
        format!("Address: {}", challenge.address),
        format!("Action: {}", challenge.action),
        format!("Nonce: {}", challenge.nonce),
        format!("Timestamp: {}", challenge.timestamp),
    ];

    if let Some(subject_id) = challenge.subject_id {
        lines.push(format!("Subject ID: {subject_id}"));
    }

    lines.push(String::new());
    lines.push("By signing this message, you prove ownership of this wallet address.".to_string());
    lines.push(format!(
        "This signature is valid for {AUTH_WINDOW_MINUTES} minutes."
    ));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_layout_without_subject() {
        let message = signing_message(&AuthChallenge {
            address: "0x1111111111111111111111111111111111111111",
            action: AuthAction::ClaimHashname,
            nonce: "abc123",
            timestamp: 1700000000000,
            subject_id: None,
        });

        assert_eq!(
            message,
            "HashNexus Authentication\n\
             \n\
             Address: 0x1111111111111111111111111111111111111111\n\
             Action: claim_hashname\n\
             Nonce: abc123\n\
             Timestamp: 1700000000000\n\
             \n\
             By signing this message, you prove ownership of this wallet address.\n\
             This signature is valid for 10 minutes."
        );
    }

    #[test]
    fn test_message_includes_subject_line_when_present() {
        let with_subject = signing_message(&AuthChallenge {
            address: "0x1111111111111111111111111111111111111111",
            action: AuthAction::RequestAttachment,
            nonce: "abc123",
            timestamp: 1700000000000,
            subject_id: Some(42),
        });

        assert!(with_subject.contains("Subject ID: 42\n"));
        assert!(with_subject.contains("Action: request_attachment\n"));
    }

    #[test]
    fn test_message_is_deterministic() {
        let challenge = AuthChallenge {
            address: "0x2222222222222222222222222222222222222222",
            action: AuthAction::ResolveAttachment,
            nonce: "deadbeef",
            timestamp: 1,
            subject_id: Some(7),
        };

        assert_eq!(signing_message(&challenge), signing_message(&challenge));
    }
}
