//! Parsing and validation of admin action links.
//!
//! Notification emails embed two one-click URLs per order, of the form
//! `<site>/order-status/customer-confirm?orderId=<id>&userEmail=<base64>`
//! (and the `customer-reject` analog). The URL contract is frozen because it
//! lives in already-sent emails. Validation runs in a fixed order and the
//! first failing check wins, so operator-facing messages stay deterministic.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;
use uuid::Uuid;

use super::order::PaymentStatus;

/// Which of the two mailed links was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Confirm,
    Reject,
}

impl ActionKind {
    pub fn target_status(self) -> PaymentStatus {
        match self {
            ActionKind::Confirm => PaymentStatus::Completed,
            ActionKind::Reject => PaymentStatus::Rejected,
        }
    }
}

/// An order reference as carried by a link. Current orders use UUIDs; the
/// legacy `local_<timestamp>_<token>` form predates server-side persistence
/// and still passes link validation, but has no row behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderRef {
    Id(Uuid),
    Legacy(String),
}

impl fmt::Display for OrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderRef::Id(id) => write!(f, "{id}"),
            OrderRef::Legacy(s) => f.write_str(s),
        }
    }
}

/// A fully validated action link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLink {
    pub order: OrderRef,
    pub customer_email: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionLinkError {
    #[error("Invalid link: missing information.")]
    MissingInformation,
    #[error("Invalid link: unrecognized order id format.")]
    BadOrderFormat,
    #[error("Invalid link: malformed email payload.")]
    MalformedEmail,
    #[error("Invalid link: invalid email address.")]
    InvalidEmail,
}

/// Validate the two query parameters of an action link.
///
/// Checks run strictly in order: presence, order id syntax, base64 decoding,
/// email syntax. Callers must not touch the store before this returns `Ok`.
pub fn parse(
    order_id: Option<&str>,
    user_email: Option<&str>,
) -> Result<ActionLink, ActionLinkError> {
    let (Some(order_id), Some(user_email)) = (order_id, user_email) else {
        return Err(ActionLinkError::MissingInformation);
    };
    if order_id.is_empty() || user_email.is_empty() {
        return Err(ActionLinkError::MissingInformation);
    }

    let order = parse_order_ref(order_id).ok_or(ActionLinkError::BadOrderFormat)?;

    let decoded = BASE64
        .decode(user_email)
        .map_err(|_| ActionLinkError::MalformedEmail)?;
    let customer_email =
        String::from_utf8(decoded).map_err(|_| ActionLinkError::MalformedEmail)?;
    if !is_valid_email(&customer_email) {
        return Err(ActionLinkError::InvalidEmail);
    }

    Ok(ActionLink {
        order,
        customer_email,
    })
}

fn parse_order_ref(s: &str) -> Option<OrderRef> {
    // Only the hyphenated 8-4-4-4-12 form counts as a UUID here; the simple
    // and urn forms never appear in mailed links.
    if s.len() == 36 {
        if let Ok(id) = Uuid::parse_str(s) {
            return Some(OrderRef::Id(id));
        }
    }
    if is_legacy_order_id(s) {
        return Some(OrderRef::Legacy(s.to_string()));
    }
    None
}

/// `local_<timestamp>_<token>`, where the token is lowercase alphanumeric.
fn is_legacy_order_id(s: &str) -> bool {
    let Some(rest) = s.strip_prefix("local_") else {
        return false;
    };
    let Some((timestamp, token)) = rest.split_once('_') else {
        return false;
    };
    !timestamp.is_empty()
        && timestamp.bytes().all(|b| b.is_ascii_digit())
        && !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

/// Lightweight email syntax check: a local part, an `@`, and a domain with a
/// dot, none of them empty and none containing whitespace or a second `@`.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(s: &str) -> String {
        BASE64.encode(s)
    }

    #[test]
    fn valid_uuid_link_parses() {
        let id = Uuid::new_v4();
        let link = parse(
            Some(&id.to_string()),
            Some(&encode("customer@example.com")),
        )
        .expect("valid link");
        assert_eq!(link.order, OrderRef::Id(id));
        assert_eq!(link.customer_email, "customer@example.com");
    }

    #[test]
    fn legacy_order_ids_still_pass() {
        let link = parse(
            Some("local_1699999999999_k7f3a9"),
            Some(&encode("customer@example.com")),
        )
        .expect("valid legacy link");
        assert!(matches!(link.order, OrderRef::Legacy(_)));
    }

    #[test]
    fn missing_order_id_wins_over_malformed_email() {
        // First failing check decides the message, even when later parameters
        // are also broken.
        assert_eq!(
            parse(None, Some("not base64 at all!!")),
            Err(ActionLinkError::MissingInformation)
        );
    }

    #[test]
    fn empty_parameters_count_as_missing() {
        let id = Uuid::new_v4().to_string();
        assert_eq!(
            parse(Some(""), Some(&encode("a@b.co"))),
            Err(ActionLinkError::MissingInformation)
        );
        assert_eq!(
            parse(Some(&id), Some("")),
            Err(ActionLinkError::MissingInformation)
        );
    }

    #[test]
    fn bad_order_format_is_reported() {
        assert_eq!(
            parse(Some("order-42"), Some(&encode("a@b.co"))),
            Err(ActionLinkError::BadOrderFormat)
        );
        // Simple (non-hyphenated) UUID form is not accepted.
        let simple = Uuid::new_v4().simple().to_string();
        assert_eq!(
            parse(Some(&simple), Some(&encode("a@b.co"))),
            Err(ActionLinkError::BadOrderFormat)
        );
        // Legacy token must be lowercase alphanumeric.
        assert_eq!(
            parse(Some("local_123_ABC"), Some(&encode("a@b.co"))),
            Err(ActionLinkError::BadOrderFormat)
        );
    }

    #[test]
    fn undecodable_email_payload_is_malformed() {
        let id = Uuid::new_v4().to_string();
        assert_eq!(
            parse(Some(&id), Some("!!!not-base64!!!")),
            Err(ActionLinkError::MalformedEmail)
        );
        let not_utf8 = BASE64.encode([0xff, 0xfe, 0xfd]);
        assert_eq!(
            parse(Some(&id), Some(&not_utf8)),
            Err(ActionLinkError::MalformedEmail)
        );
    }

    #[test]
    fn decoded_non_email_is_invalid() {
        let id = Uuid::new_v4().to_string();
        assert_eq!(
            parse(Some(&id), Some(&encode("not an email"))),
            Err(ActionLinkError::InvalidEmail)
        );
    }

    #[test]
    fn email_syntax_cases() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last+tag@shop.example.com"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("two@@signs.com"));
        assert!(!is_valid_email("@missing-local.com"));
        assert!(!is_valid_email("no-dot@domain"));
        assert!(!is_valid_email("dot-at-end@domain."));
        assert!(!is_valid_email("spaces in@local.com"));
    }

    #[test]
    fn confirm_and_reject_map_to_terminal_states() {
        assert_eq!(ActionKind::Confirm.target_status(), PaymentStatus::Completed);
        assert_eq!(ActionKind::Reject.target_status(), PaymentStatus::Rejected);
    }
}
