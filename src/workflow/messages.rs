//! User-facing messages for status changes.
//!
//! Backend rejections are mapped to friendlier text through a single rule
//! table: a structured error code wins when present, otherwise the raw
//! message is matched against known substrings.

use crate::shop::types::Status;
use crate::shop::ApiError;

/// One classification rule
#[derive(Debug)]
pub struct ErrorRule {
  /// Backend error codes this rule covers
  pub codes: &'static [&'static str],
  /// Lowercase substrings of the raw message this rule covers
  pub needles: &'static [&'static str],
  /// Only applies when moving to this status (`None` = any status)
  pub target: Option<Status>,
  pub message: &'static str,
}

const QUOTATION_CODES: &[&str] = &[
  "QUOTATION_REQUIRED",
  "QUOTATION_NOT_APPROVED",
  "APPROVAL_REQUIRED",
];
const QUOTATION_NEEDLES: &[&str] = &["quotation", "approved"];

/// Checked in order; first match wins
pub static ERROR_RULES: &[ErrorRule] = &[
  ErrorRule {
    codes: QUOTATION_CODES,
    needles: QUOTATION_NEEDLES,
    target: Some(Status::AwaitingParts),
    message: "Build a quotation for this ticket before moving it to Awaiting Parts.",
  },
  ErrorRule {
    codes: QUOTATION_CODES,
    needles: QUOTATION_NEEDLES,
    target: Some(Status::Repairing),
    message: "Repairing requires a customer-approved quotation or a technician override.",
  },
  ErrorRule {
    codes: QUOTATION_CODES,
    needles: QUOTATION_NEEDLES,
    target: None,
    message: "The customer has not approved the quotation for this ticket yet.",
  },
];

impl ErrorRule {
  fn matches(&self, code: Option<&str>, raw_lower: &str, target: Status) -> bool {
    if self.target.is_some_and(|t| t != target) {
      return false;
    }
    match code {
      Some(code) if self.codes.iter().any(|c| c.eq_ignore_ascii_case(code)) => true,
      _ => self.needles.iter().any(|n| raw_lower.contains(n)),
    }
  }
}

/// Message shown when moving a ticket to `target` failed
pub fn failure_message(error: &ApiError, target: Status) -> String {
  let raw = error.to_string();
  classify(error.code(), &raw, target)
    .map(str::to_string)
    .unwrap_or(raw)
}

/// Look up a friendlier message; `None` means show the raw one
pub fn classify(code: Option<&str>, raw: &str, target: Status) -> Option<&'static str> {
  let raw_lower = raw.to_lowercase();
  ERROR_RULES
    .iter()
    .find(|rule| rule.matches(code, &raw_lower, target))
    .map(|rule| rule.message)
}

/// Message shown after the backend accepted a change.
///
/// Awaiting parts always gets its own wording; otherwise a non-blank
/// backend message replaces the generic one.
pub fn success_message(ticket_id: &str, confirmed: Status, backend: Option<&str>) -> String {
  let backend = backend.map(str::trim).filter(|m| !m.is_empty());
  match (confirmed, backend) {
    (Status::AwaitingParts, _) => format!(
      "Ticket {} is now awaiting parts; the parts request has been recorded.",
      ticket_id
    ),
    (_, Some(message)) => message.to_string(),
    (other, None) => format!("Ticket {} moved to {}.", ticket_id, other.label()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rejected(message: &str, code: Option<&str>) -> ApiError {
    ApiError::Rejected {
      status: 400,
      code: code.map(str::to_string),
      message: message.to_string(),
    }
  }

  #[test]
  fn test_quotation_message_for_awaiting_parts() {
    let err = rejected("No quotation exists for ticket RT-1", None);
    assert_eq!(
      failure_message(&err, Status::AwaitingParts),
      "Build a quotation for this ticket before moving it to Awaiting Parts."
    );
  }

  #[test]
  fn test_approval_message_for_repairing() {
    let err = rejected("Quotation must be APPROVED first", None);
    assert_eq!(
      failure_message(&err, Status::Repairing),
      "Repairing requires a customer-approved quotation or a technician override."
    );
  }

  #[test]
  fn test_approval_message_for_other_targets() {
    let err = rejected("Quotation not approved", None);
    assert_eq!(
      failure_message(&err, Status::ReadyForPickup),
      "The customer has not approved the quotation for this ticket yet."
    );
  }

  #[test]
  fn test_structured_code_wins_over_wording() {
    let err = rejected("Transition blocked", Some("quotation_required"));
    assert_eq!(
      failure_message(&err, Status::AwaitingParts),
      "Build a quotation for this ticket before moving it to Awaiting Parts."
    );
  }

  #[test]
  fn test_unrelated_error_shown_raw() {
    let err = rejected("Ticket is locked by another technician", Some("LOCKED"));
    assert_eq!(
      failure_message(&err, Status::Repairing),
      "Ticket is locked by another technician"
    );

    let err = ApiError::Transport("connection refused".to_string());
    assert_eq!(
      failure_message(&err, Status::Completed),
      "Request failed: connection refused"
    );
  }

  #[test]
  fn test_success_messages() {
    assert!(success_message("RT-1", Status::AwaitingParts, None).contains("awaiting parts"));
    assert_eq!(
      success_message("RT-2", Status::Repairing, None),
      "Ticket RT-2 moved to Repairing."
    );
  }

  #[test]
  fn test_success_message_prefers_backend_text() {
    assert_eq!(
      success_message("RT-2", Status::Repairing, Some("Repair started by bench 3")),
      "Repair started by bench 3"
    );
    assert_eq!(
      success_message("RT-2", Status::Repairing, Some("   ")),
      "Ticket RT-2 moved to Repairing."
    );
    assert!(
      success_message("RT-1", Status::AwaitingParts, Some("ok")).contains("awaiting parts")
    );
  }
}
