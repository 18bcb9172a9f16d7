//! Serde types matching the repair-shop backend's JSON payloads.
//!
//! These stay separate from the domain types so the wire format (camelCase,
//! optional fields, free-text statuses) never leaks into the board logic.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::types::{Status, Ticket, UpdateOutcome};

/// Placeholder when a ticket has no customer name
pub const NO_CUSTOMER: &str = "\u{2014}";

/// Title used when a ticket carries no issue or device description
pub const GENERIC_TITLE: &str = "Repair ticket";

// ============================================================================
// Tickets by status endpoint
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTicket {
  pub ticket_number: String,
  pub reported_issue: Option<String>,
  pub device_model: Option<String>,
  pub device_brand: Option<String>,
  pub customer_first_name: Option<String>,
  pub customer_last_name: Option<String>,
  pub repair_status: Option<String>,
  pub device_type: Option<String>,
  #[serde(default)]
  pub has_quotation: bool,
}

// ============================================================================
// Status update endpoints
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUpdateStatusRequest {
  pub ticket_number: String,
  pub repair_status: Status,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub observations: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUpdateStatusResponse {
  pub new_status: Option<String>,
  pub message: Option<String>,
}

/// Error body returned by the backend when it rejects a request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
  pub message: Option<String>,
  pub error: Option<String>,
  pub code: Option<String>,
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl ApiTicket {
  /// Convert into a board ticket.
  ///
  /// `fetched_as` is the status the ticket was requested under; it is used
  /// when the record omits its own status. Records with a status we do not
  /// know are dropped.
  pub fn into_ticket(self, fetched_as: Status) -> Option<Ticket> {
    let status = match self.repair_status.as_deref() {
      None => fetched_as,
      Some(raw) => match raw.parse::<Status>() {
        Ok(status) => status,
        Err(_) => {
          warn!(ticket = %self.ticket_number, status = raw, "skipping ticket with unknown status");
          return None;
        }
      },
    };

    let title = first_non_blank(&[
      self.reported_issue.as_deref(),
      self.device_model.as_deref(),
      self.device_brand.as_deref(),
    ])
    .unwrap_or(GENERIC_TITLE)
    .to_string();

    let customer = customer_name(
      self.customer_first_name.as_deref(),
      self.customer_last_name.as_deref(),
    );

    Some(Ticket {
      id: self.ticket_number,
      title,
      customer,
      status,
      device_type: self
        .device_type
        .map(|d| d.trim().to_lowercase())
        .unwrap_or_default(),
      has_quotation: self.has_quotation,
      reported_issue: self.reported_issue,
      device_brand: self.device_brand,
      device_model: self.device_model,
    })
  }
}

impl From<ApiUpdateStatusResponse> for UpdateOutcome {
  fn from(resp: ApiUpdateStatusResponse) -> Self {
    let new_status = resp
      .new_status
      .as_deref()
      .and_then(|raw| match raw.parse::<Status>() {
        Ok(status) => Some(status),
        Err(e) => {
          warn!("ignoring confirmed status from backend: {}", e);
          None
        }
      });

    UpdateOutcome {
      new_status,
      message: resp.message,
    }
  }
}

impl ApiErrorBody {
  /// Best human-readable message in the body
  pub fn into_message(self) -> Option<String> {
    self.message.or(self.error).filter(|m| !m.trim().is_empty())
  }
}

// ============================================================================
// Helpers
// ============================================================================

fn first_non_blank<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
  candidates
    .iter()
    .flatten()
    .map(|s| s.trim())
    .find(|s| !s.is_empty())
}

fn customer_name(first: Option<&str>, last: Option<&str>) -> String {
  let parts: Vec<&str> = [first, last]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|p| !p.is_empty())
    .collect();

  if parts.is_empty() {
    NO_CUSTOMER.to_string()
  } else {
    parts.join(" ")
  }
}
