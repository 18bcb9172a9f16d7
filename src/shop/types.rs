use ratatui::prelude::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Repair workflow stage, ordered by progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
  Received,
  Diagnosing,
  AwaitingParts,
  Repairing,
  ReadyForPickup,
  Completed,
}

impl Status {
  /// Every status in workflow order; one board column each
  pub const ALL: [Status; 6] = [
    Status::Received,
    Status::Diagnosing,
    Status::AwaitingParts,
    Status::Repairing,
    Status::ReadyForPickup,
    Status::Completed,
  ];

  /// Value used on the wire and in endpoint paths
  pub fn as_api_str(self) -> &'static str {
    match self {
      Status::Received => "RECEIVED",
      Status::Diagnosing => "DIAGNOSING",
      Status::AwaitingParts => "AWAITING_PARTS",
      Status::Repairing => "REPAIRING",
      Status::ReadyForPickup => "READY_FOR_PICKUP",
      Status::Completed => "COMPLETED",
    }
  }

  pub fn meta(self) -> &'static StatusMeta {
    // STATUS_TABLE is laid out in the same order as Status::ALL
    let meta = &STATUS_TABLE[self.index()];
    debug_assert_eq!(meta.status, self);
    meta
  }

  pub fn label(self) -> &'static str {
    self.meta().label
  }

  pub fn color(self) -> Color {
    self.meta().color
  }

  /// Column index of this status on the board
  pub fn index(self) -> usize {
    self as usize
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for Status {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
    Status::ALL
      .iter()
      .copied()
      .find(|status| status.as_api_str() == normalized)
      .ok_or_else(|| format!("Unknown repair status: {}", s))
  }
}

/// Quotation link offered on a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotationAction {
  Build,
  Edit,
  View,
}

impl QuotationAction {
  pub fn label(self) -> &'static str {
    match self {
      QuotationAction::Build => "build quote",
      QuotationAction::Edit => "edit quote",
      QuotationAction::View => "view quote",
    }
  }
}

/// Display attributes derived from a status
#[derive(Debug)]
pub struct StatusMeta {
  pub status: Status,
  pub label: &'static str,
  pub color: Color,
  /// Quotation action when the ticket has no quotation yet
  pub without_quotation: Option<QuotationAction>,
  /// Quotation action once a quotation exists
  pub with_quotation: Option<QuotationAction>,
}

pub static STATUS_TABLE: [StatusMeta; 6] = [
  StatusMeta {
    status: Status::Received,
    label: "Received",
    color: Color::White,
    without_quotation: None,
    with_quotation: None,
  },
  StatusMeta {
    status: Status::Diagnosing,
    label: "Diagnosing",
    color: Color::Cyan,
    without_quotation: Some(QuotationAction::Build),
    with_quotation: Some(QuotationAction::Edit),
  },
  StatusMeta {
    status: Status::AwaitingParts,
    label: "Awaiting Parts",
    color: Color::Magenta,
    without_quotation: Some(QuotationAction::Build),
    with_quotation: Some(QuotationAction::View),
  },
  StatusMeta {
    status: Status::Repairing,
    label: "Repairing",
    color: Color::Yellow,
    without_quotation: None,
    with_quotation: Some(QuotationAction::View),
  },
  StatusMeta {
    status: Status::ReadyForPickup,
    label: "Ready for Pickup",
    color: Color::Green,
    without_quotation: None,
    with_quotation: Some(QuotationAction::View),
  },
  StatusMeta {
    status: Status::Completed,
    label: "Completed",
    color: Color::DarkGray,
    without_quotation: None,
    with_quotation: Some(QuotationAction::View),
  },
];

/// Short tag shown on cards for a (lowercased) device type
pub fn device_tag(device_type: &str) -> &'static str {
  const DEVICE_TAGS: &[(&str, &str)] = &[
    ("phone", "PHN"),
    ("smartphone", "PHN"),
    ("mobile", "PHN"),
    ("tablet", "TAB"),
    ("laptop", "LAP"),
    ("notebook", "LAP"),
    ("desktop", "DSK"),
    ("pc", "DSK"),
    ("console", "CON"),
    ("watch", "WCH"),
    ("smartwatch", "WCH"),
  ];

  DEVICE_TAGS
    .iter()
    .find(|(kind, _)| *kind == device_type)
    .map(|(_, tag)| *tag)
    .unwrap_or("DEV")
}

/// A repair ticket as displayed on the board
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
  pub id: String,
  pub title: String,
  pub customer: String,
  pub status: Status,
  pub device_type: String,
  pub has_quotation: bool,
  pub reported_issue: Option<String>,
  pub device_brand: Option<String>,
  pub device_model: Option<String>,
}

impl Ticket {
  /// Quotation link for the ticket's current status
  pub fn quotation_action(&self) -> Option<QuotationAction> {
    let meta = self.status.meta();
    if self.has_quotation {
      meta.with_quotation
    } else {
      meta.without_quotation
    }
  }

  pub fn device_tag(&self) -> &'static str {
    device_tag(&self.device_type)
  }

  /// Brand and model joined for display
  pub fn device_label(&self) -> String {
    let parts: Vec<&str> = [self.device_brand.as_deref(), self.device_model.as_deref()]
      .into_iter()
      .flatten()
      .map(str::trim)
      .filter(|p| !p.is_empty())
      .collect();
    if parts.is_empty() {
      self.device_type.clone()
    } else {
      parts.join(" ")
    }
  }
}

/// Outcome of a status update accepted by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
  /// Status the backend actually recorded, if it reported one
  pub new_status: Option<Status>,
  pub message: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_table_matches_order() {
    for (idx, status) in Status::ALL.iter().enumerate() {
      assert_eq!(STATUS_TABLE[idx].status, *status);
      assert_eq!(status.index(), idx);
    }
  }

  #[test]
  fn test_status_from_str() {
    assert_eq!("AWAITING_PARTS".parse::<Status>(), Ok(Status::AwaitingParts));
    assert_eq!("ready for pickup".parse::<Status>(), Ok(Status::ReadyForPickup));
    assert!("SHIPPED".parse::<Status>().is_err());
  }

  #[test]
  fn test_status_serde_uses_wire_names() {
    let json = serde_json::to_string(&Status::ReadyForPickup).unwrap();
    assert_eq!(json, "\"READY_FOR_PICKUP\"");
    let status: Status = serde_json::from_str("\"DIAGNOSING\"").unwrap();
    assert_eq!(status, Status::Diagnosing);
  }

  #[test]
  fn test_device_tag_lookup() {
    assert_eq!(device_tag("laptop"), "LAP");
    assert_eq!(device_tag("smartphone"), "PHN");
    assert_eq!(device_tag("toaster"), "DEV");
  }

  fn ticket(status: Status, has_quotation: bool) -> Ticket {
    Ticket {
      id: "RT-1".to_string(),
      title: "Cracked screen".to_string(),
      customer: "Ada Lovelace".to_string(),
      status,
      device_type: "phone".to_string(),
      has_quotation,
      reported_issue: None,
      device_brand: Some("Acme".to_string()),
      device_model: None,
    }
  }

  #[test]
  fn test_quotation_action_by_status() {
    assert_eq!(ticket(Status::Received, false).quotation_action(), None);
    assert_eq!(
      ticket(Status::Diagnosing, false).quotation_action(),
      Some(QuotationAction::Build)
    );
    assert_eq!(
      ticket(Status::Diagnosing, true).quotation_action(),
      Some(QuotationAction::Edit)
    );
    assert_eq!(
      ticket(Status::Repairing, true).quotation_action(),
      Some(QuotationAction::View)
    );
  }

  #[test]
  fn test_device_label() {
    assert_eq!(ticket(Status::Received, false).device_label(), "Acme");
  }
}
