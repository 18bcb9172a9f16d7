//! Authoritative ticket state for the technician board and the status-change
//! state machine that guards it.
//!
//! ```text
//!   Idle --drop on other column--> Pending --confirm--> Committing
//!    ^                               |                     |
//!    +-----------cancel (rollback)---+                     |
//!    +-----backend ok (reconcile) / error (rollback)-------+
//! ```

use super::confirm::{Confirmation, Requirements};
use super::messages::{failure_message, success_message};
use super::optimistic::{Optimistic, OptimisticStore};
use crate::shop::types::{Status, Ticket, UpdateOutcome};
use crate::shop::ApiError;
use std::path::PathBuf;
use tracing::{info, warn};

/// The single in-flight, unconfirmed status transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange(Optimistic<String, Status>);

impl PendingChange {
  pub fn ticket_id(&self) -> &str {
    self.0.key()
  }

  pub fn prev_status(&self) -> Status {
    *self.0.previous()
  }

  pub fn new_status(&self) -> Status {
    *self.0.proposed()
  }

  pub fn requirements(&self) -> Requirements {
    Requirements::for_transition(self.prev_status(), self.new_status())
  }
}

/// Where the board is in the confirm-then-commit protocol
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransitionState {
  #[default]
  Idle,
  /// Moved locally, waiting for the user to confirm or cancel
  Pending(PendingChange),
  /// Confirmed, waiting for the backend
  Committing(PendingChange),
}

impl TransitionState {
  pub fn change(&self) -> Option<&PendingChange> {
    match self {
      TransitionState::Idle => None,
      TransitionState::Pending(change) | TransitionState::Committing(change) => Some(change),
    }
  }
}

/// Why a drop was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DropError {
  #[error("Finish the current status change first")]
  Busy,
  #[error("Ticket {0} is not on the board")]
  UnknownTicket(String),
}

/// What the commit step has to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
  pub ticket_id: String,
  pub status: Status,
  pub observation: Option<String>,
  pub photos: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
  Info,
  Success,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub level: NotificationLevel,
  pub message: String,
}

impl Notification {
  pub fn info(message: impl Into<String>) -> Self {
    Self {
      level: NotificationLevel::Info,
      message: message.into(),
    }
  }

  pub fn success(message: impl Into<String>) -> Self {
    Self {
      level: NotificationLevel::Success,
      message: message.into(),
    }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self {
      level: NotificationLevel::Error,
      message: message.into(),
    }
  }
}

impl OptimisticStore<String, Status> for Vec<Ticket> {
  fn read(&self, key: &String) -> Option<Status> {
    self.iter().find(|t| &t.id == key).map(|t| t.status)
  }

  fn write(&mut self, key: &String, value: Status) -> bool {
    match self.iter_mut().find(|t| &t.id == key) {
      Some(ticket) => {
        ticket.status = value;
        true
      }
      None => false,
    }
  }
}

/// Board state: tickets in display order plus the transition state machine
#[derive(Debug, Default)]
pub struct Board {
  tickets: Vec<Ticket>,
  state: TransitionState,
}

impl Board {
  pub fn new() -> Self {
    Self::default()
  }

  #[cfg(test)]
  pub fn with_tickets(tickets: Vec<Ticket>) -> Self {
    Self {
      tickets,
      state: TransitionState::Idle,
    }
  }

  /// Replace the whole ticket list (board reload)
  pub fn set_tickets(&mut self, tickets: Vec<Ticket>) {
    self.tickets = tickets;
  }

  pub fn tickets(&self) -> &[Ticket] {
    &self.tickets
  }

  pub fn ticket(&self, id: &str) -> Option<&Ticket> {
    self.tickets.iter().find(|t| t.id == id)
  }

  /// Tickets in `status`, in display order
  pub fn column(&self, status: Status) -> Vec<&Ticket> {
    self.tickets.iter().filter(|t| t.status == status).collect()
  }

  #[cfg(test)]
  pub fn state(&self) -> &TransitionState {
    &self.state
  }

  pub fn pending(&self) -> Option<&PendingChange> {
    self.state.change()
  }

  pub fn is_idle(&self) -> bool {
    self.state == TransitionState::Idle
  }

  pub fn is_committing(&self) -> bool {
    matches!(self.state, TransitionState::Committing(_))
  }

  /// Whether the ticket's card can currently be picked up
  pub fn is_locked(&self, id: &str) -> bool {
    self.pending().is_some_and(|c| c.ticket_id() == id)
  }

  /// Move `dragged` to the position of `over` within the same column.
  /// Display order only; returns false if nothing moved.
  pub fn reorder(&mut self, dragged: &str, over: &str) -> bool {
    if dragged == over || self.is_locked(dragged) {
      return false;
    }
    let Some(from) = self.tickets.iter().position(|t| t.id == dragged) else {
      return false;
    };
    let Some(to) = self.tickets.iter().position(|t| t.id == over) else {
      return false;
    };
    if self.tickets[from].status != self.tickets[to].status {
      return false;
    }

    let ticket = self.tickets.remove(from);
    self.tickets.insert(to, ticket);
    true
  }

  /// A card was dropped on the `target` column.
  ///
  /// Dropping on the card's own column is a no-op (`Ok(None)`). Otherwise the
  /// card moves immediately and a pending change awaits confirmation.
  pub fn drop_ticket(
    &mut self,
    id: &str,
    target: Status,
  ) -> Result<Option<&PendingChange>, DropError> {
    if !self.is_idle() {
      return Err(DropError::Busy);
    }
    let current = self
      .ticket(id)
      .map(|t| t.status)
      .ok_or_else(|| DropError::UnknownTicket(id.to_string()))?;
    if current == target {
      return Ok(None);
    }

    let Some(change) = Optimistic::apply(&mut self.tickets, id.to_string(), target) else {
      return Ok(None);
    };
    info!(ticket = id, from = %current, to = %target, "status change pending");
    self.state = TransitionState::Pending(PendingChange(change));
    Ok(self.pending())
  }

  /// User dismissed the dialog: put the card back. No-op unless pending.
  pub fn cancel(&mut self) -> Option<PendingChange> {
    if !matches!(self.state, TransitionState::Pending(_)) {
      return None;
    }
    let TransitionState::Pending(change) = std::mem::take(&mut self.state) else {
      return None;
    };
    info!(ticket = change.ticket_id(), "status change cancelled");
    change.0.clone().rollback(&mut self.tickets);
    Some(change)
  }

  /// User confirmed: freeze the pending change and describe the request to
  /// send. `None` unless a change is pending.
  pub fn begin_commit(&mut self, confirmation: Confirmation) -> Option<CommitRequest> {
    let TransitionState::Pending(change) = &self.state else {
      return None;
    };
    let change = change.clone();
    let request = CommitRequest {
      ticket_id: change.ticket_id().to_string(),
      status: change.new_status(),
      observation: confirmation.observation,
      photos: confirmation.photos,
    };
    self.state = TransitionState::Committing(change);
    Some(request)
  }

  /// Backend answered. Reconciles to the confirmed status or rolls back, and
  /// always returns the board to `Idle`.
  pub fn finish_commit(
    &mut self,
    result: Result<UpdateOutcome, ApiError>,
  ) -> Option<Notification> {
    if !self.is_committing() {
      return None;
    }
    let TransitionState::Committing(change) = std::mem::take(&mut self.state) else {
      return None;
    };
    let ticket_id = change.ticket_id().to_string();
    let requested = change.new_status();

    let notification = match result {
      Ok(outcome) => {
        let confirmed = change.0.reconcile(&mut self.tickets, outcome.new_status);
        if confirmed != requested {
          info!(ticket = %ticket_id, %requested, %confirmed, "backend settled on a different status");
        } else {
          info!(ticket = %ticket_id, status = %confirmed, "status change committed");
        }
        Notification::success(success_message(
          &ticket_id,
          confirmed,
          outcome.message.as_deref(),
        ))
      }
      Err(error) => {
        let restored = change.0.rollback(&mut self.tickets);
        warn!(ticket = %ticket_id, %requested, %restored, "status change rejected: {}", error);
        Notification::error(failure_message(&error, requested))
      }
    };

    Some(notification)
  }
}
