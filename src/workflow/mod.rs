//! Technician board workflow: ticket state, the status-change state machine,
//! confirmation gating, and the backend round-trips that settle a change.

pub mod board;
pub mod confirm;
pub mod messages;
pub mod optimistic;
pub mod sync;

pub use board::{Board, CommitRequest, DropError, Notification, NotificationLevel, PendingChange};
pub use confirm::{Confirmation, ConfirmInput, Requirements};
