//! Repair-shop backend: wire types, HTTP client, and the API seam the board
//! talks through.

pub mod api_types;
pub mod client;
#[cfg(test)]
pub mod fake;
pub mod types;

use std::future::Future;

use api_types::ApiUpdateStatusRequest;
use types::{Status, Ticket, UpdateOutcome};

/// Error returned by backend calls
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
  /// The backend answered with a non-success status
  #[error("{message}")]
  Rejected {
    status: u16,
    code: Option<String>,
    message: String,
  },
  /// The request never produced a usable response
  #[error("Request failed: {0}")]
  Transport(String),
  /// A photo selected for upload could not be read
  #[error("Could not read photo {path}: {reason}")]
  Photo { path: String, reason: String },
}

impl ApiError {
  /// Structured error code from the backend, if it sent one
  pub fn code(&self) -> Option<&str> {
    match self {
      ApiError::Rejected { code, .. } => code.as_deref(),
      _ => None,
    }
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(err: reqwest::Error) -> Self {
    ApiError::Transport(err.to_string())
  }
}

impl From<tokio::task::JoinError> for ApiError {
  fn from(err: tokio::task::JoinError) -> Self {
    ApiError::Transport(format!("Request task failed: {}", err))
  }
}

/// A photo ready to be sent in a multipart upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
  pub file_name: String,
  pub mime: &'static str,
  pub bytes: Vec<u8>,
}

/// Operations the technician board needs from the backend.
///
/// `ShopClient` is the real implementation; tests substitute fakes.
pub trait TicketApi: Clone + Send + Sync + 'static {
  /// Tickets currently in `status` assigned to the signed-in technician.
  /// An empty (204) response yields an empty list.
  fn tickets_by_status(
    &self,
    status: Status,
  ) -> impl Future<Output = Result<Vec<Ticket>, ApiError>> + Send;

  /// Plain status update, optionally carrying an observation
  fn update_status(
    &self,
    request: ApiUpdateStatusRequest,
  ) -> impl Future<Output = Result<UpdateOutcome, ApiError>> + Send;

  /// Status update with photo evidence attached
  fn update_status_with_photos(
    &self,
    ticket_number: String,
    status: Status,
    photos: Vec<PhotoUpload>,
  ) -> impl Future<Output = Result<UpdateOutcome, ApiError>> + Send;
}
