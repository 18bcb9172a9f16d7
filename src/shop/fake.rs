//! In-memory backend for tests.

use super::api_types::ApiUpdateStatusRequest;
use super::types::{Status, Ticket, UpdateOutcome};
use super::{ApiError, PhotoUpload, TicketApi};
use std::sync::{Arc, Mutex};

/// An update the fake received
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
  Json(ApiUpdateStatusRequest),
  Photos {
    ticket: String,
    status: Status,
    files: Vec<String>,
  },
}

/// Backend recording every update it receives
#[derive(Clone, Default)]
pub struct FakeApi {
  columns: Arc<Mutex<Vec<(Status, Result<Vec<Ticket>, ApiError>)>>>,
  calls: Arc<Mutex<Vec<Call>>>,
  reply: Arc<Mutex<Option<Result<UpdateOutcome, ApiError>>>>,
}

impl FakeApi {
  pub fn with_columns(columns: Vec<(Status, Result<Vec<Ticket>, ApiError>)>) -> Self {
    let api = Self::default();
    api.set_columns(columns);
    api
  }

  /// Serve `columns` to every later fetch
  pub fn set_columns(&self, columns: Vec<(Status, Result<Vec<Ticket>, ApiError>)>) {
    *self.columns.lock().unwrap() = columns;
  }

  /// Answer every later update with `reply`
  pub fn set_reply(&self, reply: Result<UpdateOutcome, ApiError>) {
    *self.reply.lock().unwrap() = Some(reply);
  }

  pub fn calls(&self) -> Vec<Call> {
    self.calls.lock().unwrap().clone()
  }

  fn reply(&self) -> Result<UpdateOutcome, ApiError> {
    self.reply.lock().unwrap().clone().unwrap_or(Ok(UpdateOutcome {
      new_status: None,
      message: None,
    }))
  }
}

impl TicketApi for FakeApi {
  async fn tickets_by_status(&self, status: Status) -> Result<Vec<Ticket>, ApiError> {
    self
      .columns
      .lock()
      .unwrap()
      .iter()
      .find(|(s, _)| *s == status)
      .map(|(_, r)| r.clone())
      .unwrap_or(Ok(Vec::new()))
  }

  async fn update_status(&self, request: ApiUpdateStatusRequest) -> Result<UpdateOutcome, ApiError> {
    self.calls.lock().unwrap().push(Call::Json(request));
    self.reply()
  }

  async fn update_status_with_photos(
    &self,
    ticket_number: String,
    status: Status,
    photos: Vec<PhotoUpload>,
  ) -> Result<UpdateOutcome, ApiError> {
    self.calls.lock().unwrap().push(Call::Photos {
      ticket: ticket_number,
      status,
      files: photos.into_iter().map(|p| p.file_name).collect(),
    });
    self.reply()
  }
}

/// Minimal ticket for tests
pub fn ticket(id: &str, status: Status) -> Ticket {
  Ticket {
    id: id.to_string(),
    title: "Broken hinge".to_string(),
    customer: "Grace Hopper".to_string(),
    status,
    device_type: "laptop".to_string(),
    has_quotation: false,
    reported_issue: None,
    device_brand: None,
    device_model: None,
  }
}
