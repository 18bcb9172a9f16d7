//! Async operations the board runs against the backend.

use super::board::CommitRequest;
use crate::shop::api_types::ApiUpdateStatusRequest;
use crate::shop::types::{Status, Ticket, UpdateOutcome};
use crate::shop::{ApiError, PhotoUpload, TicketApi};
use futures::future::join_all;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Fetch every status column concurrently and merge the results.
///
/// A column that fails to load is logged and treated as empty; the others
/// still load. Merging happens only after every request settled.
pub async fn load_board<A: TicketApi>(api: &A) -> Vec<Ticket> {
  let results = join_all(Status::ALL.iter().map(|status| {
    let api = api.clone();
    let status = *status;
    async move { (status, api.tickets_by_status(status).await) }
  }))
  .await;

  merge_columns(results)
}

/// Flatten per-status results into one list keyed by ticket number.
/// The first occurrence of a ticket number wins.
pub fn merge_columns(results: Vec<(Status, Result<Vec<Ticket>, ApiError>)>) -> Vec<Ticket> {
  let mut seen = HashSet::new();
  let mut merged = Vec::new();

  for (status, result) in results {
    match result {
      Ok(tickets) => {
        for ticket in tickets {
          if seen.insert(ticket.id.clone()) {
            merged.push(ticket);
          } else {
            warn!(ticket = %ticket.id, %status, "duplicate ticket ignored");
          }
        }
      }
      Err(e) => warn!(%status, "failed to load tickets, showing column empty: {}", e),
    }
  }

  info!(count = merged.len(), "board loaded");
  merged
}

/// Send a confirmed change: multipart with photos for ready-for-pickup,
/// plain JSON otherwise.
pub async fn commit_change<A: TicketApi>(
  api: &A,
  request: CommitRequest,
) -> Result<UpdateOutcome, ApiError> {
  if request.status == Status::ReadyForPickup {
    let mut photos = Vec::with_capacity(request.photos.len());
    for path in &request.photos {
      photos.push(read_photo(path).await?);
    }
    api
      .update_status_with_photos(request.ticket_id, request.status, photos)
      .await
  } else {
    api
      .update_status(ApiUpdateStatusRequest {
        ticket_number: request.ticket_id,
        repair_status: request.status,
        observations: request.observation,
      })
      .await
  }
}

async fn read_photo(path: &Path) -> Result<PhotoUpload, ApiError> {
  let bytes = tokio::fs::read(path).await.map_err(|e| ApiError::Photo {
    path: path.display().to_string(),
    reason: e.to_string(),
  })?;

  let file_name = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| "photo".to_string());

  Ok(PhotoUpload {
    mime: image_mime(&file_name),
    file_name,
    bytes,
  })
}

fn image_mime(file_name: &str) -> &'static str {
  let ext = file_name
    .rsplit_once('.')
    .map(|(_, ext)| ext.to_lowercase())
    .unwrap_or_default();
  match ext.as_str() {
    "jpg" | "jpeg" => "image/jpeg",
    "png" => "image/png",
    "gif" => "image/gif",
    "webp" => "image/webp",
    "heic" => "image/heic",
    _ => "application/octet-stream",
  }
}
