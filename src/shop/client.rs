use crate::config::Config;
use crate::shop::api_types::{
  ApiErrorBody, ApiTicket, ApiUpdateStatusRequest, ApiUpdateStatusResponse,
};
use crate::shop::types::{Status, Ticket, UpdateOutcome};
use crate::shop::{ApiError, PhotoUpload, TicketApi};
use color_eyre::{eyre::eyre, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use tracing::{debug, warn};
use url::Url;

const TICKETS_BY_STATUS_PATH: &str = "repair-tickets/technician/status/";
const UPDATE_STATUS_PATH: &str = "repair-tickets/status";
const UPDATE_STATUS_WITH_PHOTOS_PATH: &str = "repair-tickets/status/photos";

/// Repair-shop REST client
#[derive(Clone)]
pub struct ShopClient {
  http: reqwest::Client,
  base: Url,
  token: String,
}

impl ShopClient {
  pub fn new(config: &Config) -> Result<Self> {
    let token = Config::get_api_token()?;
    let base = parse_base_url(&config.api.url)?;
    Self::connect(base, token)
  }

  fn connect(base: Url, token: String) -> Result<Self> {
    let http = reqwest::Client::builder()
      .user_agent(concat!("r9s/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, base, token })
  }

  /// Base URL requests are resolved against
  pub fn base_url(&self) -> &Url {
    &self.base
  }

  fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
    self
      .base
      .join(path)
      .map_err(|e| ApiError::Transport(format!("Invalid endpoint {}: {}", path, e)))
  }

  async fn read_outcome(response: Response) -> Result<UpdateOutcome, ApiError> {
    let response = ensure_success(response).await?;
    let body = response.text().await?;
    if body.trim().is_empty() {
      return Ok(UpdateOutcome {
        new_status: None,
        message: None,
      });
    }

    let parsed: ApiUpdateStatusResponse = serde_json::from_str(&body)
      .map_err(|e| ApiError::Transport(format!("Failed to parse update response: {}", e)))?;
    Ok(parsed.into())
  }
}

impl TicketApi for ShopClient {
  async fn tickets_by_status(&self, status: Status) -> Result<Vec<Ticket>, ApiError> {
    let url = self.endpoint(&format!("{}{}", TICKETS_BY_STATUS_PATH, status.as_api_str()))?;
    debug!(%url, "fetching tickets");

    let response = self.http.get(url).bearer_auth(&self.token).send().await?;
    if response.status() == StatusCode::NO_CONTENT {
      return Ok(Vec::new());
    }

    let response = ensure_success(response).await?;
    let body = response.text().await?;
    if body.trim().is_empty() {
      return Ok(Vec::new());
    }

    let records: Vec<ApiTicket> = serde_json::from_str(&body).map_err(|e| {
      ApiError::Transport(format!("Failed to parse {} tickets: {}", status.as_api_str(), e))
    })?;

    Ok(
      records
        .into_iter()
        .filter_map(|record| record.into_ticket(status))
        .collect(),
    )
  }

  async fn update_status(
    &self,
    request: ApiUpdateStatusRequest,
  ) -> Result<UpdateOutcome, ApiError> {
    let url = self.endpoint(UPDATE_STATUS_PATH)?;
    debug!(%url, ticket = %request.ticket_number, status = request.repair_status.as_api_str(), "updating status");

    let response = self
      .http
      .patch(url)
      .bearer_auth(&self.token)
      .json(&request)
      .send()
      .await?;

    Self::read_outcome(response).await
  }

  async fn update_status_with_photos(
    &self,
    ticket_number: String,
    status: Status,
    photos: Vec<PhotoUpload>,
  ) -> Result<UpdateOutcome, ApiError> {
    let url = self.endpoint(UPDATE_STATUS_WITH_PHOTOS_PATH)?;
    debug!(%url, ticket = %ticket_number, photos = photos.len(), "updating status with photos");

    let mut form = Form::new()
      .text("ticketNumber", ticket_number)
      .text("repairStatus", status.as_api_str());
    for photo in photos {
      let part = Part::bytes(photo.bytes)
        .file_name(photo.file_name)
        .mime_str(photo.mime)?;
      form = form.part("files", part);
    }

    let response = self
      .http
      .patch(url)
      .bearer_auth(&self.token)
      .multipart(form)
      .send()
      .await?;

    Self::read_outcome(response).await
  }
}

/// Turn a non-success response into `ApiError::Rejected`
async fn ensure_success(response: Response) -> Result<Response, ApiError> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }

  let text = response.text().await.unwrap_or_default();
  let error = rejection(status, &text);
  warn!(status = status.as_u16(), "backend rejected request: {}", error);
  Err(error)
}

/// Build a rejection from a status code and a body that may be JSON or plain text
fn rejection(status: StatusCode, body: &str) -> ApiError {
  let parsed = serde_json::from_str::<ApiErrorBody>(body).ok();
  let code = parsed.as_ref().and_then(|b| b.code.clone());
  let message = parsed
    .and_then(ApiErrorBody::into_message)
    .or_else(|| {
      let trimmed = body.trim();
      (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_string())
    })
    .unwrap_or_else(|| {
      status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
    });

  ApiError::Rejected {
    status: status.as_u16(),
    code,
    message,
  }
}

/// Parse the configured API URL, making sure relative joins keep its path
pub fn parse_base_url(raw: &str) -> Result<Url> {
  let mut url = Url::parse(raw.trim()).map_err(|e| eyre!("Invalid API url {}: {}", raw, e))?;
  if !matches!(url.scheme(), "http" | "https") {
    return Err(eyre!("API url must use http or https: {}", raw));
  }
  if !url.path().ends_with('/') {
    let path = format!("{}/", url.path());
    url.set_path(&path);
  }
  Ok(url)
}
