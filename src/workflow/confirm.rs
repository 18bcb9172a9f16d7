//! Input gate for confirming a status change.

use crate::shop::types::Status;
use std::path::PathBuf;

/// Upper bound on photos attached to a ready-for-pickup update
pub const MAX_PHOTOS: usize = 3;

/// Extra input a transition needs before it can be confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Requirements {
  pub photos: bool,
  pub observation: bool,
}

impl Requirements {
  pub fn for_transition(from: Status, to: Status) -> Self {
    Self {
      photos: to == Status::ReadyForPickup,
      observation: to == Status::AwaitingParts
        && matches!(from, Status::Received | Status::Diagnosing),
    }
  }
}

/// Inline validation failure; never reaches the network
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
  #[error("Attach at least one photo of the finished repair")]
  MissingPhotos,
  #[error("You can attach a maximum of 3 photos")]
  TooManyPhotos,
  #[error("Describe the parts needed before moving to awaiting parts")]
  MissingObservation,
}

/// Input collected by the dialog so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmInput {
  pub photos: Vec<PathBuf>,
  pub observation: String,
}

/// Validated input handed to the commit step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Confirmation {
  pub photos: Vec<PathBuf>,
  /// Trimmed; `None` when blank
  pub observation: Option<String>,
}

impl ConfirmInput {
  /// Add a batch of photos. The whole batch is refused if it would push the
  /// selection past `MAX_PHOTOS`.
  pub fn add_photos(&mut self, batch: Vec<PathBuf>) -> Result<(), ValidationError> {
    if self.photos.len() + batch.len() > MAX_PHOTOS {
      return Err(ValidationError::TooManyPhotos);
    }
    self.photos.extend(batch);
    Ok(())
  }

  pub fn remove_last_photo(&mut self) -> Option<PathBuf> {
    self.photos.pop()
  }

  pub fn validate(&self, requirements: Requirements) -> Result<Confirmation, ValidationError> {
    if requirements.photos {
      if self.photos.is_empty() {
        return Err(ValidationError::MissingPhotos);
      }
      if self.photos.len() > MAX_PHOTOS {
        return Err(ValidationError::TooManyPhotos);
      }
    }

    let observation = self.observation.trim();
    if requirements.observation && observation.is_empty() {
      return Err(ValidationError::MissingObservation);
    }

    Ok(Confirmation {
      photos: if requirements.photos {
        self.photos.clone()
      } else {
        Vec::new()
      },
      observation: (!observation.is_empty()).then(|| observation.to_string()),
    })
  }
}

/// Split a typed photo selection ("a.jpg, b.jpg") into paths
pub fn parse_photo_selection(raw: &str) -> Vec<PathBuf> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(PathBuf::from)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn photos(n: usize) -> Vec<PathBuf> {
    (0..n).map(|i| PathBuf::from(format!("photo{}.jpg", i))).collect()
  }

  #[test]
  fn test_requirements() {
    let r = Requirements::for_transition(Status::Repairing, Status::ReadyForPickup);
    assert!(r.photos && !r.observation);

    let r = Requirements::for_transition(Status::Diagnosing, Status::AwaitingParts);
    assert!(!r.photos && r.observation);

    let r = Requirements::for_transition(Status::Received, Status::AwaitingParts);
    assert!(r.observation);

    // Only moves out of received/diagnosing need an observation
    let r = Requirements::for_transition(Status::Repairing, Status::AwaitingParts);
    assert_eq!(r, Requirements::default());

    let r = Requirements::for_transition(Status::Received, Status::Diagnosing);
    assert_eq!(r, Requirements::default());
  }

  #[test]
  fn test_ready_for_pickup_photo_bounds() {
    let req = Requirements::for_transition(Status::Repairing, Status::ReadyForPickup);

    let input = ConfirmInput::default();
    assert_eq!(input.validate(req), Err(ValidationError::MissingPhotos));

    let input = ConfirmInput {
      photos: photos(4),
      ..Default::default()
    };
    let err = input.validate(req).unwrap_err();
    assert_eq!(err, ValidationError::TooManyPhotos);
    assert!(err.to_string().contains("maximum of 3"));

    for n in 1..=3 {
      let input = ConfirmInput {
        photos: photos(n),
        ..Default::default()
      };
      assert_eq!(input.validate(req).unwrap().photos.len(), n);
    }
  }

  #[test]
  fn test_add_photos_rejects_whole_batch() {
    let mut input = ConfirmInput::default();
    input.add_photos(photos(2)).unwrap();
    assert_eq!(
      input.add_photos(photos(2)),
      Err(ValidationError::TooManyPhotos)
    );
    assert_eq!(input.photos.len(), 2);
    input.add_photos(photos(1)).unwrap();
    assert_eq!(input.photos.len(), 3);
  }

  #[test]
  fn test_observation_required_and_trimmed() {
    let req = Requirements::for_transition(Status::Diagnosing, Status::AwaitingParts);

    let input = ConfirmInput {
      observation: "   ".to_string(),
      ..Default::default()
    };
    assert_eq!(input.validate(req), Err(ValidationError::MissingObservation));

    let input = ConfirmInput {
      observation: "  Needs replacement screen \n".to_string(),
      ..Default::default()
    };
    assert_eq!(
      input.validate(req).unwrap().observation.as_deref(),
      Some("Needs replacement screen")
    );
  }

  #[test]
  fn test_optional_observation_omitted_when_blank() {
    let req = Requirements::for_transition(Status::Received, Status::Diagnosing);
    let confirmation = ConfirmInput::default().validate(req).unwrap();
    assert_eq!(confirmation, Confirmation::default());
  }

  #[test]
  fn test_parse_photo_selection() {
    assert_eq!(
      parse_photo_selection(" front.jpg, back.png ,,"),
      vec![PathBuf::from("front.jpg"), PathBuf::from("back.png")]
    );
    assert!(parse_photo_selection("  ").is_empty());
  }
}
