use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::shop::types::Status;
use crate::workflow::confirm::{parse_photo_selection, MAX_PHOTOS};
use crate::workflow::{ConfirmInput, Confirmation, PendingChange, Requirements};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

/// Events emitted by the confirmation dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmDialogEvent {
  /// Input passed validation; the dialog stays open showing progress
  Confirmed(Confirmation),
  Cancelled,
}

/// Modal dialog confirming a pending status change.
///
/// Ready-for-pickup moves show a photo field (paths, comma-separated; Enter
/// adds them, Enter on an empty field confirms). Every other move shows an
/// observation field, mandatory when moving into awaiting parts from
/// received or diagnosing.
#[derive(Debug, Clone, Default)]
pub struct ConfirmDialog {
  open: bool,
  ticket_id: String,
  from: Option<Status>,
  to: Option<Status>,
  requirements: Requirements,
  input: ConfirmInput,
  field: TextInput,
  error: Option<String>,
  submitting: bool,
}

impl ConfirmDialog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_open(&self) -> bool {
    self.open
  }

  pub fn is_submitting(&self) -> bool {
    self.submitting
  }

  #[cfg(test)]
  pub fn requirements(&self) -> Requirements {
    self.requirements
  }

  #[cfg(test)]
  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  #[cfg(test)]
  pub fn photos(&self) -> usize {
    self.input.photos.len()
  }

  /// Open for a fresh pending change, discarding any earlier input
  pub fn open(&mut self, change: &PendingChange) {
    *self = Self {
      open: true,
      ticket_id: change.ticket_id().to_string(),
      from: Some(change.prev_status()),
      to: Some(change.new_status()),
      requirements: change.requirements(),
      ..Self::default()
    };
  }

  /// Close and reset all input
  pub fn close(&mut self) {
    *self = Self::default();
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ConfirmDialogEvent> {
    if !self.open {
      return KeyResult::NotHandled;
    }
    // Confirm and cancel are disabled while the change is being saved
    if self.submitting {
      return KeyResult::Handled;
    }

    match key.code {
      KeyCode::Esc => {
        self.close();
        KeyResult::Event(ConfirmDialogEvent::Cancelled)
      }
      KeyCode::Enter => {
        if self.requirements.photos && !self.field.is_empty() {
          self.add_typed_photos();
          return KeyResult::Handled;
        }
        self.confirm()
      }
      KeyCode::Backspace if self.requirements.photos && self.field.is_empty() => {
        self.input.remove_last_photo();
        self.error = None;
        KeyResult::Handled
      }
      _ => {
        if self.field.handle_key(key) == InputResult::Consumed {
          self.error = None;
          if !self.requirements.photos {
            self.input.observation = self.field.value().to_string();
          }
        }
        KeyResult::Handled
      }
    }
  }

  fn add_typed_photos(&mut self) {
    let batch = parse_photo_selection(self.field.value());
    match self.input.add_photos(batch) {
      Ok(()) => {
        self.field.clear();
        self.error = None;
      }
      Err(e) => self.error = Some(e.to_string()),
    }
  }

  fn confirm(&mut self) -> KeyResult<ConfirmDialogEvent> {
    match self.input.validate(self.requirements) {
      Ok(confirmation) => {
        self.error = None;
        self.submitting = true;
        KeyResult::Event(ConfirmDialogEvent::Confirmed(confirmation))
      }
      Err(e) => {
        self.error = Some(e.to_string());
        KeyResult::Handled
      }
    }
  }

  /// Render the dialog overlay if open
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.open {
      return;
    }
    let (Some(from), Some(to)) = (self.from, self.to) else {
      return;
    };

    let width = 64.min(area.width.saturating_sub(4)).max(area.width.min(24));
    let height = 12.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" Move {} ", self.ticket_id));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let mut lines = vec![
      Line::from(vec![
        Span::styled(from.label(), Style::default().fg(from.color())),
        Span::styled("  ->  ", Style::default().fg(Color::DarkGray)),
        Span::styled(to.label(), Style::default().fg(to.color()).bold()),
      ]),
      Line::raw(""),
    ];

    if self.requirements.photos {
      lines.push(Line::styled(
        format!("Photos ({}/{}, at least 1):", self.input.photos.len(), MAX_PHOTOS),
        Style::default().fg(Color::DarkGray),
      ));
      for photo in &self.input.photos {
        lines.push(Line::raw(format!("  {}", photo.display())));
      }
      lines.push(self.field.line("+ "));
    } else {
      let label = if self.requirements.observation {
        "Observation (required):"
      } else {
        "Observation (optional):"
      };
      lines.push(Line::styled(label, Style::default().fg(Color::DarkGray)));
      lines.push(self.field.line("> "));
    }

    if let Some(error) = &self.error {
      lines.push(Line::raw(""));
      lines.push(Line::styled(error.clone(), Style::default().fg(Color::Red)));
    }

    lines.push(Line::raw(""));
    if self.submitting {
      lines.push(Line::styled(
        "Saving...",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::SLOW_BLINK),
      ));
    } else {
      let hint = if self.requirements.photos {
        "Enter add path / confirm  Bksp remove  Esc cancel"
      } else {
        "Enter confirm  Esc cancel"
      };
      lines.push(Line::styled(hint, Style::default().fg(Color::DarkGray)));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::shop::types::Ticket;
  use crate::workflow::Board;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_text(dialog: &mut ConfirmDialog, text: &str) {
    for c in text.chars() {
      dialog.handle_key(key(KeyCode::Char(c)));
    }
  }

  fn dialog_for(from: Status, to: Status) -> ConfirmDialog {
    let mut board = Board::with_tickets(vec![Ticket {
      id: "RT-1".to_string(),
      title: "Cracked screen".to_string(),
      customer: "Ada Lovelace".to_string(),
      status: from,
      device_type: "phone".to_string(),
      has_quotation: false,
      reported_issue: None,
      device_brand: None,
      device_model: None,
    }]);
    let change = board.drop_ticket("RT-1", to).unwrap().unwrap();
    let mut dialog = ConfirmDialog::new();
    dialog.open(change);
    dialog
  }

  #[test]
  fn test_observation_required_blocks_confirm() {
    let mut dialog = dialog_for(Status::Diagnosing, Status::AwaitingParts);
    assert_eq!(dialog.handle_key(key(KeyCode::Enter)), KeyResult::Handled);
    assert!(dialog.error().is_some());
    assert!(!dialog.is_submitting());

    type_text(&mut dialog, "  Needs replacement screen ");
    assert!(dialog.error().is_none());
    assert_eq!(
      dialog.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(ConfirmDialogEvent::Confirmed(Confirmation {
        photos: Vec::new(),
        observation: Some("Needs replacement screen".to_string()),
      }))
    );
    assert!(dialog.is_submitting());
  }

  #[test]
  fn test_submitting_disables_keys() {
    let mut dialog = dialog_for(Status::Received, Status::Diagnosing);
    assert!(matches!(
      dialog.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(ConfirmDialogEvent::Confirmed(_))
    ));
    assert_eq!(dialog.handle_key(key(KeyCode::Esc)), KeyResult::Handled);
    assert!(dialog.is_open());
  }

  #[test]
  fn test_photos_required_and_capped() {
    let mut dialog = dialog_for(Status::Repairing, Status::ReadyForPickup);

    // No photos yet: confirm refused
    dialog.handle_key(key(KeyCode::Enter));
    assert!(dialog.error().unwrap().contains("at least one photo"));

    type_text(&mut dialog, "a.jpg, b.jpg");
    dialog.handle_key(key(KeyCode::Enter));
    assert_eq!(dialog.photos(), 2);

    // Two more would make four: the batch is rejected
    type_text(&mut dialog, "c.jpg,d.jpg");
    dialog.handle_key(key(KeyCode::Enter));
    assert_eq!(dialog.photos(), 2);
    assert!(dialog.error().unwrap().contains("maximum of 3"));

    // Clear the field, then confirm with the two accepted photos
    for _ in 0.."c.jpg,d.jpg".len() {
      dialog.handle_key(key(KeyCode::Backspace));
    }
    match dialog.handle_key(key(KeyCode::Enter)) {
      KeyResult::Event(ConfirmDialogEvent::Confirmed(c)) => assert_eq!(c.photos.len(), 2),
      other => panic!("expected confirmation, got {:?}", other),
    }
  }

  #[test]
  fn test_backspace_on_empty_field_removes_photo() {
    let mut dialog = dialog_for(Status::Repairing, Status::ReadyForPickup);
    type_text(&mut dialog, "a.jpg");
    dialog.handle_key(key(KeyCode::Enter));
    assert_eq!(dialog.photos(), 1);
    dialog.handle_key(key(KeyCode::Backspace));
    assert_eq!(dialog.photos(), 0);
  }

  #[test]
  fn test_cancel_closes_and_resets() {
    let mut dialog = dialog_for(Status::Diagnosing, Status::AwaitingParts);
    type_text(&mut dialog, "draft");
    assert_eq!(
      dialog.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(ConfirmDialogEvent::Cancelled)
    );
    assert!(!dialog.is_open());
    assert_eq!(dialog.requirements(), Requirements::default());
    assert_eq!(dialog.handle_key(key(KeyCode::Enter)), KeyResult::NotHandled);
  }
}
