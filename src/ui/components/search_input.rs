use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::shop::types::Ticket;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by search input that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
  /// Query changed (every keystroke; empty string on cancel)
  Changed(String),
  /// Overlay closed, filter stays applied
  Submitted,
}

/// `/` search overlay that filters the board's cards
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
  input: TextInput,
  active: bool,
}

impl SearchInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Current filter text (also after the overlay closed)
  pub fn query(&self) -> &str {
    self.input.value()
  }

  pub fn activate(&mut self) {
    self.active = true;
    self.input.clear();
  }

  /// Whether `ticket` passes the current filter
  pub fn matches(&self, ticket: &Ticket) -> bool {
    ticket_matches(ticket, self.query())
  }

  /// Handle a key event. Call this regardless of active state - it handles
  /// activation too.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<SearchEvent> {
    if !self.active {
      if key.code == KeyCode::Char('/') {
        self.activate();
        return KeyResult::Event(SearchEvent::Changed(String::new()));
      }
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(_) => {
        self.active = false;
        KeyResult::Event(SearchEvent::Submitted)
      }
      InputResult::Cancelled => {
        self.active = false;
        self.input.clear();
        KeyResult::Event(SearchEvent::Changed(String::new()))
      }
      InputResult::Consumed => {
        KeyResult::Event(SearchEvent::Changed(self.input.value().to_string()))
      }
      // Swallow everything else while the overlay is open
      InputResult::NotHandled => KeyResult::Handled,
    }
  }

  /// Render the search overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (area.width * 60 / 100).clamp(30.min(area.width), 60.min(area.width));
    let overlay_area = Rect::new(area.x + 1, area.y + 1, width, 3.min(area.height));

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Filter tickets ");

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    frame.render_widget(Paragraph::new(self.input.line("/")), inner);
  }
}

/// Case-insensitive match on ticket number, title, or customer
pub fn ticket_matches(ticket: &Ticket, query: &str) -> bool {
  let query = query.trim().to_lowercase();
  if query.is_empty() {
    return true;
  }
  [&ticket.id, &ticket.title, &ticket.customer]
    .iter()
    .any(|field| field.to_lowercase().contains(&query))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::shop::types::Status;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn ticket() -> Ticket {
    Ticket {
      id: "RT-42".to_string(),
      title: "Water damage".to_string(),
      customer: "Grace Hopper".to_string(),
      status: Status::Received,
      device_type: "phone".to_string(),
      has_quotation: false,
      reported_issue: None,
      device_brand: None,
      device_model: None,
    }
  }

  #[test]
  fn test_ticket_matches_fields() {
    let t = ticket();
    assert!(ticket_matches(&t, ""));
    assert!(ticket_matches(&t, "rt-42"));
    assert!(ticket_matches(&t, "WATER"));
    assert!(ticket_matches(&t, "hopper"));
    assert!(!ticket_matches(&t, "laptop"));
  }

  #[test]
  fn test_activation_and_filtering() {
    let mut search = SearchInput::new();
    assert_eq!(search.handle_key(key(KeyCode::Char('x'))), KeyResult::NotHandled);

    search.handle_key(key(KeyCode::Char('/')));
    assert!(search.is_active());
    assert_eq!(
      search.handle_key(key(KeyCode::Char('w'))),
      KeyResult::Event(SearchEvent::Changed("w".to_string()))
    );
    assert_eq!(
      search.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(SearchEvent::Submitted)
    );
    assert!(!search.is_active());
    assert_eq!(search.query(), "w");
    assert!(search.matches(&ticket()));
  }

  #[test]
  fn test_cancel_clears_filter() {
    let mut search = SearchInput::new();
    search.handle_key(key(KeyCode::Char('/')));
    search.handle_key(key(KeyCode::Char('z')));
    search.handle_key(key(KeyCode::Esc));
    assert_eq!(search.query(), "");
    assert!(search.matches(&ticket()));
  }
}
