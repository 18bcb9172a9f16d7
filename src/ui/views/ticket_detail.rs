use crate::shop::types::Ticket;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Read-only view of one ticket, as it was when opened from the board
pub struct TicketDetailView {
  ticket: Ticket,
}

impl TicketDetailView {
  pub fn new(ticket: Ticket) -> Self {
    Self { ticket }
  }

  fn field<'a>(label: &'static str, value: impl Into<Span<'a>>) -> Line<'a> {
    Line::from(vec![
      Span::styled(format!("{:<10}", label), Style::default().fg(Color::DarkGray)),
      value.into(),
    ])
  }

  fn lines(&self) -> Vec<Line<'_>> {
    let ticket = &self.ticket;
    let status = ticket.status;

    let mut lines = vec![
      Self::field("Title", ticket.title.as_str()),
      Self::field("Customer", ticket.customer.as_str()),
      Self::field(
        "Status",
        Span::styled(status.label(), Style::default().fg(status.color()).bold()),
      ),
      Self::field(
        "Device",
        format!("{} [{}]", ticket.device_label(), ticket.device_tag()),
      ),
      Self::field(
        "Quotation",
        if ticket.has_quotation { "on file" } else { "none" },
      ),
    ];

    if let Some(action) = ticket.quotation_action() {
      lines.push(Self::field(
        "Next",
        Span::styled(action.label(), Style::default().fg(Color::Magenta)),
      ));
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled(
      "Reported issue",
      Style::default().fg(Color::DarkGray),
    ));
    lines.push(Line::raw(
      ticket
        .reported_issue
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("No description"),
    ));
    lines
  }
}

impl View for TicketDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" {} ", self.ticket.id))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let paragraph = Paragraph::new(self.lines())
      .block(block)
      .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.ticket.id.clone()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(30),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::shop::fake::ticket;
  use crate::shop::types::Status;
  use crossterm::event::KeyModifiers;

  #[test]
  fn test_lines_show_quotation_hint() {
    let mut t = ticket("RT-9", Status::Diagnosing);
    t.reported_issue = Some("No power".to_string());
    let view = TicketDetailView::new(t);

    let text: Vec<String> = view.lines().iter().map(|l| l.to_string()).collect();
    assert!(text.iter().any(|l| l.contains("No power")));
    assert!(text.iter().any(|l| l.starts_with("Next")));
  }

  #[test]
  fn test_escape_pops() {
    let mut view = TicketDetailView::new(ticket("RT-9", Status::Received));
    assert!(matches!(
      view.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
      ViewAction::Pop
    ));
    assert_eq!(view.breadcrumb_label(), "RT-9");
  }
}
