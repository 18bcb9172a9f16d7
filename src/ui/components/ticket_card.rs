use crate::shop::types::{Status, Ticket};
use crate::ui::renderfns::truncate;
use ratatui::prelude::*;
use ratatui::widgets::ListItem;

/// What a grabbed card carries while it is being moved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPayload {
  pub id: String,
  pub status: Status,
  /// Position within its column when it was picked up
  pub index: usize,
}

impl DragPayload {
  pub fn from_ticket(ticket: &Ticket, index: usize) -> Self {
    Self {
      id: ticket.id.clone(),
      status: ticket.status,
      index,
    }
  }
}

/// How a card should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
  Normal,
  /// Being moved by the user
  Grabbed,
  /// Its status change awaits confirmation or the backend
  Locked,
}

/// Two-line card: number, device tag and quotation hint; then title and
/// customer.
pub fn card_item(ticket: &Ticket, width: u16, state: CardState) -> ListItem<'static> {
  let width = width.saturating_sub(4) as usize;

  let id_style = match state {
    CardState::Normal => Style::default().fg(Color::Cyan),
    CardState::Grabbed => Style::default().fg(Color::Black).bg(Color::Yellow),
    CardState::Locked => Style::default().fg(Color::DarkGray).italic(),
  };

  let mut top = vec![
    Span::styled(ticket.id.clone(), id_style),
    Span::raw(" "),
    Span::styled(
      format!("[{}]", ticket.device_tag()),
      Style::default().fg(Color::DarkGray),
    ),
  ];
  if let Some(action) = ticket.quotation_action() {
    top.push(Span::raw(" "));
    top.push(Span::styled(
      action.label(),
      Style::default().fg(Color::Magenta),
    ));
  }
  if state == CardState::Locked {
    top.push(Span::styled(" ...", Style::default().fg(Color::Yellow)));
  }

  let detail = format!("{} - {}", ticket.title, ticket.customer);
  let bottom = Line::styled(
    truncate(&detail, width),
    Style::default().fg(if state == CardState::Locked {
      Color::DarkGray
    } else {
      Color::White
    }),
  );

  ListItem::new(vec![Line::from(top), bottom])
}
