use super::ticket_card::{card_item, CardState, DragPayload};
use crate::shop::types::{Status, Ticket};
use crate::ui::renderfns::truncate;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

/// Gesture a column reports up to the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragGesture {
  /// Card released over this column
  Drop { id: String, status: Status },
  /// Card moved over another card of the same column
  Reorder { dragged: String, over: String },
}

/// How the column is highlighted
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnFocus {
  /// Cursor is in this column
  pub focused: bool,
  /// A grabbed card would land here
  pub drop_target: bool,
  /// Selected row within the column
  pub selected: Option<usize>,
}

/// Drop target bucketing the board's cards for one status
#[derive(Debug, Clone, Copy)]
pub struct StatusColumn {
  pub status: Status,
}

impl StatusColumn {
  pub fn new(status: Status) -> Self {
    Self { status }
  }

  pub fn all() -> Vec<StatusColumn> {
    Status::ALL.iter().copied().map(StatusColumn::new).collect()
  }

  /// A card was released over this column
  pub fn drop(&self, payload: &DragPayload) -> DragGesture {
    DragGesture::Drop {
      id: payload.id.clone(),
      status: self.status,
    }
  }

  /// A card hovers over `over`; only same-column hovers reorder
  pub fn hover(&self, payload: &DragPayload, over: &Ticket) -> Option<DragGesture> {
    (payload.status == self.status && over.status == self.status && payload.id != over.id).then(
      || DragGesture::Reorder {
        dragged: payload.id.clone(),
        over: over.id.clone(),
      },
    )
  }

  pub fn render(
    &self,
    frame: &mut Frame,
    area: Rect,
    cards: &[&Ticket],
    focus: ColumnFocus,
    card_state: impl Fn(&Ticket) -> CardState,
  ) {
    let border_color = if focus.drop_target {
      Color::Yellow
    } else if focus.focused {
      Color::Cyan
    } else {
      Color::Blue
    };

    let title = format!(
      " {} ({}) ",
      truncate(self.status.label(), area.width.saturating_sub(8) as usize),
      cards.len()
    );
    let block = Block::default()
      .title(Span::styled(title, Style::default().fg(self.status.color())))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(border_color));

    let items: Vec<ListItem> = cards
      .iter()
      .map(|ticket| card_item(ticket, area.width, card_state(ticket)))
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray))
      .highlight_symbol(">");

    if focus.focused {
      let mut state = ListState::default();
      state.select(focus.selected);
      frame.render_stateful_widget(list, area, &mut state);
    } else {
      frame.render_widget(list, area);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ticket(id: &str, status: Status) -> Ticket {
    Ticket {
      id: id.to_string(),
      title: "Sticky keys".to_string(),
      customer: "Edsger Dijkstra".to_string(),
      status,
      device_type: "laptop".to_string(),
      has_quotation: false,
      reported_issue: None,
      device_brand: None,
      device_model: None,
    }
  }

  #[test]
  fn test_drop_reports_column_status() {
    let payload = DragPayload::from_ticket(&ticket("RT-1", Status::Received), 0);
    assert_eq!(
      StatusColumn::new(Status::Diagnosing).drop(&payload),
      DragGesture::Drop {
        id: "RT-1".to_string(),
        status: Status::Diagnosing,
      }
    );
  }

  #[test]
  fn test_hover_reorders_only_within_column() {
    let column = StatusColumn::new(Status::Received);
    let payload = DragPayload::from_ticket(&ticket("RT-1", Status::Received), 0);

    assert_eq!(
      column.hover(&payload, &ticket("RT-2", Status::Received)),
      Some(DragGesture::Reorder {
        dragged: "RT-1".to_string(),
        over: "RT-2".to_string(),
      })
    );
    assert_eq!(column.hover(&payload, &ticket("RT-1", Status::Received)), None);

    let other = StatusColumn::new(Status::Repairing);
    assert_eq!(other.hover(&payload, &ticket("RT-3", Status::Repairing)), None);
  }

  #[test]
  fn test_all_columns_in_workflow_order() {
    let statuses: Vec<Status> = StatusColumn::all().iter().map(|c| c.status).collect();
    assert_eq!(statuses, Status::ALL.to_vec());
  }
}
