use super::TicketDetailView;
use crate::query::{Mutation, Query};
use crate::shop::types::{Status, Ticket, UpdateOutcome};
use crate::shop::{ApiError, TicketApi};
use crate::ui::components::{
  CardState, ColumnFocus, ConfirmDialog, ConfirmDialogEvent, DragGesture, DragPayload, KeyResult,
  SearchEvent, SearchInput, StatusColumn,
};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::workflow::sync::{commit_change, load_board};
use crate::workflow::{Board, CommitRequest, Confirmation, DropError, Notification};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use tracing::{debug, info, warn};

/// A card picked up and being carried across columns
#[derive(Debug, Clone)]
struct Grab {
  payload: DragPayload,
  /// Column index the card would land in
  target: usize,
}

/// Technician Kanban board: one column per status, cards moved with a
/// keyboard grab/drop and every status change confirmed before it is sent.
pub struct KanbanBoardView {
  board: Board,
  columns: Vec<StatusColumn>,

  // Async work
  query: Query<Vec<Ticket>>,
  commit: Mutation<CommitRequest, UpdateOutcome, ApiError>,

  // UI state
  selected_column: usize,
  selected_row: usize,
  grab: Option<Grab>,
  notifications: Vec<Notification>,
  /// A reload in flight started before the current status change settled
  stale_reload: bool,

  // Components
  dialog: ConfirmDialog,
  search: SearchInput,
}

impl KanbanBoardView {
  pub fn new<A: TicketApi>(api: A) -> Self {
    let fetch_api = api.clone();
    let mut query = Query::new(move || {
      let api = fetch_api.clone();
      async move { Ok::<_, String>(load_board(&api).await) }
    });

    let commit_api = api;
    let commit = Mutation::new(move |request: CommitRequest| {
      let api = commit_api.clone();
      async move { commit_change(&api, request).await }
    });

    // Start fetching immediately
    query.fetch();

    Self {
      board: Board::new(),
      columns: StatusColumn::all(),
      query,
      commit,
      selected_column: 0,
      selected_row: 0,
      grab: None,
      notifications: Vec::new(),
      stale_reload: false,
      dialog: ConfirmDialog::new(),
      search: SearchInput::new(),
    }
  }

  /// Cards of `status` that pass the search filter, in display order
  fn visible(&self, status: Status) -> Vec<&Ticket> {
    self
      .board
      .column(status)
      .into_iter()
      .filter(|t| self.search.matches(t))
      .collect()
  }

  fn column_status(&self, index: usize) -> Status {
    self.columns[index].status
  }

  fn selected_ticket(&self) -> Option<&Ticket> {
    self
      .visible(self.column_status(self.selected_column))
      .get(self.selected_row)
      .copied()
  }

  fn clamp_selection(&mut self) {
    let len = self.visible(self.column_status(self.selected_column)).len();
    self.selected_row = self.selected_row.min(len.saturating_sub(1));
  }

  /// Put the cursor on `id` if it is visible
  fn select_ticket(&mut self, id: &str) {
    for (col, column) in self.columns.iter().enumerate() {
      if let Some(row) = self.visible(column.status).iter().position(|t| t.id == id) {
        self.selected_column = col;
        self.selected_row = row;
        return;
      }
    }
  }

  fn navigate_columns(&mut self, direction: i32) {
    let count = self.columns.len();
    self.selected_column = if direction > 0 {
      (self.selected_column + 1) % count
    } else {
      self.selected_column.checked_sub(1).unwrap_or(count - 1)
    };
    self.clamp_selection();
  }

  fn navigate_rows(&mut self, direction: i32) {
    let len = self.visible(self.column_status(self.selected_column)).len();
    if len == 0 {
      return;
    }
    self.selected_row = if direction > 0 {
      (self.selected_row + 1) % len
    } else {
      self.selected_row.checked_sub(1).unwrap_or(len - 1)
    };
  }

  /// Pick up the selected card
  fn grab_selected(&mut self) {
    let Some(ticket) = self.selected_ticket() else {
      return;
    };
    if self.board.is_locked(&ticket.id) || !self.board.is_idle() {
      self
        .notifications
        .push(Notification::error(DropError::Busy.to_string()));
      return;
    }
    let payload = DragPayload::from_ticket(ticket, self.selected_row);
    self.grab = Some(Grab {
      payload,
      target: self.selected_column,
    });
  }

  /// Move the grabbed card's drop target left or right
  fn move_target(&mut self, direction: i32) {
    let count = self.columns.len();
    if let Some(grab) = &mut self.grab {
      grab.target = if direction > 0 {
        (grab.target + 1).min(count - 1)
      } else {
        grab.target.saturating_sub(1)
      };
    }
  }

  /// Carry the grabbed card over its neighbour in its own column
  fn hover(&mut self, direction: i32) {
    let Some(grab) = &self.grab else {
      return;
    };
    let column = self.columns[grab.target];
    let cards = self.visible(column.status);
    let Some(index) = cards.iter().position(|t| t.id == grab.payload.id) else {
      return;
    };
    let neighbour = if direction > 0 {
      cards.get(index + 1)
    } else {
      index.checked_sub(1).and_then(|i| cards.get(i))
    };
    let Some(over) = neighbour else {
      return;
    };

    if let Some(gesture) = column.hover(&grab.payload, over) {
      let id = grab.payload.id.clone();
      self.apply_gesture(gesture);
      self.select_ticket(&id);
    }
  }

  /// Release the grabbed card over its target column
  fn release(&mut self) {
    let Some(grab) = self.grab.take() else {
      return;
    };
    let gesture = self.columns[grab.target].drop(&grab.payload);
    self.apply_gesture(gesture);
    self.select_ticket(&grab.payload.id);
  }

  fn apply_gesture(&mut self, gesture: DragGesture) {
    match gesture {
      DragGesture::Reorder { dragged, over } => {
        self.board.reorder(&dragged, &over);
      }
      DragGesture::Drop { id, status } => match self.board.drop_ticket(&id, status) {
        Ok(Some(change)) => {
          self.dialog.open(change);
          // Whatever is loading now predates this change
          if self.query.is_loading() {
            self.stale_reload = true;
          }
        }
        Ok(None) => {}
        Err(e @ DropError::Busy) => self.notifications.push(Notification::error(e.to_string())),
        Err(e @ DropError::UnknownTicket(_)) => warn!("drop ignored: {}", e),
      },
    }
  }

  /// Dialog confirmed: freeze the change and send it
  fn confirm(&mut self, confirmation: Confirmation) {
    let Some(request) = self.board.begin_commit(confirmation) else {
      self.dialog.close();
      return;
    };
    info!(ticket = %request.ticket_id, status = %request.status, "sending status change");

    if !self.commit.mutate(request) {
      // Only one change can be committing; settle this one as failed
      let notification = self.board.finish_commit(Err(ApiError::Transport(
        "another status change is still being saved".to_string(),
      )));
      self.dialog.close();
      self.notifications.extend(notification);
    }
  }

  fn handle_grab_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('h') | KeyCode::Left => self.move_target(-1),
      KeyCode::Char('l') | KeyCode::Right => self.move_target(1),
      KeyCode::Char('j') | KeyCode::Down => self.hover(1),
      KeyCode::Char('k') | KeyCode::Up => self.hover(-1),
      KeyCode::Enter | KeyCode::Char(' ') => self.release(),
      KeyCode::Esc => self.grab = None,
      _ => {}
    }
  }

  fn card_state(&self, ticket: &Ticket) -> CardState {
    if self.board.is_locked(&ticket.id) {
      CardState::Locked
    } else if self.grab.as_ref().is_some_and(|g| g.payload.id == ticket.id) {
      CardState::Grabbed
    } else {
      CardState::Normal
    }
  }

  fn render_columns(&self, frame: &mut Frame, area: Rect) {
    let constraints: Vec<Constraint> = self
      .columns
      .iter()
      .map(|_| Constraint::Ratio(1, self.columns.len() as u32))
      .collect();
    let col_areas = Layout::horizontal(constraints).split(area);

    for (idx, column) in self.columns.iter().enumerate() {
      let cards = self.visible(column.status);
      let focus = ColumnFocus {
        focused: idx == self.selected_column,
        drop_target: self.grab.as_ref().is_some_and(|g| g.target == idx),
        selected: (!cards.is_empty()).then_some(self.selected_row),
      };
      column.render(frame, col_areas[idx], &cards, focus, |t| self.card_state(t));
    }
  }
}

impl View for KanbanBoardView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    // The dialog is modal while open
    if self.dialog.is_open() {
      match self.dialog.handle_key(key) {
        KeyResult::Event(ConfirmDialogEvent::Confirmed(confirmation)) => self.confirm(confirmation),
        KeyResult::Event(ConfirmDialogEvent::Cancelled) => {
          if let Some(change) = self.board.cancel() {
            self.select_ticket(change.ticket_id());
          }
        }
        KeyResult::Handled | KeyResult::NotHandled => {}
      }
      return ViewAction::None;
    }

    if self.grab.is_some() {
      self.handle_grab_key(key);
      return ViewAction::None;
    }

    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(_)) => {
        self.selected_row = 0;
        self.clamp_selection();
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Submitted) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('h') | KeyCode::Left => self.navigate_columns(-1),
      KeyCode::Char('l') | KeyCode::Right => self.navigate_columns(1),
      KeyCode::Char('j') | KeyCode::Down => self.navigate_rows(1),
      KeyCode::Char('k') | KeyCode::Up => self.navigate_rows(-1),
      KeyCode::Char(' ') | KeyCode::Char('m') => self.grab_selected(),
      KeyCode::Char('r') => {
        let notification = self.refresh();
        self.notifications.extend(notification);
      }
      KeyCode::Enter => {
        if let Some(ticket) = self.selected_ticket() {
          return ViewAction::Push(Box::new(TicketDetailView::new(ticket.clone())));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.clamp_selection();

    if self.board.tickets().is_empty() {
      let content = if self.query.is_loading() {
        "Loading tickets..."
      } else {
        "No tickets assigned to you. Press 'r' to reload."
      };
      let block = Block::default()
        .title(" Technician board ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));
      frame.render_widget(
        Paragraph::new(content)
          .block(block)
          .style(Style::default().fg(Color::DarkGray)),
        area,
      );
    } else {
      self.render_columns(frame, area);
    }

    // Overlays
    self.search.render_overlay(frame, area);
    self.dialog.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    let label = if self.query.is_loading() {
      "Board (loading...)".to_string()
    } else {
      format!("Board ({} tickets)", self.board.tickets().len())
    };
    match self.search.query() {
      "" => label,
      query => format!("{} [/{}]", label, query),
    }
  }

  fn tick(&mut self) {
    // A reload never replaces tickets under a pending change
    if self.board.is_idle() && self.query.poll() {
      if std::mem::take(&mut self.stale_reload) {
        debug!("reload overlapped a status change, fetching again");
        self.query.refetch();
      } else if let Some(tickets) = self.query.take_data() {
        self.board.set_tickets(tickets);
        self.clamp_selection();
      } else if let Some(error) = self.query.error() {
        self
          .notifications
          .push(Notification::error(format!("Failed to load tickets: {}", error)));
      }
    }

    if let Some(result) = self.commit.poll() {
      let notification = self.board.finish_commit(result);
      self.dialog.close();
      self.notifications.extend(notification);
    }
  }

  fn is_capturing_input(&self) -> bool {
    self.dialog.is_open() || self.search.is_active() || self.grab.is_some()
  }

  fn refresh(&mut self) -> Option<Notification> {
    if !self.board.is_idle() {
      return Some(Notification::error(
        "Finish the pending status change before reloading",
      ));
    }
    info!("reloading board");
    self.query.refetch();
    Some(Notification::info("Reloading tickets..."))
  }

  fn take_notifications(&mut self) -> Vec<Notification> {
    std::mem::take(&mut self.notifications)
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    if self.dialog.is_submitting() {
      return Vec::new();
    }
    if self.dialog.is_open() {
      return vec![
        ShortcutInfo::new("enter", "confirm").with_priority(10),
        ShortcutInfo::new("esc", "cancel").with_priority(20),
      ];
    }
    if self.grab.is_some() {
      return vec![
        ShortcutInfo::new("h/l", "target").with_priority(10),
        ShortcutInfo::new("j/k", "reorder").with_priority(20),
        ShortcutInfo::new("enter", "drop").with_priority(30),
        ShortcutInfo::new("esc", "cancel").with_priority(40),
      ];
    }
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("/", "search").with_priority(20),
      ShortcutInfo::new("space", "grab").with_priority(30),
      ShortcutInfo::new("enter", "details").with_priority(40),
      ShortcutInfo::new("r", "reload").with_priority(50).when_active(),
      ShortcutInfo::new("q", "quit").with_priority(60).when_active(),
    ]
  }
}
