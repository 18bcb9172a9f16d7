use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::shop::client::ShopClient;
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult, Toasts};
use crate::ui::renderfns::header::extract_domain;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::KanbanBoardView;
use crate::workflow::Notification;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::info;

const TICK_RATE: Duration = Duration::from_millis(250);

/// Main application state
pub struct App {
  /// Navigation stack - the board is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// `:` command palette
  command: CommandInput,

  /// Notification shown in the status line
  toasts: Toasts,

  /// Shop name shown in the header
  title: String,

  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let client = ShopClient::new(&config)?;
    let title = config
      .title
      .clone()
      .unwrap_or_else(|| extract_domain(&config.api.url).to_string());
    info!(api = %client.base_url(), "starting r9s");

    Ok(Self::with_root(
      title,
      config.board.toast_duration(),
      Box::new(KanbanBoardView::new(client)),
    ))
  }

  fn with_root(title: String, toast_ttl: Duration, root: Box<dyn View>) -> Self {
    Self {
      view_stack: vec![root],
      command: CommandInput::new(),
      toasts: Toasts::new(toast_ttl),
      title,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(TICK_RATE);

    // Main loop
    let result = async {
      while !self.should_quit {
        terminal.draw(|frame| ui::draw(frame, self))?;

        match events.next().await {
          Some(event) => self.handle_event(event),
          None => break,
        }
      }
      Ok::<_, color_eyre::Report>(())
    }
    .await;

    // Cleanup terminal, even when drawing failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn current_view(&self) -> Option<&dyn View> {
    self.view_stack.last().map(|v| v.as_ref())
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn command(&self) -> &CommandInput {
    &self.command
  }

  pub fn toasts(&self) -> &Toasts {
    &self.toasts
  }

  /// Labels of every view on the stack, root first
  pub fn breadcrumb(&self) -> Vec<String> {
    self.view_stack.iter().map(|v| v.breadcrumb_label()).collect()
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Resize => {}
      Event::Tick => self.tick(),
    }
  }

  /// Poll every view so background loads and commits settle even when the
  /// view is not on top
  fn tick(&mut self) {
    let mut notifications = Vec::new();
    for view in &mut self.view_stack {
      view.tick();
      notifications.extend(view.take_notifications());
    }
    self.notify(notifications);
    self.toasts.tick();
  }

  fn notify(&mut self, notifications: impl IntoIterator<Item = Notification>) {
    for notification in notifications {
      self.toasts.push(notification);
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      self.should_quit = true;
      return;
    }

    let capturing = self
      .current_view()
      .is_some_and(|view| view.is_capturing_input());

    if !capturing {
      match self.command.handle_key(key) {
        KeyResult::Event(CommandEvent::Submitted(cmd)) => {
          self.execute_command(&cmd);
          return;
        }
        KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => return,
        KeyResult::NotHandled => {}
      }
    }

    let action = match self.current_view_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::None,
    };
    self.apply(action);

    // Surface feedback from the key press without waiting for a tick
    let notifications = self
      .current_view_mut()
      .map(|view| view.take_notifications())
      .unwrap_or_default();
    self.notify(notifications);
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  fn execute_command(&mut self, cmd: &str) {
    match cmd {
      "board" => self.view_stack.truncate(1),
      "refresh" => {
        // The board owns the data, whichever view is on top
        let notification = self.view_stack.first_mut().and_then(|view| view.refresh());
        self.notify(notification);
      }
      "quit" => self.should_quit = true,
      "" => {}
      other => self
        .toasts
        .push(Notification::error(format!("Unknown command: {}", other))),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  /// View that records what it was asked to do
  struct StubView {
    label: &'static str,
    refreshed: bool,
  }

  impl StubView {
    fn boxed(label: &'static str) -> Box<dyn View> {
      Box::new(Self {
        label,
        refreshed: false,
      })
    }
  }

  impl View for StubView {
    fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
      match key.code {
        KeyCode::Enter => ViewAction::Push(StubView::boxed("detail")),
        KeyCode::Char('q') => ViewAction::Pop,
        _ => ViewAction::None,
      }
    }

    fn render(&mut self, _frame: &mut Frame, _area: Rect) {}

    fn breadcrumb_label(&self) -> String {
      if self.refreshed {
        format!("{} (refreshed)", self.label)
      } else {
        self.label.to_string()
      }
    }

    fn refresh(&mut self) -> Option<Notification> {
      self.refreshed = true;
      Some(Notification::info("Reloading tickets..."))
    }
  }

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn app() -> App {
    App::with_root(
      "Main Street".to_string(),
      Duration::from_secs(4),
      StubView::boxed("Board"),
    )
  }

  fn run_command(app: &mut App, text: &str) {
    app.handle_key(key(KeyCode::Char(':')));
    for c in text.chars() {
      app.handle_key(key(KeyCode::Char(c)));
    }
    app.handle_key(key(KeyCode::Enter));
  }

  #[test]
  fn test_push_and_pop_views() {
    let mut app = app();
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.breadcrumb(), vec!["Board", "detail"]);

    app.handle_key(key(KeyCode::Char('q')));
    assert_eq!(app.breadcrumb(), vec!["Board"]);
    assert!(!app.should_quit);

    app.handle_key(key(KeyCode::Char('q')));
    assert!(app.should_quit);
  }

  #[test]
  fn test_board_command_returns_to_root() {
    let mut app = app();
    app.handle_key(key(KeyCode::Enter));
    app.handle_key(key(KeyCode::Enter));
    run_command(&mut app, "board");
    assert_eq!(app.breadcrumb(), vec!["Board"]);
  }

  #[test]
  fn test_refresh_command_notifies() {
    let mut app = app();
    run_command(&mut app, "reload");
    assert_eq!(app.breadcrumb(), vec!["Board (refreshed)"]);
    assert_eq!(app.toasts().current().unwrap().message, "Reloading tickets...");
  }

  #[test]
  fn test_refresh_command_reaches_board_from_detail() {
    let mut app = app();
    app.handle_key(key(KeyCode::Enter));
    run_command(&mut app, "refresh");
    assert_eq!(app.breadcrumb(), vec!["Board (refreshed)", "detail"]);
    assert_eq!(app.toasts().current().unwrap().message, "Reloading tickets...");
  }

  #[test]
  fn test_ctrl_c_quits() {
    let mut app = app();
    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);
  }

  #[test]
  fn test_quit_command() {
    let mut app = app();
    run_command(&mut app, "quit");
    assert!(app.should_quit);
  }
}
