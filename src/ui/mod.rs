pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use renderfns::{draw_footer, draw_header};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer / notifications
    ])
    .split(frame.area());

  let breadcrumb = app.breadcrumb();
  let context = breadcrumb.last().cloned().unwrap_or_default();
  let (shortcuts, active) = app
    .current_view()
    .map(|view| (view.shortcuts(), !view.is_capturing_input()))
    .unwrap_or_default();
  let active = active && !app.command().is_active();
  draw_header(frame, chunks[0], app.title(), &context, &shortcuts, active);

  if let Some(view) = app.current_view_mut() {
    view.render(frame, chunks[1]);
  }

  // A notification takes the footer until it expires
  if !app.toasts().render(frame, chunks[2]) {
    draw_footer(frame, chunks[2], &breadcrumb);
  }

  app.command().render_overlay(frame, chunks[1]);
}
