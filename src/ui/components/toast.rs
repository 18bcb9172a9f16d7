use crate::workflow::{Notification, NotificationLevel};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use std::time::{Duration, Instant};

/// Transient notification shown in the status line
#[derive(Debug, Clone)]
pub struct Toast {
  notification: Notification,
  expires_at: Instant,
}

/// Holds the most recent notification until it expires
#[derive(Debug, Clone)]
pub struct Toasts {
  current: Option<Toast>,
  ttl: Duration,
}

impl Toasts {
  pub fn new(ttl: Duration) -> Self {
    Self { current: None, ttl }
  }

  /// Show `notification`, replacing whatever was shown before
  pub fn push(&mut self, notification: Notification) {
    self.current = Some(Toast {
      notification,
      expires_at: Instant::now() + self.ttl,
    });
  }

  pub fn current(&self) -> Option<&Notification> {
    self.current.as_ref().map(|t| &t.notification)
  }

  /// Drop the notification once its time is up
  pub fn tick(&mut self) {
    self.expire(Instant::now());
  }

  fn expire(&mut self, now: Instant) {
    if self.current.as_ref().is_some_and(|t| now >= t.expires_at) {
      self.current = None;
    }
  }

  /// Render into `area`; returns false if there was nothing to show
  pub fn render(&self, frame: &mut Frame, area: Rect) -> bool {
    let Some(notification) = self.current() else {
      return false;
    };

    let (marker, color) = match notification.level {
      NotificationLevel::Success => ("OK", Color::Green),
      NotificationLevel::Error => ("!!", Color::Red),
      NotificationLevel::Info => ("--", Color::Cyan),
    };

    let line = Line::from(vec![
      Span::styled(format!(" {} ", marker), Style::default().fg(Color::Black).bg(color)),
      Span::raw(" "),
      Span::styled(notification.message.as_str(), Style::default().fg(color)),
    ]);
    frame.render_widget(
      Paragraph::new(line).style(Style::default().bg(Color::Black)),
      area,
    );
    true
  }
}
