use crate::ui::view::{ShortcutInfo, ShortcutVisibility};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with logo, shop, context, and shortcuts
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  title: &str,
  context: &str,
  shortcuts: &[ShortcutInfo],
  active: bool,
) {
  let mut spans = vec![
    Span::styled(" r9s ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", title), Style::default().fg(Color::White)),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", context),
      Style::default().fg(Color::Yellow).bold(),
    ),
    Span::raw(" "),
  ];

  let mut visible: Vec<&ShortcutInfo> = shortcuts
    .iter()
    .filter(|s| active || s.visibility == ShortcutVisibility::Always)
    .collect();
  visible.sort_by_key(|s| s.priority);

  // Keys highlighted, labels dimmed
  for shortcut in visible {
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

/// Host part of the API URL, used when no title is configured
pub fn extract_domain(url: &str) -> &str {
  url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url)
    .split('/')
    .next()
    .unwrap_or(url)
}
