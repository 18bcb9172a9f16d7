/// Truncate a string to at most `max_len` characters, ending in "..." when cut
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    return s.to_string();
  }
  if max_len <= 3 {
    return ".".repeat(max_len);
  }
  let kept: String = s.chars().take(max_len - 3).collect();
  format!("{}...", kept)
}
