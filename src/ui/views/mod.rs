mod board;
mod ticket_detail;

pub use board::KanbanBoardView;
pub use ticket_detail::TicketDetailView;
