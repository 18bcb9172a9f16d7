mod command_input;
mod confirm_dialog;
mod input;
mod key_result;
mod search_input;
mod status_column;
mod ticket_card;
mod toast;

pub use command_input::{CommandEvent, CommandInput};
pub use confirm_dialog::{ConfirmDialog, ConfirmDialogEvent};
pub use key_result::KeyResult;
pub use search_input::{SearchEvent, SearchInput};
pub use status_column::{ColumnFocus, DragGesture, StatusColumn};
pub use ticket_card::{CardState, DragPayload};
pub use toast::Toasts;
