//! UI layer: callback wire format, keyboards and message templates.

pub mod callback;
pub mod keyboard;
pub mod templates;

pub use callback::{resolve_toggle, CallbackAction};
pub use keyboard::{render_results, BrowseState};
pub use templates::Messages;
