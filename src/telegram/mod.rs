//! Telegram integration: bot construction, dispatcher handlers, the
//! membership gate, keyboards, and artifact delivery.

pub mod bot;
pub mod gate;
pub mod handlers;
pub mod keyboard;
pub mod send;

pub use bot::{create_bot, setup_bot_commands, Command};
pub use gate::{AccessGate, GateCheck, MembershipApi};
pub use handlers::{schema, HandlerDeps, HandlerError};
