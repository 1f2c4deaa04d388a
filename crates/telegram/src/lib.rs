//! Telegram front end for the booking bot.
//!
//! Receives updates via long polling, converts them into channel-neutral
//! events for the dispatcher, and renders booking flows back to chats as
//! messages with inline keyboards.

pub mod error;
pub mod event;
pub mod handlers;
pub mod keyboards;
pub mod outbound;
pub mod poller;
pub mod texts;

pub use {
    error::{Error, Result},
    handlers::BotHandler,
    outbound::{Outbound, TelegramOutbound},
    poller::{build_bot, run_polling},
};
