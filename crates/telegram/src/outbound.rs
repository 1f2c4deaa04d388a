use std::future::Future;

use {
    async_trait::async_trait,
    teloxide::{
        ApiError, RequestError,
        payloads::SendMessageSetters,
        prelude::*,
        types::{ChatId, InlineKeyboardMarkup, MessageId},
    },
    tracing::{debug, warn},
};

use crate::error::Result;

const RETRY_AFTER_MAX_RETRIES: usize = 4;

/// Outbound message sender for the booking flows.
///
/// Handlers talk to Telegram through this trait so flow logic can be tested
/// against a recording fake.
#[async_trait]
pub trait Outbound: Send + Sync {
    /// Send plain text; returns the new message id for cleanup tracking.
    async fn send(&self, chat_id: i64, text: &str) -> Result<i32>;

    async fn send_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<i32>;

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<()>;

    /// Dismiss the loading spinner on an inline button press.
    async fn answer_callback(&self, query_id: &str) -> Result<()>;
}

/// Teloxide-backed sender.
pub struct TelegramOutbound {
    bot: Bot,
}

impl TelegramOutbound {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    async fn run_with_retry<T, F, Fut>(
        &self,
        chat_id: i64,
        operation: &'static str,
        mut request: F,
    ) -> std::result::Result<T, RequestError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, RequestError>>,
    {
        let mut retries = 0usize;
        loop {
            match request().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let RequestError::RetryAfter(wait) = &err else {
                        return Err(err);
                    };
                    if retries >= RETRY_AFTER_MAX_RETRIES {
                        warn!(
                            chat_id,
                            operation, retries, "telegram rate limit persisted after retries"
                        );
                        return Err(err);
                    }
                    retries += 1;
                    let wait = wait.duration();
                    warn!(
                        chat_id,
                        operation,
                        retries,
                        retry_after_secs = wait.as_secs(),
                        "telegram rate limited, waiting before retry"
                    );
                    tokio::time::sleep(wait).await;
                },
            }
        }
    }
}

#[async_trait]
impl Outbound for TelegramOutbound {
    async fn send(&self, chat_id: i64, text: &str) -> Result<i32> {
        let message = self
            .run_with_retry(chat_id, "send message", || {
                let req = self.bot.send_message(ChatId(chat_id), text);
                async move { req.await }
            })
            .await?;
        Ok(message.id.0)
    }

    async fn send_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<i32> {
        let message = self
            .run_with_retry(chat_id, "send message with keyboard", || {
                let req = self
                    .bot
                    .send_message(ChatId(chat_id), text)
                    .reply_markup(keyboard.clone());
                async move { req.await }
            })
            .await?;
        Ok(message.id.0)
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<()> {
        match self
            .bot
            .delete_message(ChatId(chat_id), MessageId(message_id))
            .await
        {
            Ok(_) => Ok(()),
            // Already gone or past the deletion window; nothing to clean up.
            Err(RequestError::Api(ApiError::MessageToDeleteNotFound | ApiError::MessageCantBeDeleted)) => {
                debug!(chat_id, message_id, "skipping undeletable message");
                Ok(())
            },
            Err(err) => Err(err.into()),
        }
    }

    async fn answer_callback(&self, query_id: &str) -> Result<()> {
        self.bot.answer_callback_query(query_id).await?;
        Ok(())
    }
}
