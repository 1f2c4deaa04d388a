//! Manual long-polling receiver.
//!
//! One task owns the `getUpdates` cursor and feeds the dispatcher's queue.
//! Backpressure comes from the bounded queue: a full pool slows the poll
//! loop down instead of dropping updates.

use std::time::Duration;

use {
    teloxide::{
        ApiError, Bot, RequestError,
        prelude::*,
        types::{AllowedUpdate, UpdateKind},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

use bookline_dispatch::QueueHandle;

use crate::{error::Result, event::event_from_update};

/// Long-poll wait per `getUpdates` call, in seconds. The HTTP client timeout
/// must exceed this so the request is not aborted before Telegram responds.
const POLL_TIMEOUT_SECS: u32 = 30;

/// Pause after a failed poll before retrying.
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Build the bot client with a timeout sized for the long-poll wait.
pub fn build_bot(token: &str) -> Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(Duration::from_secs(u64::from(POLL_TIMEOUT_SECS) + 15))
        .build()
        .map_err(RequestError::from)?;
    Ok(Bot::with_client(token, client))
}

/// Poll for updates until `cancel` fires, submitting each recognized update
/// to the dispatcher queue. A `getUpdates` conflict (another process polling
/// with the same token) cancels the token and exits.
pub async fn run_polling(bot: Bot, queue: QueueHandle, cancel: CancellationToken) -> Result<()> {
    // Webhook mode and long polling are mutually exclusive on the Bot API.
    bot.delete_webhook().send().await?;

    let me = bot.get_me().await?;
    info!(username = ?me.username, "telegram bot connected, starting polling loop");

    let mut offset: i32 = 0;
    loop {
        if cancel.is_cancelled() {
            info!("telegram polling stopped");
            return Ok(());
        }

        // Abandon an in-flight long poll on cancel; the lost batch is
        // redelivered on the next start because its offset was never acked.
        let result = tokio::select! {
            result = bot
                .get_updates()
                .offset(offset)
                .timeout(POLL_TIMEOUT_SECS)
                .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::CallbackQuery])
                .send() => result,
            () = cancel.cancelled() => {
                info!("telegram polling stopped");
                return Ok(());
            },
        };

        match result {
            Ok(updates) => {
                debug!(count = updates.len(), "got telegram updates");
                for update in updates {
                    offset = update.id.as_offset();
                    let Some(event) = event_from_update(&update) else {
                        if !matches!(
                            update.kind,
                            UpdateKind::Message(_) | UpdateKind::CallbackQuery(_)
                        ) {
                            debug!(update_id = ?update.id, "ignoring unsupported update kind");
                        }
                        continue;
                    };
                    if let Err(e) = queue.submit(event).await {
                        info!(error = %e, "dispatcher stopped, exiting polling loop");
                        return Ok(());
                    }
                }
            },
            Err(e) => {
                if matches!(&e, RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) {
                    error!("another instance is already polling with this token, stopping");
                    cancel.cancel();
                    return Err(e.into());
                }
                warn!(error = %e, "telegram getUpdates failed");
                tokio::time::sleep(POLL_ERROR_BACKOFF).await;
            },
        }
    }
}
