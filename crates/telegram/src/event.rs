//! Conversion from Telegram updates to channel-neutral dispatch events.

use teloxide::types::{Update, UpdateKind};

use bookline_common::Event;

/// Map an update onto a dispatch event. Returns `None` for update kinds the
/// bot does not handle and for callbacks without data or an origin message.
pub fn event_from_update(update: &Update) -> Option<Event> {
    match &update.kind {
        UpdateKind::Message(msg) => {
            let text = msg.text()?.to_string();
            let user_id = msg.from.as_ref().map(|u| u.id.0)?;
            Some(Event::Message {
                chat_id: msg.chat.id.0,
                message_id: msg.id.0,
                user_id,
                text,
            })
        },
        UpdateKind::CallbackQuery(query) => {
            let data = query.data.clone()?;
            let message = query.message.as_ref()?;
            Some(Event::Callback {
                chat_id: message.chat().id.0,
                message_id: message.id().0,
                user_id: query.from.id.0,
                query_id: query.id.clone(),
                data,
            })
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Update's deserializer needs a string source; from_value leaves the
    // payload as UpdateKind::Error.
    fn update(json: serde_json::Value) -> Update {
        serde_json::from_str(&json.to_string()).unwrap()
    }

    #[test]
    fn text_message_becomes_message_event() {
        let u = update(serde_json::json!({
            "update_id": 100,
            "message": {
                "message_id": 7,
                "date": 1756300000,
                "chat": {"id": 42, "type": "private", "first_name": "Ada"},
                "from": {"id": 900, "is_bot": false, "first_name": "Ada"},
                "text": "/start"
            }
        }));

        match event_from_update(&u) {
            Some(Event::Message {
                chat_id,
                message_id,
                user_id,
                text,
            }) => {
                assert_eq!(chat_id, 42);
                assert_eq!(message_id, 7);
                assert_eq!(user_id, 900);
                assert_eq!(text, "/start");
            },
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn callback_query_becomes_callback_event() {
        let u = update(serde_json::json!({
            "update_id": 101,
            "callback_query": {
                "id": "cbq-1",
                "from": {"id": 900, "is_bot": false, "first_name": "Ada"},
                "chat_instance": "ci",
                "data": "select_date_2026-09-01",
                "message": {
                    "message_id": 8,
                    "date": 1756300000,
                    "chat": {"id": 42, "type": "private", "first_name": "Ada"},
                    "text": "pick a date"
                }
            }
        }));

        match event_from_update(&u) {
            Some(Event::Callback {
                chat_id,
                message_id,
                query_id,
                data,
                ..
            }) => {
                assert_eq!(chat_id, 42);
                assert_eq!(message_id, 8);
                assert_eq!(query_id, "cbq-1");
                assert_eq!(data, "select_date_2026-09-01");
            },
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn non_text_message_is_skipped() {
        let u = update(serde_json::json!({
            "update_id": 102,
            "message": {
                "message_id": 9,
                "date": 1756300000,
                "chat": {"id": 42, "type": "private", "first_name": "Ada"},
                "from": {"id": 900, "is_bot": false, "first_name": "Ada"},
                "photo": [{"file_id": "f", "file_unique_id": "fu", "width": 1, "height": 1}]
            }
        }));
        assert!(event_from_update(&u).is_none());
    }
}
