//! Event dispatcher
//!
//! Routes an inbound event to a button handler, a menu command, or the conversation
//! engine, with the sender's session locked for the whole event. Errors are mapped to
//! replies here so handlers only decide what went wrong, not how to say it.

use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info, warn};
use uuid::Uuid;

use super::action::CallbackData;
use super::context::BotContext;
use super::handler::ActionRequest;
use super::handlers::menu::run_menu;
use super::menu::MenuCommand;
use super::registry::ActionRegistry;
use crate::core::{BotError, Reply, StoreError};
use crate::features::conversation::{Session, SessionStore};
use crate::gateway::{InboundEvent, ReplySink};
use crate::message_components as ui;

pub struct Dispatcher {
    ctx: BotContext,
    sessions: SessionStore,
    registry: ActionRegistry,
    session_timeout: Option<Duration>,
}

impl Dispatcher {
    pub fn new(ctx: BotContext) -> Self {
        let session_timeout = ctx.config.session_timeout();
        Self {
            ctx,
            sessions: SessionStore::new(),
            registry: ActionRegistry::with_all_handlers(),
            session_timeout,
        }
    }

    pub fn context(&self) -> &BotContext {
        &self.ctx
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn session_timeout(&self) -> Option<Duration> {
        self.session_timeout
    }

    /// Handle one inbound event and return the replies for its sender
    pub async fn handle(&self, event: &InboundEvent, now: DateTime<Utc>) -> Vec<Reply> {
        let mut session = self.sessions.lock(&event.sender, now).await;
        self.handle_locked(&mut session, event, now).await
    }

    /// Handle one inbound event and send its replies before releasing the sender's session
    ///
    /// The sender's next event waits until these replies are out, so replies reach the
    /// user in the order the events arrived. Stops at the first failed send and returns
    /// how many replies were delivered.
    pub async fn handle_and_deliver(
        &self,
        event: &InboundEvent,
        now: DateTime<Utc>,
        sink: &dyn ReplySink,
    ) -> usize {
        let owner = event.sender.as_str();
        let mut session = self.sessions.lock(owner, now).await;
        let replies = self.handle_locked(&mut session, event, now).await;

        let mut delivered = 0;
        for reply in replies {
            if let Err(e) = sink.send(owner, reply).await {
                warn!("Failed to reply to {owner}: {e:#}");
                break;
            }
            delivered += 1;
        }
        delivered
    }

    async fn handle_locked(
        &self,
        session: &mut Session,
        event: &InboundEvent,
        now: DateTime<Utc>,
    ) -> Vec<Reply> {
        let request_id = Uuid::new_v4().to_string();
        let owner = event.sender.as_str();

        if session.expire_if_idle(now, self.session_timeout) {
            info!("[{request_id}] Session for {owner} expired, back to idle");
        }
        session.touch(now);

        let result = if let Some(raw) = event.callback_data.as_deref() {
            debug!("[{request_id}] Button {raw:?} from {owner}");
            self.dispatch_callback(session, &request_id, owner, raw, now)
                .await
        } else if let Some(command) = event.trimmed_text().and_then(MenuCommand::parse_text) {
            debug!("[{request_id}] Command {command} from {owner}");
            run_menu(&self.ctx, session, owner, command).await
        } else {
            self.ctx
                .engine
                .on_message(session, event, now)
                .await
                .map_err(anyhow::Error::from)
        };

        match result {
            Ok(replies) => replies,
            Err(e) => recover(session, &request_id, owner, e),
        }
    }

    async fn dispatch_callback(
        &self,
        session: &mut Session,
        request_id: &str,
        owner: &str,
        raw: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Reply>> {
        let Some(data) = CallbackData::parse(raw) else {
            warn!("[{request_id}] Ignoring empty callback from {owner}");
            return Ok(Vec::new());
        };
        let Some(handler) = self.registry.get(&data.action) else {
            warn!("[{request_id}] Unknown action {:?} from {owner}", data.action);
            return Ok(Vec::new());
        };

        let request = ActionRequest {
            request_id,
            owner,
            data: &data,
            now,
        };
        handler.handle(&self.ctx, session, &request).await
    }
}

/// Turn a failed event into replies
///
/// Validation and unsupported content re-prompt in place; a missing item aborts to idle;
/// anything else is a generic failure and logged in full.
fn recover(session: &mut Session, request_id: &str, owner: &str, e: anyhow::Error) -> Vec<Reply> {
    if let Some(err) = e.downcast_ref::<BotError>() {
        if err.is_recoverable() {
            debug!(
                "[{request_id}] Re-prompting {owner} in state {}: {err}",
                session.state
            );
        }
        return match err {
            BotError::Validation(message) => vec![Reply::text(message.as_str())],
            BotError::UnsupportedContent => vec![ui::unsupported_content()],
            BotError::NotFound(item_id) => {
                info!("[{request_id}] Item {item_id} not found for {owner}");
                session.reset();
                vec![ui::item_not_found()]
            }
            BotError::Storage(store) => {
                error!(
                    "[{request_id}] Storage failure for {owner} in state {}: {store}",
                    session.state
                );
                vec![ui::generic_failure()]
            }
        };
    }

    if let Some(store) = e.downcast_ref::<StoreError>() {
        error!(
            "[{request_id}] Storage failure for {owner} in state {}: {store}",
            session.state
        );
    } else {
        error!("[{request_id}] Failed to handle event from {owner}: {e:#}");
    }
    vec![ui::generic_failure()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::database::Database;
    use crate::features::conversation::{ConversationState, PendingDraft};
    use crate::features::items::{ContentPayload, ItemId, NewItem};
    use crate::gateway::MemorySink;
    use chrono::SubsecRound;
    use std::sync::Arc;

    async fn dispatcher() -> (Dispatcher, Database) {
        let db = Database::in_memory().await.unwrap();
        let ctx = BotContext::new(Config::default(), db.clone(), Arc::new(MemorySink::new()));
        (Dispatcher::new(ctx), db)
    }

    fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }

    async fn seed(db: &Database, owner: &str) -> ItemId {
        db.create(&NewItem {
            owner: owner.into(),
            category: "errands".into(),
            subject: "groceries".into(),
            payload: ContentPayload::text("buy milk"),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_unknown_action_is_noop() {
        let (d, _db) = dispatcher().await;
        let t = now();
        d.handle(&InboundEvent::text("u1", "/add"), t).await;

        let replies = d.handle(&InboundEvent::callback("u1", "explode_3"), t).await;
        assert!(replies.is_empty());
        assert_eq!(
            d.sessions().state_of("u1").await,
            Some(ConversationState::AwaitingContent)
        );
    }

    #[tokio::test]
    async fn test_menu_buttons_and_text_commands_agree() {
        let (d, _db) = dispatcher().await;
        let t = now();
        d.handle(&InboundEvent::callback("u1", "menu_search"), t).await;
        assert_eq!(
            d.sessions().state_of("u1").await,
            Some(ConversationState::AwaitingSearchQuery)
        );
        d.handle(&InboundEvent::text("u2", "/search"), t).await;
        assert_eq!(
            d.sessions().state_of("u2").await,
            Some(ConversationState::AwaitingSearchQuery)
        );
    }

    #[tokio::test]
    async fn test_start_restarts_from_any_state() {
        let (d, _db) = dispatcher().await;
        let t = now();
        d.handle(&InboundEvent::text("u1", "/add"), t).await;
        d.handle(&InboundEvent::text("u1", "draft text"), t).await;

        let replies = d.handle(&InboundEvent::text("u1", "/start"), t).await;
        assert!(replies[0].actions().contains(&"menu_add"));
        let session = d.sessions().lock("u1", t).await;
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_validation_reprompts_in_place() {
        let (d, _db) = dispatcher().await;
        let t = now();
        d.handle(&InboundEvent::text("u1", "/add"), t).await;
        d.handle(&InboundEvent::text("u1", "buy milk"), t).await;
        d.handle(&InboundEvent::callback("u1", "newcat"), t).await;

        let replies = d.handle(&InboundEvent::text("u1", "   "), t).await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("must not be empty"));
        assert_eq!(
            d.sessions().state_of("u1").await,
            Some(ConversationState::AwaitingCategory)
        );
    }

    #[tokio::test]
    async fn test_stale_button_reports_not_found_and_resets() {
        let (d, db) = dispatcher().await;
        let t = now();
        let id = seed(&db, "u1").await;
        d.handle(&InboundEvent::callback("u1", format!("note_{id}")), t)
            .await;
        assert_eq!(
            d.sessions().state_of("u1").await,
            Some(ConversationState::AwaitingNote { item_id: id })
        );

        db.delete(id).await.unwrap();
        let replies = d.handle(&InboundEvent::text("u1", "too late"), t).await;
        assert!(replies[0].text.contains("no longer exists"));
        assert_eq!(d.sessions().state_of("u1").await, Some(ConversationState::Idle));
    }

    #[tokio::test]
    async fn test_foreign_item_buttons_are_not_found() {
        let (d, db) = dispatcher().await;
        let id = seed(&db, "owner").await;

        let replies = d
            .handle(&InboundEvent::callback("intruder", format!("pin_{id}")), now())
            .await;
        assert!(replies[0].text.contains("no longer exists"));
        assert!(!db.get(id).await.unwrap().unwrap().pinned);
    }

    #[tokio::test]
    async fn test_pin_toggle_redisplays_item() {
        let (d, db) = dispatcher().await;
        let id = seed(&db, "u1").await;
        let t = now();

        let replies = d
            .handle(&InboundEvent::callback("u1", format!("pin_{id}")), t)
            .await;
        assert!(db.get(id).await.unwrap().unwrap().pinned);
        assert_eq!(replies[1].keyboard.as_ref().unwrap().rows[0][0].label, "📍 Unpin");

        d.handle(&InboundEvent::callback("u1", format!("pin_{id}")), t)
            .await;
        assert!(!db.get(id).await.unwrap().unwrap().pinned);
    }

    #[tokio::test]
    async fn test_quick_reminder_button() {
        let (d, db) = dispatcher().await;
        let id = seed(&db, "u1").await;
        let t = now();

        let replies = d
            .handle(&InboundEvent::callback("u1", format!("remind_{id}")), t)
            .await;
        assert!(replies[0].actions().contains(&format!("setremind_{id}_3").as_str()));

        d.handle(&InboundEvent::callback("u1", format!("setremind_{id}_3")), t)
            .await;
        assert_eq!(
            db.get(id).await.unwrap().unwrap().reminder_at,
            Some(t + Duration::hours(3))
        );
    }

    #[tokio::test]
    async fn test_delete_content_and_note() {
        let (d, db) = dispatcher().await;
        let id = seed(&db, "u1").await;
        db.update_note(id, "note").await.unwrap();
        let t = now();

        d.handle(&InboundEvent::callback("u1", format!("delnote_{id}")), t)
            .await;
        assert_eq!(db.get(id).await.unwrap().unwrap().note, "");

        let replies = d
            .handle(&InboundEvent::callback("u1", format!("delcontent_{id}")), t)
            .await;
        assert!(replies[0].text.contains("deleted"));
        assert!(db.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_category_with_delimiter_selected_from_button() {
        let (d, db) = dispatcher().await;
        let t = now();
        d.handle(&InboundEvent::text("u1", "/add"), t).await;
        d.handle(&InboundEvent::text("u1", "x"), t).await;
        d.handle(&InboundEvent::callback("u1", "cat_to_do"), t).await;
        d.handle(&InboundEvent::text("u1", "task"), t).await;
        d.handle(&InboundEvent::callback("u1", "confirm_save"), t).await;

        assert_eq!(db.list_categories("u1").await.unwrap(), vec!["to_do"]);
    }

    #[tokio::test]
    async fn test_expired_session_drops_draft() {
        let (d, db) = dispatcher().await;
        let t = now();
        {
            let mut session = d.sessions().lock("u1", t).await;
            let mut draft = PendingDraft::new(ContentPayload::text("x"), t);
            draft.category = Some("c".into());
            draft.subject = Some("s".into());
            session.draft = Some(draft);
        }

        let later = t + Duration::minutes(31);
        let replies = d
            .handle(&InboundEvent::callback("u1", "confirm_save"), later)
            .await;
        assert!(replies[0].text.contains("nothing waiting"));
        assert_eq!(db.stats("u1").await.unwrap().total_items, 0);
    }

    #[tokio::test]
    async fn test_browse_and_settings() {
        let (d, db) = dispatcher().await;
        let id = seed(&db, "u1").await;
        let t = now();

        let replies = d.handle(&InboundEvent::text("u1", "/browse"), t).await;
        assert!(replies[0].actions().contains(&"showcat_errands_0"));

        let replies = d
            .handle(&InboundEvent::callback("u1", "showcat_errands_0"), t)
            .await;
        assert!(replies[0].actions().contains(&format!("show_{id}").as_str()));

        let replies = d.handle(&InboundEvent::callback("u1", "stats"), t).await;
        assert!(replies[0].text.contains("Items: 1"));

        let replies = d.handle(&InboundEvent::callback("u1", "export"), t).await;
        assert!(replies[0].file.is_some());
    }

    /// Holds back replies that start with the welcome text
    struct SlowWelcomeSink(MemorySink);

    #[async_trait::async_trait]
    impl ReplySink for SlowWelcomeSink {
        async fn send(&self, owner: &str, reply: Reply) -> anyhow::Result<()> {
            if reply.text.starts_with("👋") {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
            self.0.send(owner, reply).await
        }
    }

    #[tokio::test]
    async fn test_replies_leave_in_event_order() {
        let (d, _db) = dispatcher().await;
        let sink = SlowWelcomeSink(MemorySink::new());
        let t = now();
        let start = InboundEvent::text("u1", "/start");
        let cancel = InboundEvent::text("u1", "/cancel");

        let (first, second) = tokio::join!(
            d.handle_and_deliver(&start, t, &sink),
            d.handle_and_deliver(&cancel, t, &sink)
        );
        assert_eq!((first, second), (1, 1));

        let sent = sink.0.sent_to("u1");
        assert!(sent[0].text.starts_with("👋"));
        assert!(sent[1].text.starts_with("Cancelled"));
    }

    #[tokio::test]
    async fn test_delivery_stops_at_first_failure() {
        let (d, db) = dispatcher().await;
        let id = seed(&db, "u1").await;
        let sink = MemorySink::new();
        sink.set_failing(true);

        let pin = InboundEvent::callback("u1", format!("pin_{id}"));
        assert_eq!(d.handle_and_deliver(&pin, now(), &sink).await, 0);
        assert!(sink.sent().is_empty());
        // The action itself was applied
        assert!(db.get(id).await.unwrap().unwrap().pinned);
    }
}
