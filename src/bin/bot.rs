use anyhow::Result;
use chrono::Utc;
use dotenvy::dotenv;
use log::{debug, error, info};
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;

use stashbot::commands::{BotContext, Dispatcher};
use stashbot::core::Config;
use stashbot::database::Database;
use stashbot::features::subscriptions::SubscriptionReminder;
use stashbot::gateway::discord::{inbound_from_component, inbound_from_message, DiscordSink};
use stashbot::gateway::InboundEvent;

/// How often idle sessions are swept from memory
const SESSION_SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(300);

struct Handler {
    dispatcher: Arc<Dispatcher>,
    sink: Arc<DiscordSink>,
}

impl Handler {
    async fn dispatch(&self, event: InboundEvent) {
        self.dispatcher
            .handle_and_deliver(&event, Utc::now(), self.sink.as_ref())
            .await;
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, _ctx: Context, msg: Message) {
        let Some(event) = inbound_from_message(&msg) else {
            return;
        };
        debug!("DM from {}", event.sender);
        self.dispatch(event).await;
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("🔗 Gateway session ID: {:?}", ready.session_id);
        info!("🤖 Bot ID: {}", ready.user.id);
        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::MessageComponent(component) = interaction else {
            return;
        };

        // Acknowledge first; replies arrive as new messages
        if let Err(e) = component
            .create_interaction_response(&ctx.http, |response| {
                response.kind(InteractionResponseType::DeferredUpdateMessage)
            })
            .await
        {
            error!(
                "Failed to acknowledge component interaction '{}': {}",
                component.data.custom_id, e
            );
        }

        self.dispatch(inbound_from_component(&component)).await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting stashbot...");

    let database = Database::new(&config.database_path)
        .await?
        .with_search_limit(config.search_result_limit);

    let http = Arc::new(Http::new(&config.discord_token));
    let sink = Arc::new(DiscordSink::new(http));

    let ctx = BotContext::new(config.clone(), database.clone(), sink.clone());
    let dispatcher = Arc::new(Dispatcher::new(ctx));

    // Reminder delivery: sweep on start, then at a steady interval
    let scheduler = dispatcher.context().scheduler.clone();
    tokio::spawn(async move {
        scheduler.run().await;
    });

    if config.subscriptions_enabled {
        let reminder = SubscriptionReminder::new(
            database.clone(),
            sink.clone(),
            config.subscription_lead_days,
            config.subscription_check_interval(),
        );
        tokio::spawn(async move {
            reminder.run().await;
        });
    } else {
        info!("💳 Subscription reminders disabled");
    }

    // Drop conversations nobody came back to
    if let Some(timeout) = dispatcher.session_timeout() {
        let sweeper = dispatcher.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let expired = sweeper.sessions().expire_idle(Utc::now(), Some(timeout));
                if expired > 0 {
                    info!("🧹 Expired {expired} idle conversation(s)");
                }
            }
        });
    }

    let handler = Handler { dispatcher, sink };

    let intents = GatewayIntents::DIRECT_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            error!("This could indicate:");
            error!("  - Invalid bot token format");
            error!("  - Network issues reaching Discord API");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Establishing WebSocket connection to Discord gateway...");
    info!("Gateway intents: {intents:?}");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
