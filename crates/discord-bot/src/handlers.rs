use serenity::{
    async_trait,
    model::{
        application::{
            command::Command,
            interaction::{Interaction, InteractionResponseType},
        },
        gateway::Ready,
        id::GuildId,
    },
    prelude::*,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use duebot_core::{
    errors::{BotError, BotResult},
    models::user::UserId,
};

pub mod account;
pub mod admin;
pub mod deadlines;
pub mod options;
pub mod personal;
pub mod reminder;

use crate::{config::BotConfig, render, services::BotServices};
use options::Options;

/// Main Discord handler that processes all events.
///
/// Every slash command is acknowledged with an ephemeral deferred response
/// first, since most of them wait on Canvas, and the reply then replaces it.
pub struct Handler {
    config: BotConfig,
    services: Arc<BotServices>,
}

impl Handler {
    /// Create a new handler
    pub fn new(config: BotConfig, services: Arc<BotServices>) -> Self {
        Self { config, services }
    }

    /// Route one command to its handler and produce the reply text.
    async fn dispatch(&self, name: &str, user: UserId, options: Options<'_>) -> BotResult<String> {
        let services = self.services.as_ref();
        match name {
            "setup" => account::setup(services, &self.config, user).await,
            "unlink" => {
                account::unlink(services, user, options.boolean("confirm").unwrap_or(false)).await
            }
            "help" => Ok(render::HELP_TEXT.to_string()),
            "due" => {
                deadlines::due(
                    services,
                    user,
                    options.integer("days"),
                    options.boolean("show_submitted").unwrap_or(false),
                )
                .await
            }
            "courses" => deadlines::courses(services, user).await,
            "assignments" => {
                deadlines::assignments(services, user, options.require_integer("course")?).await
            }
            "files" => {
                deadlines::files(
                    services,
                    user,
                    options.require_integer("course")?,
                    options.integer("folder"),
                )
                .await
            }
            "refresh" => deadlines::refresh(services, user).await,
            "reminder" => reminder::handle(services, user, options.subcommand()?).await,
            "todo" => personal::handle_todo(services, user, options.subcommand()?).await,
            "note" => personal::handle_note(services, user, options.subcommand()?).await,
            "admin" => admin::handle(services, &self.config, user, options.subcommand()?).await,
            other => Err(BotError::NotFound(format!("Command /{other}"))),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Handle ready events (when bot connects to Discord)
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        // A test guild picks up command changes immediately; global commands are cached
        let registered = match self.config.test_guild_id {
            Some(test_guild_id) => {
                GuildId(test_guild_id)
                    .set_application_commands(&ctx.http, |commands| {
                        crate::commands::register_commands(commands)
                    })
                    .await
            }
            None => {
                Command::set_global_application_commands(&ctx.http, |commands| {
                    crate::commands::register_commands(commands)
                })
                .await
            }
        };

        match registered {
            Ok(cmds) => {
                info!("Commands registered successfully! Total commands: {}", cmds.len());
                for cmd in cmds {
                    info!("Command registered: /{} - {}", cmd.name, cmd.description);
                }
            }
            Err(why) => {
                error!("Error registering commands: {:?}", why);
            }
        }
    }

    /// Handle slash commands
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::ApplicationCommand(command) = interaction else {
            return;
        };
        let user = UserId(command.user.id.0);
        info!(command = %command.data.name, user_id = %user, "Received command");

        if let Err(why) = command
            .create_interaction_response(&ctx.http, |r| {
                r.kind(InteractionResponseType::DeferredChannelMessageWithSource)
                    .interaction_response_data(|m| m.ephemeral(true))
            })
            .await
        {
            error!("Failed to acknowledge command: {:?}", why);
            return;
        }

        let reply = match self
            .dispatch(&command.data.name, user, Options::new(&command.data.options))
            .await
        {
            Ok(text) => text,
            Err(err) => {
                if err.is_user_correctable() {
                    info!(command = %command.data.name, user_id = %user, error = %err, "Command rejected");
                } else {
                    warn!(command = %command.data.name, user_id = %user, error = %err, "Command failed");
                }
                err.user_message()
            }
        };

        if let Err(why) = command
            .edit_original_interaction_response(&ctx.http, |m| m.content(render::truncate(&reply)))
            .await
        {
            error!("Failed to send command response: {:?}", why);
        }
    }
}
