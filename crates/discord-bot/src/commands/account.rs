use serenity::{builder::CreateApplicationCommand, model::application::command::CommandOptionType};

pub fn setup_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("setup")
        .description("Link or replace your Canvas account")
        .dm_permission(true);
    command
}

pub fn unlink_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("unlink")
        .description("Remove your Canvas token (todos, notes and reminders are kept)")
        .dm_permission(true)
        .create_option(|option| {
            option
                .name("confirm")
                .description("Set to true to really remove the token")
                .kind(CommandOptionType::Boolean)
                .required(true)
        });
    command
}

pub fn help_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("help")
        .description("Show what the bot can do")
        .dm_permission(true);
    command
}
