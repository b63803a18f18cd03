use serenity::{
    builder::{CreateApplicationCommand, CreateApplicationCommandOption},
    model::application::command::CommandOptionType,
};

fn password_option(
    option: &mut CreateApplicationCommandOption,
) -> &mut CreateApplicationCommandOption {
    option
        .name("password")
        .description("Admin password")
        .kind(CommandOptionType::String)
        .required(true)
}

/// Create command for bot administration
pub fn admin_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("admin")
        .description("Bot administration")
        .dm_permission(true)
        .create_option(|option| {
            option
                .name("stats")
                .description("Usage statistics")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(password_option)
        })
        .create_option(|option| {
            option
                .name("broadcast")
                .description("Message every user")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(password_option)
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("message")
                        .description("Text to send")
                        .kind(CommandOptionType::String)
                        .required(true)
                })
        })
        .create_option(|option| {
            option
                .name("purge")
                .description("Delete every record of one user")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(password_option)
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("user")
                        .description("Discord user id")
                        .kind(CommandOptionType::String)
                        .required(true)
                })
        });
    command
}
