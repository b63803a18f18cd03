use serenity::{builder::CreateApplicationCommand, model::application::command::CommandOptionType};

/// Create command for the daily reminder settings
pub fn reminder_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("reminder")
        .description("Daily deadline reminder")
        .dm_permission(true)
        .create_option(|option| {
            option
                .name("show")
                .description("Show your reminder setting")
                .kind(CommandOptionType::SubCommand)
        })
        .create_option(|option| {
            option
                .name("set")
                .description("Turn the reminder on at a given hour (SGT)")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("hour")
                        .description("Hour of day, 0-23")
                        .kind(CommandOptionType::Integer)
                        .min_int_value(0)
                        .max_int_value(23)
                        .required(true)
                })
        })
        .create_option(|option| {
            option
                .name("off")
                .description("Turn the daily reminder off")
                .kind(CommandOptionType::SubCommand)
        });
    command
}
