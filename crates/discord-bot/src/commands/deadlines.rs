use serenity::{builder::CreateApplicationCommand, model::application::command::CommandOptionType};

pub const MAX_DUE_DAYS: i64 = 90;

/// Create command for listing upcoming deadlines
pub fn due_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("due")
        .description("Upcoming assignment and quiz deadlines")
        .dm_permission(true)
        .create_option(|option| {
            option
                .name("days")
                .description("How many days ahead to look (default 7)")
                .kind(CommandOptionType::Integer)
                .min_int_value(1)
                .max_int_value(MAX_DUE_DAYS)
                .required(false)
        })
        .create_option(|option| {
            option
                .name("show_submitted")
                .description("Also list items you have already submitted")
                .kind(CommandOptionType::Boolean)
                .required(false)
        });
    command
}

pub fn courses_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("courses")
        .description("List your active Canvas courses")
        .dm_permission(true);
    command
}

pub fn assignments_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("assignments")
        .description("Every assignment and quiz of one course")
        .dm_permission(true)
        .create_option(|option| {
            option
                .name("course")
                .description("Course number from /courses")
                .kind(CommandOptionType::Integer)
                .required(true)
        });
    command
}

pub fn files_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("files")
        .description("Browse a course's files")
        .dm_permission(true)
        .create_option(|option| {
            option
                .name("course")
                .description("Course number from /courses")
                .kind(CommandOptionType::Integer)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("folder")
                .description("Folder number (defaults to the top folder)")
                .kind(CommandOptionType::Integer)
                .required(false)
        });
    command
}

pub fn refresh_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("refresh")
        .description("Reload your course list from Canvas")
        .dm_permission(true);
    command
}
