use serenity::builder::{CreateApplicationCommand, CreateApplicationCommands};

pub mod account;
pub mod admin;
pub mod deadlines;
pub mod personal;
pub mod reminder;

/// Every slash command the bot answers, in registration order.
pub fn all_commands() -> Vec<CreateApplicationCommand> {
    vec![
        account::setup_command(),
        account::unlink_command(),
        deadlines::due_command(),
        deadlines::courses_command(),
        deadlines::assignments_command(),
        deadlines::files_command(),
        deadlines::refresh_command(),
        reminder::reminder_command(),
        personal::todo_command(),
        personal::note_command(),
        account::help_command(),
        admin::admin_command(),
    ]
}

/// Register all commands for the bot.
pub fn register_commands(commands: &mut CreateApplicationCommands) -> &mut CreateApplicationCommands {
    for built in all_commands() {
        commands.add_application_command(built);
    }
    commands
}
