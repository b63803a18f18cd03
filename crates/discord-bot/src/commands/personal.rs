use serenity::{builder::CreateApplicationCommand, model::application::command::CommandOptionType};

/// Create command for managing todos
pub fn todo_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("todo")
        .description("Personal todo list")
        .dm_permission(true)
        // Add subcommand
        .create_option(|option| {
            option
                .name("add")
                .description("Add a todo")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("text")
                        .description("What needs doing")
                        .kind(CommandOptionType::String)
                        .required(true)
                })
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("course")
                        .description("Course number from /courses")
                        .kind(CommandOptionType::Integer)
                        .required(false)
                })
        })
        // List subcommand
        .create_option(|option| {
            option
                .name("list")
                .description("Show your todos")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("all")
                        .description("Include completed todos")
                        .kind(CommandOptionType::Boolean)
                        .required(false)
                })
        })
        // Done subcommand
        .create_option(|option| {
            option
                .name("done")
                .description("Mark a todo done, or not done again")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("id")
                        .description("Id shown in /todo list")
                        .kind(CommandOptionType::String)
                        .required(true)
                })
        })
        // Delete subcommand
        .create_option(|option| {
            option
                .name("delete")
                .description("Delete a todo")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("id")
                        .description("Id shown in /todo list")
                        .kind(CommandOptionType::String)
                        .required(true)
                })
        });
    command
}

/// Create command for managing notes
pub fn note_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("note")
        .description("Personal notes, general or attached to an assignment")
        .dm_permission(true)
        .create_option(|option| {
            option
                .name("add")
                .description("Save a note. With an item, replaces that item's note")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("text")
                        .description("Note text")
                        .kind(CommandOptionType::String)
                        .required(true)
                })
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("course")
                        .description("Course number from /courses")
                        .kind(CommandOptionType::Integer)
                        .required(false)
                })
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("item")
                        .description("Assignment or quiz number")
                        .kind(CommandOptionType::Integer)
                        .required(false)
                })
        })
        .create_option(|option| {
            option
                .name("list")
                .description("Show your notes")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("course")
                        .description("Only notes for this course")
                        .kind(CommandOptionType::Integer)
                        .required(false)
                })
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("kind")
                        .description("Which notes to show")
                        .kind(CommandOptionType::String)
                        .add_string_choice("All notes", "any")
                        .add_string_choice("Assignment notes", "item")
                        .add_string_choice("General notes", "general")
                        .required(false)
                })
        })
        .create_option(|option| {
            option
                .name("search")
                .description("Find notes containing some text")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("query")
                        .description("Text to look for")
                        .kind(CommandOptionType::String)
                        .required(true)
                })
        })
        .create_option(|option| {
            option
                .name("delete")
                .description("Delete a note")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("id")
                        .description("Id shown in /note list")
                        .kind(CommandOptionType::String)
                        .required(true)
                })
        });
    command
}
