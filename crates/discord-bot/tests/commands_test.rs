use std::collections::HashSet;

use duebot_discord_bot::commands::{all_commands, register_commands};
use pretty_assertions::assert_eq;
use serenity::builder::CreateApplicationCommands;

fn names() -> Vec<String> {
    all_commands()
        .iter()
        .filter_map(|command| command.0.get("name").and_then(|v| v.as_str()).map(str::to_string))
        .collect()
}

#[test]
fn test_every_command_is_registered_once() {
    let names = names();
    let unique: HashSet<&String> = names.iter().collect();

    assert_eq!(unique.len(), names.len());
    for expected in [
        "setup", "unlink", "due", "courses", "assignments", "files", "refresh", "reminder",
        "todo", "note", "help", "admin",
    ] {
        assert!(names.iter().any(|n| n == expected), "missing /{expected}");
    }
}

#[test]
fn test_register_commands() {
    let mut commands = CreateApplicationCommands::default();
    register_commands(&mut commands);

    assert_eq!(commands.0.len(), names().len());
}
