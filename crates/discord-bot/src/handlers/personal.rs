use duebot_core::{
    errors::{BotError, BotResult},
    models::{
        course::{CourseId, CourseMap},
        item::ItemId,
        overlay::{NewNote, NoteFilter, NoteKind},
        user::UserId,
    },
};
use std::sync::Arc;
use uuid::Uuid;

use super::options::Options;
use crate::{
    render::{self, escape_markdown, short_id},
    services::BotServices,
};

const MIN_ID_PREFIX: usize = 4;

/// Match a typed id prefix against the ids the user owns.
pub fn resolve_id(ids: impl IntoIterator<Item = Uuid>, given: &str, what: &str) -> BotResult<Uuid> {
    let needle: String = given
        .trim()
        .chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if needle.len() < MIN_ID_PREFIX {
        return Err(BotError::Validation(format!(
            "Use the {what} id shown in the list (at least {MIN_ID_PREFIX} characters)."
        )));
    }

    let matches: Vec<Uuid> = ids
        .into_iter()
        .filter(|id| id.simple().to_string().starts_with(&needle))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(BotError::NotFound(what.to_string())),
        _ => Err(BotError::Validation(format!(
            "That id matches more than one {}. Type more characters.",
            what.to_lowercase()
        ))),
    }
}

/// Course names for grouping. Listing still works when Canvas cannot be
/// reached or the user is not linked.
async fn course_names(services: &BotServices, user: UserId) -> Option<Arc<CourseMap>> {
    services.aggregator.courses(user).await.ok()
}

/// Handle the /todo command
pub async fn handle_todo(
    services: &BotServices,
    user: UserId,
    (subcommand, options): (&str, Options<'_>),
) -> BotResult<String> {
    match subcommand {
        "add" => add_todo(services, user, options.require_string("text")?, options.integer("course")).await,
        "list" => list_todos(services, user, options.boolean("all").unwrap_or(false)).await,
        "done" => toggle_todo(services, user, options.require_string("id")?).await,
        "delete" => delete_todo(services, user, options.require_string("id")?).await,
        other => Err(BotError::NotFound(format!("Subcommand {other}"))),
    }
}

pub async fn add_todo(
    services: &BotServices,
    user: UserId,
    text: &str,
    course: Option<CourseId>,
) -> BotResult<String> {
    let todo = services.overlay.add_todo(user, course, text).await?;
    Ok(format!("Todo added: `{}` {}", short_id(todo.id), escape_markdown(&todo.text)))
}

pub async fn list_todos(services: &BotServices, user: UserId, include_done: bool) -> BotResult<String> {
    let names = course_names(services, user).await;
    let groups = services
        .overlay
        .todos(user, include_done, names.as_deref())
        .await?;
    Ok(render::render_todos(&groups))
}

async fn todo_id(services: &BotServices, user: UserId, given: &str) -> BotResult<Uuid> {
    let todos = services.overlay.todos(user, true, None).await?;
    let ids = todos.iter().flat_map(|g| g.todos.iter().map(|t| t.id));
    resolve_id(ids, given, "Todo")
}

pub async fn toggle_todo(services: &BotServices, user: UserId, given: &str) -> BotResult<String> {
    let id = todo_id(services, user, given).await?;
    let todo = services.overlay.toggle_todo(user, id).await?;
    let state = if todo.done { "done" } else { "not done" };
    Ok(format!("Marked {state}: {}", escape_markdown(&todo.text)))
}

pub async fn delete_todo(services: &BotServices, user: UserId, given: &str) -> BotResult<String> {
    let id = todo_id(services, user, given).await?;
    services.overlay.delete_todo(user, id).await?;
    Ok("Todo deleted.".to_string())
}

/// Handle the /note command
pub async fn handle_note(
    services: &BotServices,
    user: UserId,
    (subcommand, options): (&str, Options<'_>),
) -> BotResult<String> {
    match subcommand {
        "add" => {
            add_note(
                services,
                user,
                options.require_string("text")?,
                options.integer("course"),
                options.integer("item"),
            )
            .await
        }
        "list" => {
            let kind = match options.string("kind") {
                Some("item") => NoteKind::ItemNotes,
                Some("general") => NoteKind::General,
                _ => NoteKind::Any,
            };
            let filter = NoteFilter {
                course_id: options.integer("course"),
                kind,
                query: None,
            };
            list_notes(services, user, &filter).await
        }
        "search" => {
            let filter = NoteFilter {
                query: Some(options.require_string("query")?.to_string()),
                ..NoteFilter::default()
            };
            list_notes(services, user, &filter).await
        }
        "delete" => delete_note(services, user, options.require_string("id")?).await,
        other => Err(BotError::NotFound(format!("Subcommand {other}"))),
    }
}

pub async fn add_note(
    services: &BotServices,
    user: UserId,
    text: &str,
    course: Option<CourseId>,
    item: Option<ItemId>,
) -> BotResult<String> {
    let note = services
        .overlay
        .save_note(
            user,
            NewNote {
                course_id: course,
                item_id: item,
                text: text.to_string(),
            },
        )
        .await?;
    let what = match note.item_id {
        Some(item) => format!("Note saved for item {item}"),
        None => "Note saved".to_string(),
    };
    Ok(format!("{what}: `{}`", short_id(note.id)))
}

pub async fn list_notes(services: &BotServices, user: UserId, filter: &NoteFilter) -> BotResult<String> {
    let names = course_names(services, user).await;
    let groups = services.overlay.notes(user, filter, names.as_deref()).await?;
    Ok(render::render_notes(&groups))
}

pub async fn delete_note(services: &BotServices, user: UserId, given: &str) -> BotResult<String> {
    let notes = services
        .overlay
        .notes(user, &NoteFilter::default(), None)
        .await?;
    let ids = notes.iter().flat_map(|g| g.notes.iter().map(|n| n.id));
    let id = resolve_id(ids, given, "Note")?;
    services.overlay.delete_note(user, id).await?;
    Ok("Note deleted.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> Uuid {
        Uuid::parse_str(raw).unwrap()
    }

    #[test]
    fn test_resolve_id_by_prefix() {
        let ids = [
            id("4f1c2a9e-0000-4000-8000-000000000001"),
            id("4f1d0000-0000-4000-8000-000000000002"),
        ];

        assert_eq!(resolve_id(ids, "4F1C2A9E", "Todo").unwrap(), ids[0]);
        assert_eq!(resolve_id(ids, "4f1d", "Todo").unwrap(), ids[1]);
    }

    #[test]
    fn test_resolve_id_rejects_ambiguous_and_short() {
        let ids = [
            id("4f1c2a9e-0000-4000-8000-000000000001"),
            id("4f1c2b00-0000-4000-8000-000000000002"),
        ];

        assert!(matches!(resolve_id(ids, "4f1c", "Todo"), Err(BotError::Validation(_))));
        assert!(matches!(resolve_id(ids, "4f", "Todo"), Err(BotError::Validation(_))));
        assert!(matches!(resolve_id(ids, "ffff", "Todo"), Err(BotError::NotFound(_))));
    }
}
