//! Turns core view data into Discord message text.
//!
//! Everything user-supplied or LMS-supplied goes through [`escape_markdown`]
//! before it lands in a message, and every message is capped with
//! [`truncate`].

use chrono::{DateTime, FixedOffset};
use duebot_core::models::{
    course::CourseMap,
    item::Item,
    user::ReminderSetting,
    view::{AdminStats, CourseItemsView, FolderView, NoteGroup, ReminderView, TodoGroup, UpcomingView, View},
};
use uuid::Uuid;

pub const MESSAGE_LIMIT: usize = 2000;
pub const TRUNCATION_SUFFIX: &str = "\n...message truncated";
/// Length of the id prefix shown next to todos and notes.
pub const SHORT_ID_LENGTH: usize = 8;
const ZONE_LABEL: &str = "SGT";

pub const HELP_TEXT: &str = "\
**DueBot** tracks your Canvas deadlines and keeps personal todos and notes.

**Canvas**
`/due [days]` upcoming deadlines (default 7)
`/courses` your active courses
`/assignments <course>` every assignment and quiz of a course
`/files <course> [folder]` browse course files
`/refresh` reload your course list

**Reminders**
`/reminder show|set|off` daily summary of what is due in the next 48 hours (SGT)

**Personal**
`/todo add|list|done|delete`
`/note add|list|search|delete`

**Account**
`/setup` link or replace your Canvas token
`/unlink` remove your Canvas token (todos and notes stay)";

/// Backslash-escape Discord markdown control characters.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '~' | '`' | '|' | '>' | '#' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Cap a message at [`MESSAGE_LIMIT`] characters, marking the cut.
pub fn truncate(text: &str) -> String {
    if text.chars().count() <= MESSAGE_LIMIT {
        return text.to_string();
    }
    let keep = MESSAGE_LIMIT - TRUNCATION_SUFFIX.chars().count();
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_SUFFIX);
    truncated
}

pub fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..SHORT_ID_LENGTH].to_string()
}

pub fn format_timestamp(ts: DateTime<FixedOffset>) -> String {
    format!("{} {ZONE_LABEL}", ts.format("%d %b %H:%M"))
}

/// Due date relative to `now`, e.g. `Due in 3h (12:00 SGT)`.
pub fn format_due(due: Option<DateTime<FixedOffset>>, now: DateTime<FixedOffset>) -> String {
    let Some(due) = due else {
        return "No due date".to_string();
    };
    let diff = due - now;
    if diff.num_seconds() < 0 {
        return format!("OVERDUE ({})", format_timestamp(due));
    }
    match diff.num_days() {
        0 if diff.num_minutes() < 60 => {
            format!("Due in {}m ({} {ZONE_LABEL})", diff.num_minutes(), due.format("%H:%M"))
        }
        0 => format!("Due in {}h ({} {ZONE_LABEL})", diff.num_hours(), due.format("%H:%M")),
        days => format!("Due in {days}d ({})", format_timestamp(due)),
    }
}

pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let size = bytes as f64;
    if size < KB {
        format!("{bytes} B")
    } else if size < KB * KB {
        format!("{:.1} KB", size / KB)
    } else if size < KB * KB * KB {
        format!("{:.1} MB", size / (KB * KB))
    } else {
        format!("{:.1} GB", size / (KB * KB * KB))
    }
}

fn linked_title(title: &str, url: &str) -> String {
    if url.is_empty() {
        format!("**{}**", escape_markdown(title))
    } else {
        format!("[{}](<{}>)", escape_markdown(title), url)
    }
}

fn item_lines(item: &Item, now: DateTime<FixedOffset>) -> String {
    format!(
        "{} {}\n  {} | {}",
        item.kind.marker(),
        linked_title(&item.title, &item.html_url),
        escape_markdown(&item.course_name),
        format_due(item.due_at, now)
    )
}

pub fn render_upcoming(view: &UpcomingView, now: DateTime<FixedOffset>, show_submitted: bool) -> String {
    if view.is_empty() {
        return format!("No assignments due in the next {} days!", view.window_days);
    }

    let mut lines = vec![format!("**Upcoming deadlines ({} days)**", view.window_days)];
    if view.pending.is_empty() {
        lines.push("_All items have been submitted!_".to_string());
    }
    lines.extend(view.pending.iter().map(|item| item_lines(item, now)));

    if !view.submitted.is_empty() {
        if show_submitted {
            lines.push("\n**Submitted**".to_string());
            lines.extend(view.submitted.iter().map(|item| item_lines(item, now)));
        } else {
            lines.push(format!("_{} submitted item(s) hidden_", view.submitted.len()));
        }
    }
    truncate(&lines.join("\n"))
}

pub fn render_reminder(view: &ReminderView) -> String {
    let mut lines = vec!["**Reminder: upcoming deadlines!**".to_string()];
    for item in &view.items {
        lines.push(format!(
            "{} {} ({})\n  Due: {}",
            item.kind.marker(),
            linked_title(&item.title, &item.html_url),
            escape_markdown(&item.course_name),
            item.due_at.map(format_timestamp).unwrap_or_else(|| "No due date".to_string())
        ));
    }
    truncate(&lines.join("\n"))
}

/// Text for a message the core pushes outside of a command reply.
pub fn render_view(view: &View) -> String {
    match view {
        View::Reminder(reminder) => render_reminder(reminder),
        View::TokenExpired => "Your Canvas token has expired or is invalid. Run /setup to add a new one \
             (your notes, todos and reminder settings are kept)."
            .to_string(),
        View::Linked { course_count } => format!(
            "Canvas token verified and saved! Found {course_count} active course(s).\n\n\
             Try /due or /courses to see your work. Run /setup again to replace the token \
             or /unlink to remove it."
        ),
        View::Broadcast(message) => truncate(&format!("**Announcement**\n{message}")),
    }
}

pub fn render_courses(courses: &CourseMap) -> String {
    if courses.is_empty() {
        return "You have no active courses.".to_string();
    }
    let mut lines = vec!["**Your courses**".to_string()];
    lines.extend(
        courses
            .courses()
            .iter()
            .map(|c| format!("`{}` {}", c.id, escape_markdown(&c.name))),
    );
    lines.push("\nUse the number with /assignments or /files.".to_string());
    truncate(&lines.join("\n"))
}

pub fn render_course_items(view: &CourseItemsView, now: DateTime<FixedOffset>) -> String {
    let name = view.course_name.as_deref().unwrap_or("Course");
    if view.items.is_empty() {
        return format!("**{}**\nNo assignments or quizzes found for this course.", escape_markdown(name));
    }

    let mut lines = vec![format!("**{}**", escape_markdown(name))];
    for item in &view.items {
        let points = item
            .points_possible
            .map(|p| format!(" | {p} pts"))
            .unwrap_or_default();
        let extra = format!("{}{points}", item.status_text);
        lines.push(format!(
            "{} {}\n  {} | {}",
            item.kind.marker(),
            linked_title(&item.title, &item.html_url),
            format_due(item.due_at, now),
            escape_markdown(&extra)
        ));
    }
    truncate(&lines.join("\n"))
}

pub fn render_folder(view: &FolderView) -> String {
    let name = view.course_name.as_deref().unwrap_or("Course");
    let mut lines = vec![format!("**Files: {}**", escape_markdown(name))];

    for folder in &view.subfolders {
        lines.push(format!("`{}` {}/", folder.id, escape_markdown(&folder.name)));
    }
    for file in &view.files {
        lines.push(format!(
            "[{}](<{}>) ({})",
            escape_markdown(&file.name),
            file.url,
            format_size(file.size)
        ));
    }
    if view.subfolders.is_empty() && view.files.is_empty() {
        lines.push("This folder is empty.".to_string());
    }
    if view.total_files > view.files.len() {
        lines.push(format!("_Showing {} of {} files_", view.files.len(), view.total_files));
    }
    if !view.subfolders.is_empty() {
        lines.push(format!(
            "\nOpen a subfolder with /files course:{} folder:<number>.",
            view.course_id
        ));
    }
    truncate(&lines.join("\n"))
}

fn group_heading(course_id: Option<i64>, course_name: Option<&str>) -> String {
    match (course_id, course_name) {
        (_, Some(name)) => format!("**{}**", escape_markdown(name)),
        (Some(id), None) => format!("**Course {id}**"),
        (None, None) => "**Uncategorised**".to_string(),
    }
}

pub fn render_todos(groups: &[TodoGroup]) -> String {
    if groups.is_empty() {
        return "No todos yet. Add one with /todo add.".to_string();
    }
    let mut lines = Vec::new();
    for group in groups {
        lines.push(group_heading(group.course_id, group.course_name.as_deref()));
        for todo in &group.todos {
            let mark = if todo.done { "[x]" } else { "[ ]" };
            lines.push(format!("{mark} `{}` {}", short_id(todo.id), escape_markdown(&todo.text)));
        }
    }
    truncate(&lines.join("\n"))
}

pub fn render_notes(groups: &[NoteGroup]) -> String {
    if groups.is_empty() {
        return "No notes found.".to_string();
    }
    let mut lines = Vec::new();
    for group in groups {
        lines.push(group_heading(group.course_id, group.course_name.as_deref()));
        for note in &group.notes {
            let item = note
                .item_id
                .map(|id| format!(" (item {id})"))
                .unwrap_or_default();
            lines.push(format!(
                "`{}`{item} {}\n  _updated {}_",
                short_id(note.id),
                escape_markdown(&note.text),
                format_timestamp(duebot_core::time::to_local(note.updated_at))
            ));
        }
    }
    truncate(&lines.join("\n"))
}

pub fn render_reminder_setting(setting: Option<&ReminderSetting>) -> String {
    match setting {
        Some(s) if s.enabled => format!(
            "Daily reminder is on at {:02}:00 {ZONE_LABEL}. It lists pending work due in the next 48 hours.",
            s.hour
        ),
        Some(_) => "Daily reminder is off. Turn it on with /reminder set.".to_string(),
        None => "No reminder set. Use /reminder set to choose an hour (0-23).".to_string(),
    }
}

pub fn render_stats(stats: &AdminStats) -> String {
    format!(
        "**Bot statistics**\nUsers: {}\nLinked: {}\nReminders enabled: {}\nNotes: {}\nTodos: {} ({} done)",
        stats.users, stats.linked, stats.reminders_enabled, stats.notes, stats.todos, stats.todos_done
    )
}
