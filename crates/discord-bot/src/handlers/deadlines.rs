use duebot_core::{
    errors::{BotError, BotResult},
    models::{course::CourseId, user::UserId},
    time::to_local,
};

use crate::{commands::deadlines::MAX_DUE_DAYS, render, services::BotServices};

/// Handle the /due command
pub async fn due(
    services: &BotServices,
    user: UserId,
    days: Option<i64>,
    show_submitted: bool,
) -> BotResult<String> {
    let days = match days {
        Some(d) if (1..=MAX_DUE_DAYS).contains(&d) => Some(d as u32),
        Some(_) => {
            return Err(BotError::Validation(format!(
                "Number of days must be between 1 and {MAX_DUE_DAYS}."
            )));
        }
        None => None,
    };

    let view = services.aggregator.upcoming(user, days).await?;
    let now = to_local(services.clock.now());
    Ok(render::render_upcoming(&view, now, show_submitted))
}

pub async fn courses(services: &BotServices, user: UserId) -> BotResult<String> {
    let courses = services.aggregator.courses(user).await?;
    Ok(render::render_courses(&courses))
}

pub async fn assignments(services: &BotServices, user: UserId, course: CourseId) -> BotResult<String> {
    let view = services.aggregator.course_items(user, course).await?;
    let now = to_local(services.clock.now());
    Ok(render::render_course_items(&view, now))
}

pub async fn files(
    services: &BotServices,
    user: UserId,
    course: CourseId,
    folder: Option<i64>,
) -> BotResult<String> {
    let view = services.aggregator.folder(user, course, folder).await?;
    Ok(render::render_folder(&view))
}

pub async fn refresh(services: &BotServices, user: UserId) -> BotResult<String> {
    let courses = services.aggregator.refresh(user).await?;
    Ok(format!(
        "Course list refreshed: {} active course(s).",
        courses.len()
    ))
}
