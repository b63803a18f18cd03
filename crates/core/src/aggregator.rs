//! Deadline Aggregator: the entry point for every LMS-backed view.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    course_cache::CourseCache,
    errors::{BotError, BotResult},
    fetcher::{FetchScope, ItemFetcher},
    lms::{LmsApi, LmsError},
    models::{
        course::{CourseId, CourseMap},
        item::{Item, SubmissionState},
        user::{AccessToken, UserId},
        view::{CourseItemsView, FileView, FolderView, ReminderView, UpcomingView},
    },
    store::CredentialStore,
    time::{Clock, Window, to_local},
};

pub const DEFAULT_WINDOW_DAYS: u32 = 7;
pub const REMINDER_WINDOW_HOURS: u32 = 48;
pub const MAX_FOLDER_FILES: usize = 15;

/// Order by due date, then course id, then title. Undated items go last.
pub fn order_items(items: &mut [Item]) {
    items.sort_by(|a, b| {
        a.due_at
            .is_none()
            .cmp(&b.due_at.is_none())
            .then(a.due_at.cmp(&b.due_at))
            .then(a.course_id.cmp(&b.course_id))
            .then_with(|| a.title.cmp(&b.title))
            .then(a.id.cmp(&b.id))
    });
}

pub struct Aggregator {
    credentials: Arc<dyn CredentialStore>,
    cache: Arc<CourseCache>,
    fetcher: ItemFetcher,
    lms: Arc<dyn LmsApi>,
    clock: Arc<dyn Clock>,
}

impl Aggregator {
    pub fn new(
        lms: Arc<dyn LmsApi>,
        credentials: Arc<dyn CredentialStore>,
        cache: Arc<CourseCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            cache,
            fetcher: ItemFetcher::new(Arc::clone(&lms)),
            lms,
            clock,
        }
    }

    /// Decrypted token for `user`. Never touches the LMS.
    async fn token(&self, user: UserId) -> BotResult<AccessToken> {
        match self.credentials.get(user).await? {
            None => Err(BotError::NotLinked),
            Some(credential) if !credential.is_valid() => Err(BotError::AuthExpired),
            Some(credential) => Ok(credential.token),
        }
    }

    /// Flip the credential to invalid when the LMS rejected it.
    async fn settle<T>(&self, user: UserId, operation: &str, result: BotResult<T>) -> BotResult<T> {
        if let Err(BotError::AuthExpired) = &result {
            warn!(user_id = %user, operation, "LMS rejected credential, marking invalid");
            self.credentials.mark_invalid(user).await?;
        }
        result
    }

    async fn fetch(&self, user: UserId, operation: &str, scope: FetchScope) -> BotResult<Vec<Item>> {
        let token = self.token(user).await?;
        let result = async {
            let courses = self.cache.get(user, &token).await?;
            self.fetcher.fetch(&token, courses.courses(), scope).await
        }
        .await;
        self.settle(user, operation, result).await
    }

    /// Items due in `[now, now + days)`, split into pending and submitted.
    pub async fn upcoming(&self, user: UserId, days: Option<u32>) -> BotResult<UpcomingView> {
        let days = days.unwrap_or(DEFAULT_WINDOW_DAYS);
        if days == 0 {
            return Err(BotError::Validation(
                "Number of days must be a positive whole number.".to_string(),
            ));
        }

        let window = Window::days(self.clock.now(), days);
        let items = self.fetch(user, "upcoming", FetchScope::DueWithin(window)).await?;

        let (mut submitted, mut pending): (Vec<Item>, Vec<Item>) = items
            .into_iter()
            .filter(|item| item.due_at.is_some_and(|due| window.contains(due)))
            .partition(|item| item.submission.is_submitted());
        order_items(&mut pending);
        order_items(&mut submitted);

        info!(user_id = %user, days, pending = pending.len(), submitted = submitted.len(), "Computed upcoming deadlines");
        Ok(UpcomingView {
            window_days: days,
            pending,
            submitted,
        })
    }

    /// Not-submitted items due within the next 48 hours. Items that take no
    /// submission are left out.
    pub async fn due_for_reminder(&self, user: UserId) -> BotResult<ReminderView> {
        let now = self.clock.now();
        let window = Window::hours(now, REMINDER_WINDOW_HOURS);
        let mut items: Vec<Item> = self
            .fetch(user, "reminder", FetchScope::DueWithin(window))
            .await?
            .into_iter()
            .filter(|item| item.submission == SubmissionState::NotSubmitted)
            .filter(|item| item.due_at.is_some_and(|due| window.contains(due)))
            .collect();
        order_items(&mut items);

        Ok(ReminderView {
            generated_at: to_local(now),
            items,
        })
    }

    pub async fn courses(&self, user: UserId) -> BotResult<Arc<CourseMap>> {
        let token = self.token(user).await?;
        let result = self.cache.get(user, &token).await;
        self.settle(user, "courses", result).await
    }

    /// Drop the cached course list and fetch it again.
    pub async fn refresh(&self, user: UserId) -> BotResult<Arc<CourseMap>> {
        self.cache.invalidate(user).await;
        self.courses(user).await
    }

    /// Every assignment and quiz of one course, dated items first.
    pub async fn course_items(&self, user: UserId, course_id: CourseId) -> BotResult<CourseItemsView> {
        let token = self.token(user).await?;
        let result = async {
            let courses = self.cache.get(user, &token).await?;
            let course = courses
                .courses()
                .iter()
                .find(|c| c.id == course_id)
                .cloned()
                .ok_or_else(|| BotError::NotFound("Course".to_string()))?;
            let items = self
                .fetcher
                .fetch(&token, std::slice::from_ref(&course), FetchScope::All)
                .await?;
            Ok::<_, BotError>((course, items))
        }
        .await;
        let (course, mut items) = self.settle(user, "course_items", result).await?;
        order_items(&mut items);

        Ok(CourseItemsView {
            course_id,
            course_name: Some(course.name),
            items,
        })
    }

    /// Subfolders and the first files of a course folder (the root folder
    /// when `folder_id` is `None`).
    pub async fn folder(
        &self,
        user: UserId,
        course_id: CourseId,
        folder_id: Option<i64>,
    ) -> BotResult<FolderView> {
        let token = self.token(user).await?;
        let result = async {
            let folder_id = match folder_id {
                Some(id) => id,
                None => self.lms.root_folder(&token, course_id).await.map_err(folder_error)?.id,
            };
            let (subfolders, files) = tokio::join!(
                self.lms.subfolders(&token, folder_id),
                self.lms.folder_files(&token, folder_id),
            );
            let subfolders = subfolders.map_err(folder_error)?;
            let files = files.map_err(folder_error)?;
            let course_name = self
                .cache
                .get(user, &token)
                .await?
                .name_of(course_id)
                .map(str::to_string);
            Ok::<_, BotError>((folder_id, course_name, subfolders, files))
        }
        .await;
        let (folder_id, course_name, subfolders, files) =
            self.settle(user, "folder", result).await?;

        let total_files = files.len();
        let files = files
            .iter()
            .take(MAX_FOLDER_FILES)
            .map(|file| FileView::from_raw(file, self.lms.file_url(course_id, file.id)))
            .collect();

        Ok(FolderView {
            course_id,
            course_name,
            folder_id,
            subfolders,
            files,
            total_files,
        })
    }
}

fn folder_error(err: LmsError) -> BotError {
    match err {
        LmsError::Unsupported(_) => BotError::NotFound("Folder".to_string()),
        other => other.into(),
    }
}
