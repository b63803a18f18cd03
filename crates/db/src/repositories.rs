pub mod credentials;
pub mod notes;
pub mod reminders;
pub mod todos;
pub mod users;
