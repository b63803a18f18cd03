pub mod aggregator;
pub mod course_cache;
pub mod crypto;
pub mod dispatch;
pub mod errors;
pub mod fetcher;
pub mod link;
pub mod lms;
pub mod models;
pub mod overlay;
pub mod resolver;
pub mod scheduler;
pub mod store;
pub mod time;
