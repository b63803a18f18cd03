use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/link", get(handlers::link::link_page))
        .route("/link/submit", post(handlers::link::submit_link))
}
