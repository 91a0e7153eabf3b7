use axum::Router;

use crate::state::AppState;

pub(crate) mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::profile_routes())
        .merge(handlers::admin_routes())
}
