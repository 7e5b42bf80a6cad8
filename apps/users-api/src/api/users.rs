use axum::Router;
use domain_users::{PgUserRepository, UserService, handlers};

use crate::state::{AppState, Storage};

pub fn router(state: &AppState) -> Router {
    match &state.storage {
        Storage::InMemory(repository) => handlers::router(UserService::new(repository.clone())),
        Storage::Postgres(db) => {
            handlers::router(UserService::new(PgUserRepository::new(db.clone())))
        }
    }
}
