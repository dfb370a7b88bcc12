use axum::{
    routing::{get, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::user::{
    change_password, show_profile, show_user, show_user_list, update_profile,
};

pub fn build_user_routers() -> Router<AppRegistry> {
    let user_routers = Router::new()
        .route("/profile", get(show_profile))
        .route("/profile", put(update_profile))
        .route("/change-password", put(change_password))
        .route("/:user_id", get(show_user))
        .route("/", get(show_user_list));

    Router::new().nest("/users", user_routers)
}
