use axum::{
    routing::{delete, get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::ride::{
    cancel_ride, register_ride, show_my_rides, show_ride, update_ride,
};

pub fn build_ride_routers() -> Router<AppRegistry> {
    let ride_routers = Router::new()
        .route("/", post(register_ride))
        .route("/my-rides", get(show_my_rides))
        .route("/:ride_id", get(show_ride))
        .route("/:ride_id", put(update_ride))
        .route("/:ride_id", delete(cancel_ride));

    Router::new().nest("/rides", ride_routers)
}
