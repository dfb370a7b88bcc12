use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::admin::{decide_ride, show_all_rides, show_analytics, show_dashboard};

pub fn build_admin_routers() -> Router<AppRegistry> {
    let admin_routers = Router::new()
        .route("/rides", get(show_all_rides))
        .route("/rides/:ride_id/action", post(decide_ride))
        .route("/analytics", get(show_analytics))
        .route("/dashboard", get(show_dashboard));

    Router::new().nest("/admin", admin_routers)
}
