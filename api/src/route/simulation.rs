use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::simulation::{bulk_complete_rides, complete_ride, show_eligible_rides};

pub fn build_simulation_routers() -> Router<AppRegistry> {
    let simulation_routers = Router::new()
        .route("/rides/eligible-for-completion", get(show_eligible_rides))
        .route("/rides/:ride_id/complete", post(complete_ride))
        .route("/rides/bulk-complete", post(bulk_complete_rides));

    Router::new().nest("/simulation", simulation_routers)
}
