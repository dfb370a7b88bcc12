use axum::Router;
use registry::AppRegistry;

use super::{
    admin::build_admin_routers, auth::build_auth_routers, ride::build_ride_routers,
    simulation::build_simulation_routers, user::build_user_routers,
};

pub fn routes() -> Router<AppRegistry> {
    let router = Router::new()
        .merge(build_auth_routers())
        .merge(build_user_routers())
        .merge(build_ride_routers())
        .merge(build_admin_routers())
        .merge(build_simulation_routers());
    Router::new().nest("/api", router)
}
