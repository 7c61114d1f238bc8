use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/profile", profile_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn profile_routes() -> OpenApiRouter<AppState> {
    let profile = OpenApiRouter::new()
        .routes(routes!(handlers::profile::me))
        .routes(routes!(handlers::profile::upsert_profile))
        .routes(routes!(
            handlers::profile::download_file,
            handlers::profile::delete_file
        ));

    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::profile::upload_file))
        .layer(handlers::profile::upload_body_limit());

    profile.merge(upload)
}
