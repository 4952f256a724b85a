use super::{handlers, state::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/generate", post(handlers::generate_handler))
        .route("/articles", get(handlers::list_articles_handler))
        .route(
            "/articles/{id}",
            get(handlers::get_article_handler).delete(handlers::delete_article_handler),
        )
        .route("/articles/{id}/publish", post(handlers::publish_handler))
        .route(
            "/articles/{id}/images/{index}",
            post(handlers::render_image_handler),
        )
        .route("/articles/{id}/video", post(handlers::attach_video_handler))
        .route("/video/search", post(handlers::video_search_handler))
        .route(
            "/settings",
            get(handlers::get_settings_handler).put(handlers::put_settings_handler),
        )
        .route(
            "/authors",
            get(handlers::list_authors_handler).post(handlers::save_author_handler),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
