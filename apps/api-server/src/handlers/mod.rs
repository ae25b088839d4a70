//! HTTP handlers and route configuration.

mod authors;
mod categories;
mod health;
mod posts;
mod slugs;
mod tags;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::middleware::extract::{json_config, path_config, query_config};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config());
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/byslug/{slug}", web::get().to(posts::get_by_slug))
                    .route("/{id}", web::get().to(posts::get))
                    .route("/{id}", web::put().to(posts::update))
                    .route("/{id}", web::delete().to(posts::delete))
                    .route("/{id}/published", web::post().to(posts::set_published))
                    .route(
                        "/{id}/toggle-published",
                        web::post().to(posts::toggle_published),
                    )
                    .route("/{id}/views", web::post().to(posts::increase_views)),
            )
            .service(
                web::scope("/authors")
                    .route("", web::get().to(authors::list))
                    .route("", web::post().to(authors::create))
                    .route("/pagination", web::get().to(authors::paged))
                    .route("/best/{limit}", web::get().to(authors::best))
                    .route("/{slug}/posts", web::get().to(authors::posts))
                    .route("/{id}", web::get().to(authors::get))
                    .route("/{id}", web::put().to(authors::update))
                    .route("/{id}", web::delete().to(authors::delete))
                    .route("/{id}/avatar", web::post().to(authors::set_avatar)),
            )
            .service(
                web::scope("/categories")
                    .route("", web::get().to(categories::list))
                    .route("", web::post().to(categories::create))
                    .route("/{slug}/posts", web::get().to(categories::posts))
                    .route("/{id}", web::get().to(categories::get))
                    .route("/{id}", web::put().to(categories::update))
                    .route("/{id}", web::delete().to(categories::delete)),
            )
            .service(
                web::scope("/tags")
                    .route("", web::get().to(tags::list))
                    .route("", web::post().to(tags::create))
                    .route("/{slug}/posts", web::get().to(tags::posts))
                    .route("/{id}", web::put().to(tags::update))
                    .route("/{id}", web::delete().to(tags::delete)),
            )
            .route("/slugs/{entity}/exists", web::get().to(slugs::exists)),
    );
}
