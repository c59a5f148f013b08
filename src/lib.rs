#[macro_use]
extern crate rocket;
#[macro_use]
extern crate rocket_sync_db_pools;
#[macro_use]
extern crate diesel;
#[macro_use]
extern crate validator_derive;

pub mod auth;
pub mod cache;
pub mod config;
pub mod database;
mod errors;
pub mod media;
pub mod models;
mod routes;
pub mod schema;

use database::Db;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::error;
use rocket::fairing::{self, AdHoc};
use rocket::figment::Figment;
use rocket::fs::FileServer;
use rocket::{Build, Request, Rocket};
use rocket_dyn_templates::{context, Template};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[catch(404)]
fn not_found(req: &Request) -> Template {
    Template::render("core/404", context! { path: req.uri().path().to_string() })
}

#[catch(500)]
fn internal_error() -> Template {
    Template::render("core/500", context! {})
}

async fn run_migrations(rocket: Rocket<Build>) -> fairing::Result {
    let conn = match Db::get_one(&rocket).await {
        Some(conn) => conn,
        None => {
            error!("No database connection available for migrations");
            return Err(rocket);
        }
    };

    let migrated = conn
        .run(|c| {
            c.run_pending_migrations(MIGRATIONS)
                .map(|_| ())
                .map_err(|err| err.to_string())
        })
        .await;
    match migrated {
        Ok(()) => Ok(rocket),
        Err(err) => {
            error!("Failed to run database migrations: {}", err);
            Err(rocket)
        }
    }
}

/// Serves uploaded files from the configured media root.
async fn mount_media(rocket: Rocket<Build>) -> fairing::Result {
    let media_root = match rocket.state::<config::AppState>() {
        Some(state) => state.media_root.clone(),
        None => return Err(rocket),
    };
    if let Err(err) = rocket::tokio::fs::create_dir_all(&media_root).await {
        error!("Cannot create media root {}: {}", media_root.display(), err);
        return Err(rocket);
    }
    Ok(rocket.mount("/media", FileServer::from(media_root)))
}

/// Builds the application from an explicit configuration.
pub fn rocket_from(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .mount(
            "/",
            routes![
                routes::posts::index,
                routes::posts::group_posts,
                routes::posts::post_detail,
                routes::posts::post_create_page,
                routes::posts::post_create,
                routes::posts::post_edit_page,
                routes::posts::post_edit,
                routes::comments::add_comment,
                routes::profiles::profile,
                routes::profiles::profile_follow,
                routes::profiles::profile_follow_form,
                routes::profiles::profile_unfollow,
                routes::profiles::profile_unfollow_delete,
                routes::profiles::follow_index,
                routes::users::signup_page,
                routes::users::signup,
                routes::users::login_page,
                routes::users::login,
                routes::users::logout,
                routes::users::logout_form,
                routes::about::author,
                routes::about::tech,
                routes::trailing_slash,
            ],
        )
        .attach(Db::fairing())
        .attach(AdHoc::try_on_ignite("Run migrations", run_migrations))
        .attach(config::AppState::manage())
        .attach(cache::PageCache::manage())
        .attach(AdHoc::try_on_ignite("Media files", mount_media))
        .attach(Template::custom(|engines| {
            // Template names carry no extension, so match every name.
            engines.tera.autoescape_on(vec![""]);
        }))
        .register("/", catchers![not_found, internal_error])
}

pub fn rocket() -> Rocket<Build> {
    rocket_from(config::from_env())
}
