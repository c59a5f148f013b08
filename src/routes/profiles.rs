use crate::auth::Auth;
use crate::database::{self, Db};
use crate::errors::Error;
use diesel::QueryResult;
use log::info;
use rocket::http::uri::Origin;
use rocket::response::Redirect;
use rocket_dyn_templates::{context, Template};

#[get("/profile/<username>?<page>")]
pub async fn profile(
    username: String,
    page: Option<i64>,
    auth: Option<Auth>,
    db: Db,
) -> Result<Template, Error> {
    let viewer = auth.as_ref().map(|auth| auth.id);
    let (profile, page_obj) = db
        .run(move |conn| -> QueryResult<_> {
            let author = database::users::find_by_username(conn, &username)?;
            let page_obj = database::posts::by_author(conn, author.id, page)?;
            let following = match viewer {
                Some(viewer) => database::profiles::is_following(conn, viewer, author.id)?,
                None => false,
            };
            Ok((author.to_profile(page_obj.count, viewer, following), page_obj))
        })
        .await?;

    Ok(Template::render(
        "posts/profile",
        context! { viewer: auth, profile, page_obj },
    ))
}

async fn follow(username: String, auth: Option<Auth>, origin: &Origin<'_>, db: Db) -> Result<Redirect, Error> {
    let auth = auth.ok_or_else(|| Error::login_required(origin))?;
    let follower = auth.id;
    let name = username.clone();
    let created = db
        .run(move |conn| -> QueryResult<bool> {
            let author = database::users::find_by_username(conn, &name)?;
            database::profiles::follow(conn, follower, author.id)
        })
        .await?;
    if created {
        info!("{} follows {}", auth.username, username);
    }
    Ok(Redirect::found(uri!(profile(username, _))))
}

async fn unfollow(username: String, auth: Option<Auth>, origin: &Origin<'_>, db: Db) -> Result<Redirect, Error> {
    let auth = auth.ok_or_else(|| Error::login_required(origin))?;
    let follower = auth.id;
    let name = username.clone();
    let removed = db
        .run(move |conn| -> QueryResult<bool> {
            let author = database::users::find_by_username(conn, &name)?;
            database::profiles::unfollow(conn, follower, author.id)
        })
        .await?;
    if removed {
        info!("{} unfollowed {}", auth.username, username);
    }
    Ok(Redirect::found(uri!(profile(username, _))))
}

#[get("/profile/<username>/follow")]
pub async fn profile_follow(
    username: String,
    auth: Option<Auth>,
    origin: &Origin<'_>,
    db: Db,
) -> Result<Redirect, Error> {
    follow(username, auth, origin, db).await
}

#[post("/profile/<username>/follow")]
pub async fn profile_follow_form(
    username: String,
    auth: Option<Auth>,
    origin: &Origin<'_>,
    db: Db,
) -> Result<Redirect, Error> {
    follow(username, auth, origin, db).await
}

#[get("/profile/<username>/unfollow")]
pub async fn profile_unfollow(
    username: String,
    auth: Option<Auth>,
    origin: &Origin<'_>,
    db: Db,
) -> Result<Redirect, Error> {
    unfollow(username, auth, origin, db).await
}

#[delete("/profile/<username>/unfollow")]
pub async fn profile_unfollow_delete(
    username: String,
    auth: Option<Auth>,
    origin: &Origin<'_>,
    db: Db,
) -> Result<Redirect, Error> {
    unfollow(username, auth, origin, db).await
}

#[get("/follow?<page>")]
pub async fn follow_index(
    page: Option<i64>,
    auth: Option<Auth>,
    origin: &Origin<'_>,
    db: Db,
) -> Result<Template, Error> {
    let auth = auth.ok_or_else(|| Error::login_required(origin))?;
    let follower = auth.id;
    let page_obj = db
        .run(move |conn| database::posts::feed(conn, follower, page))
        .await?;

    Ok(Template::render(
        "posts/follow",
        context! { viewer: auth, page_obj },
    ))
}
