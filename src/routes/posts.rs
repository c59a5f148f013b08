use crate::auth::Auth;
use crate::cache::PageCache;
use crate::config::AppState;
use crate::database::{self, Db};
use crate::errors::{non_blank, Error, FieldValidator, FormErrors};
use crate::media;
use diesel::QueryResult;
use log::{info, warn};
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::http::uri::Origin;
use rocket::response::{content::RawHtml, Redirect};
use rocket::{Either, State};
use rocket_dyn_templates::{context, Metadata, Template};
use serde::Serialize;

#[derive(FromForm, Validate)]
pub struct PostForm<'r> {
    #[validate(length(max = 20000, message = "Ensure this value has at most 20000 characters."))]
    text: Option<String>,
    group: Option<String>,
    image: Option<TempFile<'r>>,
    clear_image: bool,
}

/// What the form inputs show when (re)rendered.
#[derive(Debug, Default, Serialize)]
struct FormValues {
    text: String,
    group: Option<i32>,
    image_url: Option<String>,
}

struct Upload {
    name: String,
    bytes: Vec<u8>,
}

/// A post form that passed validation.
struct CleanPost {
    text: String,
    group_id: Option<i32>,
    image: Option<Upload>,
}

const INVALID_GROUP: &str =
    "Select a valid choice. That choice is not one of the available choices.";
const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

async fn clean(form: &PostForm<'_>, db: &Db) -> Result<Result<CleanPost, FormErrors>, Error> {
    let mut extractor = FieldValidator::validate(form);
    let text = extractor.extract("text", non_blank(form.text.clone()));

    let group_id = match non_blank(form.group.clone()) {
        None => None,
        Some(raw) => match raw.trim().parse::<i32>() {
            Ok(id) => {
                let group = db.run(move |conn| database::groups::find(conn, id)).await?;
                if group.is_none() {
                    extractor.add("group", "invalid_choice", INVALID_GROUP);
                }
                Some(id)
            }
            Err(_) => {
                extractor.add("group", "invalid_choice", INVALID_GROUP);
                None
            }
        },
    };

    let mut image = None;
    if let Some(file) = &form.image {
        if let Some(bytes) = media::read_upload(file).await? {
            match media::inspect(&bytes) {
                Some(format) => {
                    image = Some(Upload {
                        name: media::file_name(file.name(), format),
                        bytes,
                    })
                }
                None => {
                    warn!("rejected upload {:?}: not an image", file.name());
                    extractor.add("image", "invalid_image", INVALID_IMAGE);
                }
            }
        }
    }

    Ok(extractor.check().map(|()| CleanPost {
        text,
        group_id,
        image,
    }))
}

/// Post ids are integers; any other path segment names no post.
pub(super) fn parse_id(param: Result<i32, &str>) -> Result<i32, Error> {
    param.map_err(|_| Error::NotFound)
}

async fn store_image(state: &AppState, image: Option<Upload>) -> Result<Option<String>, Error> {
    match image {
        Some(upload) => Ok(Some(
            media::save(&state.media_root, &upload.name, &upload.bytes).await?,
        )),
        None => Ok(None),
    }
}

async fn render_form(
    db: &Db,
    auth: &Auth,
    post_id: Option<i32>,
    form: FormValues,
    errors: FormErrors,
) -> Result<Template, Error> {
    let groups = db.run(database::groups::all).await?;
    Ok(Template::render(
        "posts/create_post",
        context! {
            viewer: auth,
            is_edit: post_id.is_some(),
            post_id,
            groups,
            form,
            errors,
        },
    ))
}

#[get("/?<page>")]
pub async fn index(
    page: Option<i64>,
    auth: Option<Auth>,
    origin: &Origin<'_>,
    cache: &State<PageCache>,
    metadata: Metadata<'_>,
    db: Db,
) -> Result<RawHtml<String>, Error> {
    let key = PageCache::key(&origin.to_string(), auth.as_ref());
    if let Some(html) = cache.get(&key) {
        return Ok(RawHtml(html));
    }

    let page_obj = db
        .run(move |conn| database::posts::all(conn, page))
        .await?;
    let (_, html) = metadata
        .render("posts/index", context! { viewer: &auth, page_obj })
        .ok_or(Error::Template("posts/index"))?;
    cache.insert(key, html.clone());
    Ok(RawHtml(html))
}

#[get("/group/<slug>?<page>")]
pub async fn group_posts(
    slug: String,
    page: Option<i64>,
    auth: Option<Auth>,
    db: Db,
) -> Result<Template, Error> {
    let (group, page_obj) = db
        .run(move |conn| -> QueryResult<_> {
            let group = database::groups::find_by_slug(conn, &slug)?;
            let page_obj = database::posts::by_group(conn, group.id, page)?;
            Ok((group, page_obj))
        })
        .await?;

    Ok(Template::render(
        "posts/group_list",
        context! { viewer: auth, group, page_obj },
    ))
}

#[get("/posts/<post_id>")]
pub async fn post_detail(
    post_id: Result<i32, &str>,
    auth: Option<Auth>,
    db: Db,
) -> Result<Template, Error> {
    let post_id = parse_id(post_id)?;
    let (post, posts_count, comments) = db
        .run(move |conn| -> QueryResult<_> {
            let post = database::posts::find_one(conn, post_id)?;
            let posts_count = database::posts::count_by_author(conn, post.author.id)?;
            let comments = database::comments::find_by_post(conn, post_id)?;
            Ok((post, posts_count, comments))
        })
        .await?;

    let is_author = auth.as_ref().map_or(false, |auth| auth.id == post.author.id);
    Ok(Template::render(
        "posts/post_detail",
        context! {
            viewer: auth,
            is_author,
            post,
            posts_count,
            comments,
        },
    ))
}

#[get("/create")]
pub async fn post_create_page(
    auth: Option<Auth>,
    origin: &Origin<'_>,
    db: Db,
) -> Result<Template, Error> {
    let auth = auth.ok_or_else(|| Error::login_required(origin))?;
    render_form(&db, &auth, None, FormValues::default(), FormErrors::default()).await
}

#[post("/create", data = "<form>")]
pub async fn post_create(
    auth: Option<Auth>,
    origin: &Origin<'_>,
    form: Form<PostForm<'_>>,
    state: &State<AppState>,
    db: Db,
) -> Result<Either<Redirect, Template>, Error> {
    let auth = auth.ok_or_else(|| Error::login_required(origin))?;

    let cleaned = match clean(&form, &db).await? {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            let values = FormValues {
                text: form.text.clone().unwrap_or_default(),
                group: form.group.as_deref().and_then(|g| g.parse().ok()),
                image_url: None,
            };
            return render_form(&db, &auth, None, values, errors)
                .await
                .map(Either::Right);
        }
    };

    let image = store_image(state, cleaned.image).await?;
    let author = auth.id;
    let post = db
        .run(move |conn| {
            database::posts::create(
                conn,
                author,
                &cleaned.text,
                cleaned.group_id,
                image.as_deref(),
            )
        })
        .await?;
    info!("{} published post {}", auth.username, post.id);

    Ok(Either::Left(Redirect::found(uri!(
        super::profiles::profile(auth.username, _)
    ))))
}

#[get("/posts/<post_id>/edit")]
pub async fn post_edit_page(
    post_id: Result<i32, &str>,
    auth: Option<Auth>,
    origin: &Origin<'_>,
    db: Db,
) -> Result<Either<Redirect, Template>, Error> {
    let post_id = parse_id(post_id)?;
    let auth = auth.ok_or_else(|| Error::login_required(origin))?;
    let post = db
        .run(move |conn| database::posts::find(conn, post_id))
        .await?;
    if post.author != auth.id {
        return Ok(Either::Left(Redirect::found(uri!(post_detail(post_id)))));
    }

    let values = FormValues {
        text: post.text,
        group: post.group_id,
        image_url: post.image.as_deref().map(media::url),
    };
    render_form(&db, &auth, Some(post_id), values, FormErrors::default())
        .await
        .map(Either::Right)
}

#[post("/posts/<post_id>/edit", data = "<form>")]
pub async fn post_edit(
    post_id: Result<i32, &str>,
    auth: Option<Auth>,
    origin: &Origin<'_>,
    form: Form<PostForm<'_>>,
    state: &State<AppState>,
    db: Db,
) -> Result<Either<Redirect, Template>, Error> {
    let post_id = parse_id(post_id)?;
    let auth = auth.ok_or_else(|| Error::login_required(origin))?;
    let post = db
        .run(move |conn| database::posts::find(conn, post_id))
        .await?;
    if post.author != auth.id {
        return Ok(Either::Left(Redirect::found(uri!(post_detail(post_id)))));
    }

    let cleaned = match clean(&form, &db).await? {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            let values = FormValues {
                text: form.text.clone().unwrap_or_default(),
                group: form.group.as_deref().and_then(|g| g.parse().ok()),
                image_url: post.image.as_deref().map(media::url),
            };
            return render_form(&db, &auth, Some(post_id), values, errors)
                .await
                .map(Either::Right);
        }
    };

    let image = match store_image(state, cleaned.image).await? {
        Some(path) => Some(Some(path)),
        None if form.clear_image => Some(None),
        None => None,
    };
    let data = database::posts::UpdatePostData {
        text: Some(cleaned.text),
        group_id: Some(cleaned.group_id),
        image,
    };
    db.run(move |conn| database::posts::update(conn, post_id, &data))
        .await?;
    info!("{} edited post {}", auth.username, post_id);

    Ok(Either::Left(Redirect::found(uri!(post_detail(post_id)))))
}
