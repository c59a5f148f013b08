use crate::auth::Auth;
use crate::database::{self, Db};
use crate::errors::{non_blank, Error, FieldValidator};
use diesel::QueryResult;
use log::info;
use rocket::form::Form;
use rocket::http::uri::Origin;
use rocket::response::Redirect;

#[derive(FromForm, Validate)]
pub struct CommentForm {
    #[validate(length(max = 5000, message = "Ensure this value has at most 5000 characters."))]
    text: Option<String>,
}

/// Invalid comments are dropped; the reader lands back on the post either way.
#[post("/posts/<post_id>/comment", data = "<form>")]
pub async fn add_comment(
    post_id: Result<i32, &str>,
    auth: Option<Auth>,
    origin: &Origin<'_>,
    form: Form<CommentForm>,
    db: Db,
) -> Result<Redirect, Error> {
    let post_id = super::posts::parse_id(post_id)?;
    let auth = auth.ok_or_else(|| Error::login_required(origin))?;
    let form = form.into_inner();

    let mut extractor = FieldValidator::validate(&form);
    let text = extractor.extract("text", non_blank(form.text));
    let valid = extractor.check().is_ok();

    let author = auth.id;
    let created = db
        .run(move |conn| -> QueryResult<bool> {
            database::posts::find(conn, post_id)?;
            if valid {
                database::comments::create(conn, post_id, author, &text)?;
            }
            Ok(valid)
        })
        .await?;
    if created {
        info!("{} commented on post {}", auth.username, post_id);
    }

    Ok(Redirect::found(uri!(super::posts::post_detail(post_id))))
}
