pub mod about;
pub mod comments;
pub mod posts;
pub mod profiles;
pub mod users;

use crate::errors::Error;
use rocket::http::uri::Origin;
use rocket::response::Redirect;

/// Sends `/path/` to `/path`, keeping the query. Runs after every other GET
/// route has declined the request.
#[get("/<_..>", rank = 100)]
pub fn trailing_slash(origin: &Origin<'_>) -> Result<Redirect, Error> {
    let path = origin.path().as_str();
    if path.len() < 2 || !path.ends_with('/') {
        return Err(Error::NotFound);
    }

    let trimmed = path.trim_end_matches('/');
    let target = match origin.query() {
        Some(query) => format!("{}?{}", trimmed, query.as_str()),
        None => trimmed.to_string(),
    };
    Origin::parse_owned(target)
        .map(Redirect::moved)
        .map_err(|_| Error::NotFound)
}
