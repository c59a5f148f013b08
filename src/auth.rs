use crate::config::{AppState, SESSION_COOKIE, SESSION_DAYS};
use chrono::{Duration, Utc};
use jsonwebtoken as jwt;
use jwt::{DecodingKey, EncodingKey};
use log::debug;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::request::{self, FromRequest, Request};
use rocket::outcome::Outcome;
use serde::{Deserialize, Serialize};

/// Session claims stored in the `sessionid` cookie.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Auth {
    /// timestamp
    pub exp: i64,
    /// user id
    pub id: i32,
    pub username: String,
}

impl Auth {
    pub fn new(id: i32, username: &str) -> Auth {
        Auth {
            exp: (Utc::now() + Duration::days(SESSION_DAYS)).timestamp(),
            id,
            username: username.to_owned(),
        }
    }

    pub fn token(&self, secret: &[u8]) -> jwt::errors::Result<String> {
        jwt::encode(&jwt::Header::default(), self, &EncodingKey::from_secret(secret))
    }

    /// Starts a browser session for this user.
    pub fn login(&self, cookies: &CookieJar<'_>, secret: &[u8]) -> jwt::errors::Result<()> {
        let cookie = Cookie::build((SESSION_COOKIE, self.token(secret)?))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);
        cookies.add(cookie);
        Ok(())
    }

    pub fn logout(cookies: &CookieJar<'_>) {
        cookies.remove(Cookie::build(SESSION_COOKIE).path("/"));
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Auth {
    type Error = ();

    /// Extract Auth token from the session cookie.
    /// Handlers take `Option<Auth>`, so a missing or stale session forwards.
    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Auth, Self::Error> {
        let state = match request.rocket().state::<AppState>() {
            Some(state) => state,
            None => return Outcome::Error((Status::InternalServerError, ())),
        };
        match extract_auth_from_request(request, &state.secret) {
            Some(auth) => Outcome::Success(auth),
            None => Outcome::Forward(Status::Unauthorized),
        }
    }
}

fn extract_auth_from_request(request: &Request, secret: &[u8]) -> Option<Auth> {
    request
        .cookies()
        .get(SESSION_COOKIE)
        .and_then(|cookie| decode_token(cookie.value(), secret))
}

/// Decode token into `Auth` struct. If any error is encountered, log it
/// and return None.
fn decode_token(token: &str, secret: &[u8]) -> Option<Auth> {
    use jwt::{Algorithm, Validation};

    jwt::decode::<Auth>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|err| {
        debug!("Auth decode error: {:?}", err);
    })
    .ok()
    .map(|token_data| token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_claims() {
        let auth = Auth::new(7, "leo");
        let token = auth.token(b"secret").unwrap();
        let decoded = decode_token(&token, b"secret").unwrap();
        assert_eq!(decoded.id, 7);
        assert_eq!(decoded.username, "leo");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = Auth::new(7, "leo").token(b"secret").unwrap();
        assert!(decode_token(&token, b"another").is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut auth = Auth::new(7, "leo");
        auth.exp = (Utc::now() - Duration::days(1)).timestamp();
        let token = auth.token(b"secret").unwrap();
        assert!(decode_token(&token, b"secret").is_none());
    }
}
