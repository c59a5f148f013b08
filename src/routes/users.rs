use crate::auth::Auth;
use crate::config::AppState;
use crate::database::users::{Registration, UserCreationError};
use crate::database::{self, Db};
use crate::errors::{non_blank, Error, FieldValidator, FormErrors};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use rocket::form::Form;
use rocket::http::uri::Origin;
use rocket::http::CookieJar;
use rocket::response::Redirect;
use rocket::{Either, State};
use rocket_dyn_templates::{context, Template};
use serde::Serialize;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern compiles"));

#[derive(FromForm, Validate)]
pub struct SignupForm {
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    first_name: Option<String>,
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    last_name: Option<String>,
    #[validate(
        length(max = 150, message = "Ensure this value has at most 150 characters."),
        regex(
            path = "USERNAME_RE",
            message = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
        )
    )]
    username: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    email: Option<String>,
    #[validate(length(
        min = 8,
        message = "This password is too short. It must contain at least 8 characters."
    ))]
    password1: Option<String>,
    password2: Option<String>,
}

impl SignupForm {
    fn normalize(mut self) -> Self {
        self.first_name = non_blank(self.first_name).map(|v| v.trim().to_string());
        self.last_name = non_blank(self.last_name).map(|v| v.trim().to_string());
        self.username = non_blank(self.username).map(|v| v.trim().to_string());
        self.email = non_blank(self.email).map(|v| v.trim().to_string());
        self.password1 = non_blank(self.password1);
        self.password2 = non_blank(self.password2);
        self
    }
}

/// Signup values echoed back into the form; passwords never are.
#[derive(Debug, Default, Serialize)]
struct SignupValues {
    first_name: String,
    last_name: String,
    username: String,
    email: String,
}

#[derive(FromForm)]
pub struct LoginForm {
    username: Option<String>,
    password: Option<String>,
    next: Option<String>,
}

const DUPLICATED_USERNAME: &str = "A user with that username already exists.";
const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Only same-site paths are followed after login.
fn local_redirect(next: Option<&str>) -> Option<Redirect> {
    let next = next?;
    if !next.starts_with('/') || next.starts_with("//") {
        return None;
    }
    Origin::parse_owned(next.to_string())
        .ok()
        .map(Redirect::found)
}

#[get("/auth/signup")]
pub fn signup_page(auth: Option<Auth>) -> Template {
    Template::render(
        "users/signup",
        context! {
            viewer: auth,
            form: SignupValues::default(),
            errors: FormErrors::default(),
        },
    )
}

#[post("/auth/signup", data = "<form>")]
pub async fn signup(
    form: Form<SignupForm>,
    cookies: &CookieJar<'_>,
    state: &State<AppState>,
    db: Db,
) -> Result<Either<Redirect, Template>, Error> {
    let form = form.into_inner().normalize();

    let mut extractor = FieldValidator::validate(&form);
    let values = SignupValues {
        first_name: form.first_name.clone().unwrap_or_default(),
        last_name: form.last_name.clone().unwrap_or_default(),
        username: form.username.clone().unwrap_or_default(),
        email: form.email.clone().unwrap_or_default(),
    };
    let username = extractor.extract("username", form.username);
    let password1 = extractor.extract("password1", form.password1);
    let password2 = extractor.extract("password2", form.password2);
    if !password1.is_empty() && !password2.is_empty() && password1 != password2 {
        extractor.add("password2", "password_mismatch", PASSWORD_MISMATCH);
    }
    if !username.is_empty() {
        let name = username.clone();
        if db
            .run(move |conn| database::users::username_taken(conn, &name))
            .await?
        {
            extractor.add("username", "unique", DUPLICATED_USERNAME);
        }
    }

    let render_errors = |errors: FormErrors, values: SignupValues| -> Either<Redirect, Template> {
        Either::Right(Template::render(
            "users/signup",
            context! { viewer: Option::<Auth>::None, form: values, errors },
        ))
    };
    if let Err(errors) = extractor.check() {
        return Ok(render_errors(errors, values));
    }

    let first_name = values.first_name.clone();
    let last_name = values.last_name.clone();
    let email = values.email.clone();
    let created = db
        .run(move |conn| {
            database::users::create(
                conn,
                &Registration {
                    username: &username,
                    email: &email,
                    first_name: &first_name,
                    last_name: &last_name,
                    password: &password1,
                },
            )
        })
        .await;

    let user = match created {
        Ok(user) => user,
        Err(UserCreationError::DuplicatedUsername) => {
            let mut extractor = FieldValidator::default();
            extractor.add("username", "unique", DUPLICATED_USERNAME);
            let errors = extractor.check().err().unwrap_or_default();
            return Ok(render_errors(errors, values));
        }
        Err(UserCreationError::PasswordHash) => return Err(Error::PasswordHash),
        Err(UserCreationError::Database(err)) => return Err(err.into()),
    };

    info!("registered user {}", user.username);
    Auth::new(user.id, &user.username).login(cookies, &state.secret)?;
    Ok(Either::Left(Redirect::found(uri!(super::posts::index(_)))))
}

#[get("/auth/login?<next>")]
pub fn login_page(next: Option<String>, auth: Option<Auth>) -> Template {
    Template::render(
        "users/login",
        context! {
            viewer: auth,
            next,
            username: "",
            errors: FormErrors::default(),
        },
    )
}

#[post("/auth/login", data = "<form>")]
pub async fn login(
    form: Form<LoginForm>,
    cookies: &CookieJar<'_>,
    state: &State<AppState>,
    db: Db,
) -> Result<Either<Redirect, Template>, Error> {
    let form = form.into_inner();

    let mut extractor = FieldValidator::default();
    let username = extractor.extract("username", non_blank(form.username));
    let password = extractor.extract("password", non_blank(form.password));

    let user = if extractor.is_valid() {
        let name = username.clone();
        db.run(move |conn| database::users::login(conn, &name, &password))
            .await
    } else {
        None
    };

    match user {
        Some(user) => {
            Auth::new(user.id, &user.username).login(cookies, &state.secret)?;
            info!("{} logged in", user.username);
            let redirect = local_redirect(form.next.as_deref())
                .unwrap_or_else(|| Redirect::found(uri!(super::posts::index(_))));
            Ok(Either::Left(redirect))
        }
        None => {
            if extractor.is_valid() {
                warn!("failed login for {}", username);
                extractor.add("__all__", "invalid_login", BAD_CREDENTIALS);
            }
            let errors = extractor.check().err().unwrap_or_default();
            Ok(Either::Right(Template::render(
                "users/login",
                context! {
                    viewer: Option::<Auth>::None,
                    next: form.next,
                    username,
                    errors,
                },
            )))
        }
    }
}

fn logged_out(cookies: &CookieJar<'_>) -> Template {
    Auth::logout(cookies);
    Template::render("users/logged_out", context! { viewer: Option::<Auth>::None })
}

#[get("/auth/logout")]
pub fn logout(cookies: &CookieJar<'_>) -> Template {
    logged_out(cookies)
}

#[post("/auth/logout")]
pub fn logout_form(cookies: &CookieJar<'_>) -> Template {
    logged_out(cookies)
}
