use log::error;
use rocket::http::uri::Origin;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Redirect, Responder};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashMap;
use validator::{Validate, ValidationError, ValidationErrors};

/// Why a page handler could not produce its page.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("resource was not found")]
    NotFound,
    #[error("login required to reach {next}")]
    LoginRequired { next: String },
    #[error("database error: {0}")]
    Database(diesel::result::Error),
    #[error("session token error: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),
    #[error("media storage error: {0}")]
    Media(#[from] std::io::Error),
    #[error("template `{0}` failed to render")]
    Template(&'static str),
    #[error("password could not be hashed")]
    PasswordHash,
}

impl Error {
    pub fn login_required(origin: &Origin<'_>) -> Self {
        Error::LoginRequired {
            next: origin.to_string(),
        }
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Error::NotFound,
            err => Error::Database(err),
        }
    }
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        match self {
            Error::NotFound => Err(Status::NotFound),
            Error::LoginRequired { next } => {
                Redirect::found(uri!(crate::routes::users::login_page(next = Some(next))))
                    .respond_to(req)
            }
            err => {
                error!("{} {}: {}", req.method(), req.uri(), err);
                Err(Status::InternalServerError)
            }
        }
    }
}

/// Per-field messages shown next to form inputs.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct FormErrors(HashMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, field_errors)| {
                let messages = field_errors
                    .iter()
                    .map(|err| match &err.message {
                        Some(message) => message.to_string(),
                        None => err.code.to_string(),
                    })
                    .collect();
                (field, messages)
            })
            .collect();
        FormErrors(fields)
    }
}

pub struct FieldValidator {
    errors: ValidationErrors,
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self {
            errors: ValidationErrors::new(),
        }
    }
}

impl FieldValidator {
    pub fn validate<T: Validate>(model: &T) -> Self {
        Self {
            errors: model.validate().err().unwrap_or_else(ValidationErrors::new),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convenience method to trigger early returns with ? operator.
    pub fn check(self) -> Result<(), FormErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors.into())
        }
    }

    pub fn extract<T>(&mut self, field_name: &'static str, field: Option<T>) -> T
    where
        T: Default,
    {
        field.unwrap_or_else(|| {
            self.add(field_name, "required", "This field is required.");
            T::default()
        })
    }

    pub fn add(&mut self, field_name: &'static str, code: &'static str, message: &'static str) {
        let mut error = ValidationError::new(code);
        error.message = Some(Cow::Borrowed(message));
        self.errors.add(field_name, error);
    }
}

/// Turns a blank form input into a missing one.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
