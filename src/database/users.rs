use crate::models::user::User;
use crate::schema::users;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error};
use log::warn;
use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Scrypt,
};

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub hash: &'a str,
}

/// Fields collected by the signup form.
pub struct Registration<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password: &'a str,
}

#[derive(Debug)]
pub enum UserCreationError {
    DuplicatedUsername,
    PasswordHash,
    Database(Error),
}

impl From<Error> for UserCreationError {
    fn from(err: Error) -> UserCreationError {
        if let Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &err {
            if info.message().contains("users.username") {
                return UserCreationError::DuplicatedUsername;
            }
        }
        UserCreationError::Database(err)
    }
}

pub fn create(
    conn: &mut SqliteConnection,
    registration: &Registration,
) -> Result<User, UserCreationError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password(registration.password.as_bytes(), &salt)
        .map_err(|_| UserCreationError::PasswordHash)?
        .to_string();

    let new_user = &NewUser {
        username: registration.username,
        email: registration.email,
        first_name: registration.first_name,
        last_name: registration.last_name,
        hash: &hash[..],
    };

    diesel::insert_into(users::table)
        .values(new_user)
        .get_result::<User>(conn)
        .map_err(Into::into)
}

/// Checks a username/password pair, returning the user on success.
pub fn login(conn: &mut SqliteConnection, username: &str, password: &str) -> Option<User> {
    let user = users::table
        .filter(users::username.eq(username))
        .get_result::<User>(conn)
        .map_err(|err| warn!("login_user: {}", err))
        .ok()?;

    let parsed_hash = PasswordHash::new(&user.hash)
        .map_err(|err| warn!("login_user: stored hash of {} is malformed: {}", username, err))
        .ok()?;
    Scrypt
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| warn!("login_user: wrong password for {}", username))
        .ok()?;

    Some(user)
}

pub fn find_by_username(conn: &mut SqliteConnection, username: &str) -> QueryResult<User> {
    users::table
        .filter(users::username.eq(username))
        .get_result(conn)
}

pub fn username_taken(conn: &mut SqliteConnection, username: &str) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(
        users::table.filter(users::username.eq(username)),
    ))
    .get_result(conn)
}
