#![allow(dead_code)]

use diesel::prelude::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use rocket::config::LogLevel;
use rocket::http::{ContentType, Cookie};
use rocket::local::blocking::Client;
use std::path::PathBuf;
use yatube::database::users::Registration;
use yatube::models::{group::Group, post::Post, user::User};

pub const PASSWORD: &str = "war-and-peace-1869";

/// 43 bytes, 2x1 pixels.
pub const SMALL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00,
    0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x00,
    0x02, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x0C, 0x0A, 0x00, 0x3B,
];

const BOUNDARY: &str = "yatube-test-boundary";

/// A running application backed by its own database file and media root.
pub struct TestApp {
    pub client: Client,
    pub media_root: PathBuf,
    db_path: PathBuf,
}

impl TestApp {
    pub fn new() -> TestApp {
        let tag: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();
        let dir = std::env::temp_dir();
        let db_path = dir.join(format!("yatube-{}.sqlite3", tag));
        let media_root = dir.join(format!("yatube-media-{}", tag));

        let figment = rocket::Config::figment()
            .merge(("log_level", LogLevel::Off))
            .merge(("secret_key", "test-secret"))
            .merge(("media_root", media_root.display().to_string()))
            .merge((
                "template_dir",
                concat!(env!("CARGO_MANIFEST_DIR"), "/templates"),
            ))
            .merge(yatube::config::database(&db_path.display().to_string()));

        let client = Client::untracked(yatube::rocket_from(figment)).expect("valid rocket instance");
        TestApp {
            client,
            media_root,
            db_path,
        }
    }

    /// A direct connection for seeding and inspecting the database.
    pub fn conn(&self) -> SqliteConnection {
        SqliteConnection::establish(&self.db_path.display().to_string())
            .expect("test database is reachable")
    }

    pub fn user(&self, username: &str) -> User {
        self.named_user(username, "", "")
    }

    pub fn named_user(&self, username: &str, first_name: &str, last_name: &str) -> User {
        yatube::database::users::create(
            &mut self.conn(),
            &Registration {
                username,
                email: &format!("{}@example.com", username),
                first_name,
                last_name,
                password: PASSWORD,
            },
        )
        .expect("user is created")
    }

    pub fn group(&self, title: &str, slug: &str) -> Group {
        yatube::database::groups::create(&mut self.conn(), title, Some(slug), "A test group")
            .expect("group is created")
    }

    pub fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        yatube::database::posts::create(
            &mut self.conn(),
            author.id,
            text,
            group.map(|g| g.id),
            None,
        )
        .expect("post is created")
    }

    /// Logs in through the login form and returns the session cookie.
    pub fn login(&self, username: &str) -> Cookie<'static> {
        let response = self
            .client
            .post("/auth/login")
            .header(ContentType::Form)
            .body(format!("username={}&password={}", username, PASSWORD))
            .dispatch();
        response
            .cookies()
            .get("sessionid")
            .cloned()
            .expect("login sets a session cookie")
    }

    pub fn get_page(&self, uri: &str, session: Option<&Cookie<'static>>) -> String {
        let mut request = self.client.get(uri.to_string());
        if let Some(cookie) = session {
            request = request.cookie(cookie.clone());
        }
        request.dispatch().into_string().unwrap_or_default()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
        let _ = std::fs::remove_dir_all(&self.media_root);
    }
}

/// Number of post cards rendered on a listing page.
pub fn cards(html: &str) -> usize {
    html.matches("class=\"post-card\"").count()
}

pub fn location(response: &rocket::local::blocking::LocalResponse<'_>) -> String {
    response
        .headers()
        .get_one("Location")
        .unwrap_or_default()
        .to_string()
}

/// Encodes text fields and an optional file as `multipart/form-data`.
pub fn multipart(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> (ContentType, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((name, filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let content_type = ContentType::new("multipart", "form-data").with_params(("boundary", BOUNDARY));
    (content_type, body)
}
