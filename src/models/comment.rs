use crate::config::DATE_FORMAT;
use crate::models::user::{Author, User};
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Queryable, Debug, Clone)]
pub struct Comment {
    pub id: i32,
    pub post: i32,
    pub author: i32,
    pub text: String,
    pub created_at: NaiveDateTime,
}

impl Comment {
    pub fn attach(self, author: User) -> CommentView {
        CommentView {
            id: self.id,
            text: self.text,
            created_at: self.created_at.format(DATE_FORMAT).to_string(),
            author: author.to_author(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct CommentView {
    pub id: i32,
    pub text: String,
    pub created_at: String,
    pub author: Author,
}
