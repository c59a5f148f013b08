use crate::config::DATE_FORMAT;
use crate::media;
use crate::models::group::Group;
use crate::models::user::{Author, User};
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Queryable, Debug, Clone)]
pub struct Post {
    pub id: i32,
    pub text: String,
    pub created_at: NaiveDateTime,
    pub author: i32,
    pub group_id: Option<i32>,
    pub image: Option<String>,
}

impl Post {
    pub fn attach(self, author: User, group: Option<Group>) -> PostView {
        PostView {
            id: self.id,
            text: self.text,
            created_at: self.created_at.format(DATE_FORMAT).to_string(),
            image_url: self.image.as_deref().map(media::url),
            image: self.image,
            author: author.to_author(),
            group,
        }
    }
}

/// A post with its author and group resolved, ready for templates.
#[derive(Serialize, Debug)]
pub struct PostView {
    pub id: i32,
    pub text: String,
    pub created_at: String,
    pub image: Option<String>,
    pub image_url: Option<String>,
    pub author: Author,
    pub group: Option<Group>,
}
