use crate::models::comment::{Comment, CommentView};
use crate::models::user::User;
use crate::schema::{comments, users};
use chrono::Utc;
use diesel::prelude::*;

#[derive(Insertable)]
#[diesel(table_name = comments)]
struct NewComment<'a> {
    post: i32,
    author: i32,
    text: &'a str,
    created_at: chrono::NaiveDateTime,
}

pub fn create(conn: &mut SqliteConnection, post: i32, author: i32, text: &str) -> QueryResult<Comment> {
    let new_comment = &NewComment {
        post,
        author,
        text,
        created_at: Utc::now().naive_utc(),
    };

    diesel::insert_into(comments::table)
        .values(new_comment)
        .get_result(conn)
}

/// Comments under a post, oldest first.
pub fn find_by_post(conn: &mut SqliteConnection, post: i32) -> QueryResult<Vec<CommentView>> {
    let result = comments::table
        .inner_join(users::table)
        .filter(comments::post.eq(post))
        .order((comments::created_at.asc(), comments::id.asc()))
        .load::<(Comment, User)>(conn)?;

    Ok(result
        .into_iter()
        .map(|(comment, author)| comment.attach(author))
        .collect())
}
