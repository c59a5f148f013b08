use crate::schema::follows;
use diesel::prelude::*;

pub fn is_following(conn: &mut SqliteConnection, follower: i32, followed: i32) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(follows::table.find((follower, followed)))).get_result(conn)
}

/// Subscribes `follower` to `followed`. Following oneself or following twice
/// changes nothing; returns whether a new edge was stored.
pub fn follow(conn: &mut SqliteConnection, follower: i32, followed: i32) -> QueryResult<bool> {
    if follower == followed {
        return Ok(false);
    }
    diesel::insert_or_ignore_into(follows::table)
        .values((
            follows::follower.eq(follower),
            follows::followed.eq(followed),
        ))
        .execute(conn)
        .map(|inserted| inserted > 0)
}

/// Removes the edge if there is one; returns whether anything was deleted.
pub fn unfollow(conn: &mut SqliteConnection, follower: i32, followed: i32) -> QueryResult<bool> {
    diesel::delete(follows::table.find((follower, followed)))
        .execute(conn)
        .map(|deleted| deleted > 0)
}
