use crate::database::{paginate, Page};
use crate::models::group::Group;
use crate::models::post::{Post, PostView};
use crate::models::user::User;
use crate::schema::{follows, groups, posts, users};
use chrono::{NaiveDateTime, Utc};
use diesel::dsl::{InnerJoin, LeftJoin};
use diesel::prelude::*;

type PostRow = (Post, User, Option<Group>);

/// Posts joined with their author and optional group.
type Listing = LeftJoin<InnerJoin<posts::table, users::table>, groups::table>;

fn listing() -> Listing {
    posts::table.inner_join(users::table).left_join(groups::table)
}

fn to_view((post, author, group): PostRow) -> PostView {
    post.attach(author, group)
}

#[derive(Insertable)]
#[diesel(table_name = posts)]
struct NewPost<'a> {
    text: &'a str,
    created_at: NaiveDateTime,
    author: i32,
    group_id: Option<i32>,
    image: Option<&'a str>,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = posts)]
pub struct UpdatePostData {
    pub text: Option<String>,
    pub group_id: Option<Option<i32>>,
    pub image: Option<Option<String>>,
}

pub fn create(
    conn: &mut SqliteConnection,
    author: i32,
    text: &str,
    group_id: Option<i32>,
    image: Option<&str>,
) -> QueryResult<Post> {
    let new_post = &NewPost {
        text,
        created_at: Utc::now().naive_utc(),
        author,
        group_id,
        image,
    };

    diesel::insert_into(posts::table)
        .values(new_post)
        .get_result::<Post>(conn)
}

pub fn find(conn: &mut SqliteConnection, id: i32) -> QueryResult<Post> {
    posts::table.find(id).get_result(conn)
}

pub fn find_one(conn: &mut SqliteConnection, id: i32) -> QueryResult<PostView> {
    listing()
        .filter(posts::id.eq(id))
        .get_result::<PostRow>(conn)
        .map(to_view)
}

pub fn update(conn: &mut SqliteConnection, id: i32, data: &UpdatePostData) -> QueryResult<Post> {
    diesel::update(posts::table.find(id))
        .set(data)
        .get_result(conn)
}

pub fn count_by_author(conn: &mut SqliteConnection, author: i32) -> QueryResult<i64> {
    posts::table
        .filter(posts::author.eq(author))
        .count()
        .get_result(conn)
}

/// Every post, newest first.
pub fn all(conn: &mut SqliteConnection, page: Option<i64>) -> QueryResult<Page<PostView>> {
    let query = listing().order((posts::created_at.desc(), posts::id.desc()));
    Ok(paginate::<_, PostRow>(conn, query, page)?.map(to_view))
}

pub fn by_group(
    conn: &mut SqliteConnection,
    group: i32,
    page: Option<i64>,
) -> QueryResult<Page<PostView>> {
    let query = listing()
        .filter(posts::group_id.eq(group))
        .order((posts::created_at.desc(), posts::id.desc()));
    Ok(paginate::<_, PostRow>(conn, query, page)?.map(to_view))
}

pub fn by_author(
    conn: &mut SqliteConnection,
    author: i32,
    page: Option<i64>,
) -> QueryResult<Page<PostView>> {
    let query = listing()
        .filter(posts::author.eq(author))
        .order((posts::created_at.desc(), posts::id.desc()));
    Ok(paginate::<_, PostRow>(conn, query, page)?.map(to_view))
}

/// Posts written by the authors `follower` subscribes to.
pub fn feed(
    conn: &mut SqliteConnection,
    follower: i32,
    page: Option<i64>,
) -> QueryResult<Page<PostView>> {
    let followed = follows::table
        .filter(follows::follower.eq(follower))
        .select(follows::followed);
    let query = listing()
        .filter(posts::author.eq_any(followed))
        .order((posts::created_at.desc(), posts::id.desc()));
    Ok(paginate::<_, PostRow>(conn, query, page)?.map(to_view))
}
