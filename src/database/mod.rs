pub mod comments;
pub mod groups;
pub mod posts;
pub mod profiles;
pub mod users;

use crate::config::POSTS_PER_PAGE;
use serde::Serialize;

#[database("diesel_sqlite_pool")]
pub struct Db(diesel::SqliteConnection);

use diesel::prelude::*;
use diesel::query_builder::*;
use diesel::query_dsl::methods::LoadQuery;
use diesel::sql_types::BigInt;
use diesel::sqlite::Sqlite;

pub trait OffsetLimit: Sized {
    fn offset_and_limit(self, offset: i64, limit: i64) -> OffsetLimited<Self>;
}

impl<T> OffsetLimit for T {
    fn offset_and_limit(self, offset: i64, limit: i64) -> OffsetLimited<Self> {
        OffsetLimited {
            query: self,
            limit,
            offset,
        }
    }
}

#[derive(Debug, Clone, Copy, QueryId)]
pub struct OffsetLimited<T> {
    query: T,
    offset: i64,
    limit: i64,
}

impl<T> OffsetLimited<T> {
    pub fn load_and_count<'a, U>(self, conn: &mut SqliteConnection) -> QueryResult<(Vec<U>, i64)>
    where
        Self: LoadQuery<'a, SqliteConnection, (U, i64)>,
    {
        let results = self.load::<(U, i64)>(conn)?;
        let total = results.first().map(|x| x.1).unwrap_or(0);
        let records = results.into_iter().map(|x| x.0).collect();
        Ok((records, total))
    }
}

impl<T: Query> Query for OffsetLimited<T> {
    type SqlType = (T::SqlType, BigInt);
}

impl<T> RunQueryDsl<SqliteConnection> for OffsetLimited<T> {}

impl<T> QueryFragment<Sqlite> for OffsetLimited<T>
where
    T: QueryFragment<Sqlite>,
{
    fn walk_ast<'a>(&'a self, mut out: AstPass<'_, 'a, Sqlite>) -> QueryResult<()> {
        out.push_sql("SELECT *, COUNT(*) OVER () FROM (");
        self.query.walk_ast(out.reborrow())?;
        out.push_sql(") t LIMIT ");
        out.push_bind_param::<BigInt, _>(&self.limit)?;
        out.push_sql(" OFFSET ");
        out.push_bind_param::<BigInt, _>(&self.offset)?;
        Ok(())
    }
}

/// One page of a listing plus the navigation data templates need.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page_number: Option<i64>,
    pub next_page_number: Option<i64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: i64, count: i64) -> Self {
        let num_pages = num_pages(count);
        let has_previous = number > 1;
        let has_next = number < num_pages;
        Page {
            items,
            number,
            num_pages,
            count,
            has_previous,
            has_next,
            previous_page_number: has_previous.then(|| number - 1),
            next_page_number: has_next.then(|| number + 1),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_previous: self.has_previous,
            has_next: self.has_next,
            previous_page_number: self.previous_page_number,
            next_page_number: self.next_page_number,
        }
    }
}

/// Number of pages for `count` rows. An empty listing still has one page.
pub fn num_pages(count: i64) -> i64 {
    if count <= 0 {
        1
    } else {
        (count + POSTS_PER_PAGE - 1) / POSTS_PER_PAGE
    }
}

/// Highest page number whose offset still fits in an `i64`.
const MAX_PAGE: i64 = i64::MAX / POSTS_PER_PAGE;

/// The page actually looked up first for a `?page=` value.
fn page_number(requested: Option<i64>) -> i64 {
    requested.unwrap_or(1).clamp(1, MAX_PAGE)
}

fn offset_of(number: i64) -> i64 {
    (number - 1) * POSTS_PER_PAGE
}

/// Loads page `requested` of `query`, clamping to the nearest page that exists.
///
/// The common case costs one statement. Only a request past the end pays for
/// a second statement to learn the total and a third to fetch the last page.
pub fn paginate<'a, Q, U>(
    conn: &mut SqliteConnection,
    query: Q,
    requested: Option<i64>,
) -> QueryResult<Page<U>>
where
    Q: Clone,
    OffsetLimited<Q>: LoadQuery<'a, SqliteConnection, (U, i64)>,
{
    let number = page_number(requested);
    let (items, total) = query
        .clone()
        .offset_and_limit(offset_of(number), POSTS_PER_PAGE)
        .load_and_count::<U>(conn)?;
    if !items.is_empty() || number == 1 {
        return Ok(Page::new(items, number, total));
    }

    let (_, total) = query
        .clone()
        .offset_and_limit(0, 1)
        .load_and_count::<U>(conn)?;
    let last = num_pages(total);
    let (items, total) = query
        .offset_and_limit(offset_of(last), POSTS_PER_PAGE)
        .load_and_count::<U>(conn)?;
    Ok(Page::new(items, last, total))
}
