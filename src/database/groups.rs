use crate::models::group::Group;
use crate::schema::groups;
use diesel::prelude::*;

#[derive(Insertable)]
#[diesel(table_name = groups)]
struct NewGroup<'a> {
    title: &'a str,
    slug: &'a str,
    description: &'a str,
}

/// Creates a group. Without an explicit slug one is derived from the title.
pub fn create(
    conn: &mut SqliteConnection,
    title: &str,
    slug: Option<&str>,
    description: &str,
) -> QueryResult<Group> {
    let slug = slug.map_or_else(|| slug::slugify(title), str::to_string);
    let new_group = &NewGroup {
        title,
        slug: &slug,
        description,
    };

    diesel::insert_into(groups::table)
        .values(new_group)
        .get_result::<Group>(conn)
}

pub fn find_by_slug(conn: &mut SqliteConnection, slug: &str) -> QueryResult<Group> {
    groups::table.filter(groups::slug.eq(slug)).get_result(conn)
}

pub fn find(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<Group>> {
    groups::table.find(id).get_result(conn).optional()
}

pub fn all(conn: &mut SqliteConnection) -> QueryResult<Vec<Group>> {
    groups::table.order(groups::title.asc()).load(conn)
}
