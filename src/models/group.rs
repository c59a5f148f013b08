use serde::Serialize;

#[derive(Queryable, Serialize, Debug, Clone)]
pub struct Group {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: String,
}
