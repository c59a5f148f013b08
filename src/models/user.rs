use serde::Serialize;

#[derive(Queryable, Serialize, Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub hash: String,
}

/// Public face of a user, as shown next to their posts and comments.
#[derive(Serialize, Debug, Clone)]
pub struct Author {
    pub id: i32,
    pub username: String,
    pub full_name: String,
}

#[derive(Serialize, Debug)]
pub struct Profile {
    pub author: Author,
    pub posts_count: i64,
    /// `None` when nobody is logged in.
    pub following: Option<bool>,
    pub can_follow: bool,
}

impl User {
    /// "First Last" when the user gave a name, the username otherwise.
    pub fn full_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    pub fn to_author(&self) -> Author {
        Author {
            id: self.id,
            username: self.username.clone(),
            full_name: self.full_name(),
        }
    }

    pub fn to_profile(&self, posts_count: i64, viewer: Option<i32>, following: bool) -> Profile {
        Profile {
            author: self.to_author(),
            posts_count,
            following: viewer.map(|_| following),
            can_follow: viewer.map_or(false, |id| id != self.id),
        }
    }
}
