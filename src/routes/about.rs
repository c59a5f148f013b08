use crate::auth::Auth;
use rocket_dyn_templates::{context, Template};

#[get("/about/author")]
pub fn author(auth: Option<Auth>) -> Template {
    Template::render("about/author", context! { viewer: auth })
}

#[get("/about/tech")]
pub fn tech(auth: Option<Auth>) -> Template {
    Template::render("about/tech", context! { viewer: auth })
}
