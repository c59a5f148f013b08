mod common;

use common::{cards, TestApp};
use diesel::prelude::*;
use rocket::http::Status;
use yatube::cache::PageCache;
use yatube::schema::posts;

#[test]
fn index_is_paginated_by_ten() {
    let app = TestApp::new();
    let leo = app.user("leo");
    for n in 0..13 {
        app.post(&leo, &format!("Post number {}", n), None);
    }

    assert_eq!(cards(&app.get_page("/", None)), 10);
    assert_eq!(cards(&app.get_page("/?page=2", None)), 3);
}

#[test]
fn out_of_range_pages_are_clamped() {
    let app = TestApp::new();
    let leo = app.user("leo");
    for n in 0..13 {
        app.post(&leo, &format!("Post number {}", n), None);
    }

    assert_eq!(cards(&app.get_page("/?page=99", None)), 3);
    assert_eq!(cards(&app.get_page("/?page=0", None)), 10);
    assert_eq!(cards(&app.get_page("/?page=first", None)), 10);
}

#[test]
fn huge_page_numbers_clamp_to_the_last_page() {
    let app = TestApp::new();
    let leo = app.user("leo");
    for n in 0..13 {
        app.post(&leo, &format!("Post number {}", n), None);
    }

    for uri in [
        "/?page=9223372036854775807",
        "/profile/leo?page=1000000000000000000",
    ] {
        let response = app.client.get(uri).dispatch();
        assert_eq!(response.status(), Status::Ok, "{}", uri);
        assert_eq!(cards(&response.into_string().unwrap()), 3, "{}", uri);
    }
    assert_eq!(cards(&app.get_page("/?page=-9223372036854775808", None)), 10);
}

#[test]
fn empty_listing_renders_one_page() {
    let app = TestApp::new();
    let response = app.client.get("/?page=5").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().unwrap();
    assert_eq!(cards(&body), 0);
    assert!(body.contains("No posts yet."));
}

#[test]
fn newest_posts_come_first() {
    let app = TestApp::new();
    let leo = app.user("leo");
    app.post(&leo, "Written first", None);
    app.post(&leo, "Written second", None);

    let body = app.get_page("/", None);
    let first = body.find("Written first").unwrap();
    let second = body.find("Written second").unwrap();
    assert!(second < first);
}

#[test]
fn group_and_profile_listings_are_filtered() {
    let app = TestApp::new();
    let leo = app.named_user("leo", "Leo", "Tolstoy");
    let anna = app.user("anna");
    let classics = app.group("Russian classics", "classics");
    let poetry = app.group("Poetry", "poetry");
    for n in 0..13 {
        app.post(&leo, &format!("Classic {}", n), Some(&classics));
    }
    app.post(&anna, "A lonely poem", Some(&poetry));

    let group_page = app.get_page("/group/classics", None);
    assert_eq!(cards(&group_page), 10);
    assert!(group_page.contains("Russian classics"));
    assert!(!group_page.contains("A lonely poem"));
    assert_eq!(cards(&app.get_page("/group/classics?page=2", None)), 3);

    let poetry_page = app.get_page("/group/poetry", None);
    assert_eq!(cards(&poetry_page), 1);
    assert!(poetry_page.contains("A lonely poem"));

    let profile = app.get_page("/profile/leo", None);
    assert_eq!(cards(&profile), 10);
    assert!(profile.contains("All posts by Leo Tolstoy"));
    assert!(profile.contains("<span class=\"posts-count\">13</span>"));
    assert_eq!(cards(&app.get_page("/profile/leo?page=2", None)), 3);
    assert_eq!(cards(&app.get_page("/profile/anna", None)), 1);
}

#[test]
fn post_in_a_group_is_listed_everywhere_it_belongs() {
    let app = TestApp::new();
    let leo = app.user("leo");
    let classics = app.group("Russian classics", "classics");
    app.group("Poetry", "poetry");
    app.post(&leo, "Everything was in confusion", Some(&classics));

    for uri in ["/", "/group/classics", "/profile/leo"] {
        assert!(app.get_page(uri, None).contains("Everything was in confusion"), "{}", uri);
    }
    assert!(!app.get_page("/group/poetry", None).contains("Everything was in confusion"));
}

#[test]
fn post_detail_shows_post_and_author_stats() {
    let app = TestApp::new();
    let leo = app.user("leo");
    let classics = app.group("Russian classics", "classics");
    app.post(&leo, "An earlier post", None);
    let post = app.post(&leo, "The detailed one", Some(&classics));

    let body = app.get_page(&format!("/posts/{}", post.id), None);
    assert!(body.contains("The detailed one"));
    assert!(body.contains("Russian classics"));
    assert!(body.contains("<span class=\"posts-count\">2</span>"));
    assert!(!body.contains("edit post"));

    let session = app.login("leo");
    let body = app.get_page(&format!("/posts/{}", post.id), Some(&session));
    assert!(body.contains("edit post"));
    assert!(body.contains("Add a comment"));
}

#[test]
fn post_form_offers_every_group() {
    let app = TestApp::new();
    app.user("leo");
    let classics = app.group("Russian classics", "classics");
    let session = app.login("leo");

    let body = app.get_page("/create", Some(&session));
    assert!(body.contains("name=\"text\""));
    assert!(body.contains("name=\"image\""));
    assert!(body.contains(&format!("<option value=\"{}\">Russian classics</option>", classics.id)));
}

#[test]
fn index_is_served_from_cache_until_cleared() {
    let app = TestApp::new();
    let leo = app.user("leo");
    app.post(&leo, "Soon to vanish", None);

    let first = app.get_page("/", None);
    assert!(first.contains("Soon to vanish"));

    diesel::delete(posts::table)
        .execute(&mut app.conn())
        .unwrap();
    let cached = app.get_page("/", None);
    assert_eq!(cached, first);

    app.client
        .rocket()
        .state::<PageCache>()
        .expect("page cache is managed")
        .clear();
    let fresh = app.get_page("/", None);
    assert!(!fresh.contains("Soon to vanish"));
}

#[test]
fn cached_index_is_not_shared_between_viewers() {
    let app = TestApp::new();
    app.user("leo");
    let session = app.login("leo");

    let guest = app.get_page("/", None);
    let member = app.get_page("/", Some(&session));
    assert!(guest.contains("Log in"));
    assert!(member.contains("New post"));
    assert!(!member.contains("href=\"/auth/login\""));
}

#[test]
fn about_pages_render() {
    let app = TestApp::new();
    assert!(app.get_page("/about/author", None).contains("About the author"));
    assert!(app.get_page("/about/tech", None).contains("Technologies"));
}
