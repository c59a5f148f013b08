table! {
    users (id) {
        id -> Integer,
        username -> Text,
        email -> Text,
        first_name -> Text,
        last_name -> Text,
        hash -> Text,
    }
}

table! {
    groups (id) {
        id -> Integer,
        title -> Text,
        slug -> Text,
        description -> Text,
    }
}

table! {
    posts (id) {
        id -> Integer,
        text -> Text,
        created_at -> Timestamp,
        author -> Integer,
        group_id -> Nullable<Integer>,
        image -> Nullable<Text>,
    }
}

table! {
    comments (id) {
        id -> Integer,
        post -> Integer,
        author -> Integer,
        text -> Text,
        created_at -> Timestamp,
    }
}

table! {
    follows (follower, followed) {
        follower -> Integer,
        followed -> Integer,
    }
}

joinable!(posts -> users (author));
joinable!(posts -> groups (group_id));
joinable!(comments -> posts (post));
joinable!(comments -> users (author));

allow_tables_to_appear_in_same_query!(comments, follows, groups, posts, users,);
