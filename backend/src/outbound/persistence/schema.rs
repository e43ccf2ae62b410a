//! Diesel table definitions matching `backend/migrations`.

diesel::table! {
    news (id) {
        #[max_length = 24]
        id -> Varchar,
        title -> Text,
        content -> Text,
        category -> Text,
        published_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    users (id) {
        #[max_length = 24]
        id -> Varchar,
        name -> Text,
        registered_objects -> Int4,
    }
}
