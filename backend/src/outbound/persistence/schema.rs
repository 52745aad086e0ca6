//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`
//! exactly. Regenerate with `diesel print-schema` after a schema change.

diesel::table! {
    /// Registered accounts. `username` is unique; `email` is not.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Property listings.
    ///
    /// The image and point columns are nullable in pairs, enforced by check
    /// constraints.
    listings (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Text,
        price -> Int8,
        location -> Text,
        country -> Text,
        image_url -> Nullable<Text>,
        image_filename -> Nullable<Text>,
        longitude -> Nullable<Float8>,
        latitude -> Nullable<Float8>,
        owner_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    reviews (id) {
        id -> Uuid,
        comment -> Text,
        rating -> Int2,
        author_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ordered listing to review links.
    listing_reviews (listing_id, review_id) {
        listing_id -> Uuid,
        review_id -> Uuid,
        position -> Int4,
    }
}

diesel::joinable!(listings -> users (owner_id));
diesel::joinable!(reviews -> users (author_id));
diesel::joinable!(listing_reviews -> listings (listing_id));
diesel::joinable!(listing_reviews -> reviews (review_id));

diesel::allow_tables_to_appear_in_same_query!(listing_reviews, listings, reviews, users);
