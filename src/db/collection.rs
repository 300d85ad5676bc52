//! Collection descriptors for the four entity tables.
//!
//! Field lists must stay in step with `migrations/0001_init.sql`; the query
//! layer trusts them for identifier whitelisting and type coercion.

use crate::query::collection::{Collection, Field, FieldType};

pub static BOOTCAMPS: Collection = Collection {
    table: "bootcamps",
    fields: &[
        Field { name: "id", kind: FieldType::Uuid },
        Field { name: "name", kind: FieldType::Text },
        Field { name: "slug", kind: FieldType::Text },
        Field { name: "description", kind: FieldType::Text },
        Field { name: "website", kind: FieldType::Text },
        Field { name: "phone", kind: FieldType::Text },
        Field { name: "email", kind: FieldType::Text },
        Field { name: "address", kind: FieldType::Text },
        Field { name: "latitude", kind: FieldType::Number },
        Field { name: "longitude", kind: FieldType::Number },
        Field { name: "formatted_address", kind: FieldType::Text },
        Field { name: "city", kind: FieldType::Text },
        Field { name: "zipcode", kind: FieldType::Text },
        Field { name: "country", kind: FieldType::Text },
        Field { name: "careers", kind: FieldType::TextArray },
        Field { name: "average_rating", kind: FieldType::Number },
        Field { name: "average_cost", kind: FieldType::Number },
        Field { name: "photo", kind: FieldType::Text },
        Field { name: "housing", kind: FieldType::Bool },
        Field { name: "job_assistance", kind: FieldType::Bool },
        Field { name: "job_guarantee", kind: FieldType::Bool },
        Field { name: "accept_gi", kind: FieldType::Bool },
        Field { name: "user_id", kind: FieldType::Uuid },
        Field { name: "created_at", kind: FieldType::Timestamp },
        Field { name: "revision", kind: FieldType::Number },
    ],
    hidden: &[],
};

pub static COURSES: Collection = Collection {
    table: "courses",
    fields: &[
        Field { name: "id", kind: FieldType::Uuid },
        Field { name: "title", kind: FieldType::Text },
        Field { name: "description", kind: FieldType::Text },
        Field { name: "weeks", kind: FieldType::Text },
        Field { name: "tuition", kind: FieldType::Number },
        Field { name: "minimum_skill", kind: FieldType::Text },
        Field { name: "scholarships_available", kind: FieldType::Bool },
        Field { name: "bootcamp_id", kind: FieldType::Uuid },
        Field { name: "user_id", kind: FieldType::Uuid },
        Field { name: "created_at", kind: FieldType::Timestamp },
        Field { name: "revision", kind: FieldType::Number },
    ],
    hidden: &[],
};

pub static REVIEWS: Collection = Collection {
    table: "reviews",
    fields: &[
        Field { name: "id", kind: FieldType::Uuid },
        Field { name: "title", kind: FieldType::Text },
        Field { name: "text", kind: FieldType::Text },
        Field { name: "rating", kind: FieldType::Number },
        Field { name: "bootcamp_id", kind: FieldType::Uuid },
        Field { name: "user_id", kind: FieldType::Uuid },
        Field { name: "created_at", kind: FieldType::Timestamp },
        Field { name: "revision", kind: FieldType::Number },
    ],
    hidden: &[],
};

pub static USERS: Collection = Collection {
    table: "users",
    fields: &[
        Field { name: "id", kind: FieldType::Uuid },
        Field { name: "name", kind: FieldType::Text },
        Field { name: "email", kind: FieldType::Text },
        Field { name: "password_hash", kind: FieldType::Text },
        Field { name: "role", kind: FieldType::Text },
        Field { name: "reset_password_token", kind: FieldType::Text },
        Field { name: "reset_password_expire", kind: FieldType::Timestamp },
        Field { name: "created_at", kind: FieldType::Timestamp },
        Field { name: "revision", kind: FieldType::Number },
    ],
    hidden: &["password_hash", "reset_password_token", "reset_password_expire"],
};
