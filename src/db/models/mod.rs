pub mod bootcamp;
pub mod course;
pub mod review;
pub mod user;

pub use bootcamp::{Bootcamp, CreateBootcamp, UpdateBootcamp};
pub use course::{Course, CreateCourse, UpdateCourse};
pub use review::{CreateReview, Review, UpdateReview};
pub use user::{Role, User};
