//! Validated field types shared by handlers and repositories

pub mod coordinates;
pub mod email;
pub mod password;
pub mod validation;

pub use coordinates::Coordinates;
pub use email::Email;
pub use password::Password;
pub use validation::ValidationError;
