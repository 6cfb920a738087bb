pub mod password;
pub mod validation;

pub use password::{
    hash_password, verify_password, Password, PasswordHashString, MIN_PASSWORD_LEN,
};
pub use validation::ValidatedJson;
