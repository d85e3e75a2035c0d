mod validator;

pub mod model;

pub use model::{AuthenticatedUser, MaybeUser};
pub use validator::JwtValidator;
