// Endpoints reachable without a token: banner, health, login and registration.

pub mod root;
pub mod token;
pub mod users;

pub use root::{health, root};
pub use token::login;
pub use users::create_user;
