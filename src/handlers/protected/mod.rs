// Endpoints behind the token middleware. `tokens::refresh` and
// `tokens::revoke_refresh` expect a refresh token; everything else an access token.

pub mod active_templates;
pub mod templates;
pub mod tokens;
pub mod users;
