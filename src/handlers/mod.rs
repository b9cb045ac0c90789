// Handlers are split by the credential they require:
// public (none) and protected (access or refresh token, see `middleware::auth`).
pub mod protected;
pub mod public;
