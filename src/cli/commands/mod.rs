pub mod denylist;
pub mod migrate;
pub mod serve;
pub mod user;
