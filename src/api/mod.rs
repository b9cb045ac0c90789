pub mod extract;
pub mod pagination;
pub mod payload;
pub mod schemas;

pub use extract::{ApiQuery, PageRequest, ValidatedJson};
pub use pagination::{Page, PageParams, Pagination};
