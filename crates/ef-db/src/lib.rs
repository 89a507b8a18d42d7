pub mod favorite_repo;
pub mod schema;
pub mod store;
pub mod util;
