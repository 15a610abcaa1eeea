pub mod context;
pub mod import;
pub mod migrate;
pub mod seed;
pub mod validate;
