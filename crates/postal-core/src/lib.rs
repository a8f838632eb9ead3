pub mod batch;
pub mod db;
pub mod error;
pub mod import;
pub mod reference;
pub mod resolver;
pub mod seed;
pub mod store;
pub mod types;
