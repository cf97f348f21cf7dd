pub mod db;
pub mod error;
pub mod model;
pub mod ops;
pub mod position;
pub mod validate;

pub use error::{Error, Result};
