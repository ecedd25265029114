pub mod context;
pub mod driver;
