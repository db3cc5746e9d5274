pub mod category;
pub mod translation;
pub mod types;
