pub mod base;
pub mod convert;
pub mod rates;
pub mod setup;
pub mod summary;
pub mod ui;
