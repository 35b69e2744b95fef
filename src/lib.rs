pub mod acquisition;
pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod quiz;
pub mod scrape;
pub mod terminal;

pub use acquisition::*;
pub use db::*;
pub use model::*;
