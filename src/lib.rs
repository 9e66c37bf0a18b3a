pub mod a1;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod grid;
pub mod limits;
pub mod model;
pub mod observability;
pub mod refresh;
pub mod registry;
pub mod render;
pub mod store;
pub mod table;
