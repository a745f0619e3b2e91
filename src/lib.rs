pub mod arcade;
pub mod collision;
pub mod compute;
pub mod config;
pub mod engine;
pub mod entities;
pub mod lifecycle;
pub mod policy;
pub mod spawn;
