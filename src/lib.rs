pub mod access;
pub mod app;
pub mod config;
pub mod definitions;
pub mod paths;
pub mod shared;
