pub mod config;
pub mod id_generator;
pub mod logging;
