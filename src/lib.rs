pub mod ai;
pub mod config;
pub mod content;
pub mod db;
pub mod domain;
pub mod error;
pub mod evaluation;
pub mod handlers;
pub mod paths;
pub mod progress;
pub mod services;
pub mod state;

#[cfg(test)]
pub mod testing;
