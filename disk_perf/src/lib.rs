pub mod aggregate;
pub mod capacity;
pub mod cli;
pub mod config;
pub mod harness;
pub mod runner;
