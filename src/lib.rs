pub mod card;
pub mod cli;
pub mod config;
pub mod display;
pub mod draft;
pub mod quiz;
pub mod rng;

#[cfg(test)]
mod integration_tests;
