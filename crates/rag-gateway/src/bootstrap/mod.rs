//! Startup tasks run before the gateway serves traffic

pub mod seeder;

pub use seeder::{SeedFailure, SeedReport, Seeder};
