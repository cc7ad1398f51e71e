// Library exports for testing
// The binary (main.rs) imports these as well

pub mod config;
pub mod error;
pub mod logger;
pub mod page;
pub mod session;
pub mod socket;

#[cfg(test)]
mod tests;
