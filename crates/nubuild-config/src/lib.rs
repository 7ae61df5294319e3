pub mod annotations;
pub mod config;
pub mod error;
pub mod plan;
pub mod repository;
pub mod verbosity;

#[cfg(test)]
pub mod test_utils;
