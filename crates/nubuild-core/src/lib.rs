use error::NubuildError;

pub mod cancel;
pub mod command;
pub mod error;
pub mod launcher;
pub mod result;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub type NubuildResult<T> = std::result::Result<T, NubuildError>;
