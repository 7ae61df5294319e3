pub mod error;
pub mod fileset;
pub mod fs;
pub mod macros;
pub mod path;
