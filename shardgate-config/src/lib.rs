// Submodules
pub mod core;
pub mod data_types;
pub mod encrypt;
pub mod error;
pub mod general;
pub mod sharding;

pub use core::Config;
pub use data_types::*;
pub use encrypt::{EncryptColumn, EncryptTable};
pub use error::Error;
pub use general::General;
pub use sharding::*;
