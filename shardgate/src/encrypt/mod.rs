//! Column encryption.

pub mod encryptor;
pub mod error;
pub mod rule;

pub use encryptor::{Aes, Encryptor, Md5};
pub use error::Error;
pub use rule::{EncryptColumnRule, EncryptRule, EncryptTableRule};
