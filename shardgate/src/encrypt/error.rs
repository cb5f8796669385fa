use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown encryptor type \"{0}\"")]
    UnknownEncryptorType(String),

    #[error("encryptor \"{0}\" is not configured")]
    UnknownEncryptor(String),

    #[error("encryptor \"{encryptor}\" is missing property \"{property}\"")]
    MissingProperty { encryptor: String, property: String },

    #[error("cipher error in encryptor \"{0}\"")]
    Cipher(String),

    #[error("{0}")]
    Base64(#[from] base64::DecodeError),

    #[error("{0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
