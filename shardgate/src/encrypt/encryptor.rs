//! Column encryptors.

use std::fmt::Debug;
use std::sync::Arc;

use aws_lc_rs::cipher::{
    DecryptionContext, PaddedBlockDecryptingKey, PaddedBlockEncryptingKey, UnboundCipherKey,
    AES_128,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha1::{Digest, Sha1};
use shardgate_config::Algorithm;

use super::Error;
use crate::statement::Value;

/// Turns plaintext column values into what's stored.
pub trait Encryptor: Debug + Send + Sync {
    fn encrypt(&self, value: &Value) -> Result<Value, Error>;

    /// Reverse `encrypt`, if the encryptor can.
    fn decrypt(&self, value: &Value) -> Result<Value, Error>;
}

/// Create the configured encryptor.
pub fn create(algorithm: &Algorithm) -> Result<Arc<dyn Encryptor>, Error> {
    match algorithm.kind.to_uppercase().as_str() {
        "AES" => Ok(Arc::new(Aes::new(algorithm)?)),
        "MD5" => Ok(Arc::new(Md5 {
            salt: algorithm.props.string("salt").unwrap_or_default(),
        })),
        _ => Err(Error::UnknownEncryptorType(algorithm.kind.clone())),
    }
}

/// AES-128-ECB with PKCS#7 padding, base64 encoded.
///
/// The key is the first 16 bytes of the SHA-1 digest of `aes-key-value`.
#[derive(Clone)]
pub struct Aes {
    name: String,
    key: [u8; 16],
}

impl Debug for Aes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aes").field("name", &self.name).finish()
    }
}

impl Aes {
    pub fn new(algorithm: &Algorithm) -> Result<Self, Error> {
        let secret = algorithm
            .props
            .string("aes-key-value")
            .ok_or_else(|| Error::MissingProperty {
                encryptor: algorithm.name.clone(),
                property: "aes-key-value".into(),
            })?;

        let digest = Sha1::digest(secret.as_bytes());
        let mut key = [0u8; 16];
        key.copy_from_slice(&digest[..16]);

        Ok(Self {
            name: algorithm.name.clone(),
            key,
        })
    }

    fn cipher_error<E>(&self) -> impl FnOnce(E) -> Error + '_ {
        move |_| Error::Cipher(self.name.clone())
    }
}

impl Encryptor for Aes {
    fn encrypt(&self, value: &Value) -> Result<Value, Error> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        let key = UnboundCipherKey::new(&AES_128, &self.key).map_err(self.cipher_error())?;
        let key = PaddedBlockEncryptingKey::ecb_pkcs7(key).map_err(self.cipher_error())?;

        let mut in_out = value.text().into_bytes();
        key.encrypt(&mut in_out).map_err(self.cipher_error())?;

        Ok(Value::String(STANDARD.encode(in_out)))
    }

    fn decrypt(&self, value: &Value) -> Result<Value, Error> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        let key = UnboundCipherKey::new(&AES_128, &self.key).map_err(self.cipher_error())?;
        let key = PaddedBlockDecryptingKey::ecb_pkcs7(key).map_err(self.cipher_error())?;

        let mut in_out = STANDARD.decode(value.text())?;
        let plaintext = key
            .decrypt(&mut in_out, DecryptionContext::None)
            .map_err(self.cipher_error())?;

        Ok(Value::String(String::from_utf8(plaintext.to_vec())?))
    }
}

/// Hex MD5 digest of the value, with an optional salt appended.
#[derive(Debug, Clone, Default)]
pub struct Md5 {
    salt: String,
}

impl Encryptor for Md5 {
    fn encrypt(&self, value: &Value) -> Result<Value, Error> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let digest = md5::compute(format!("{}{}", value.text(), self.salt));
        Ok(Value::String(format!("{:x}", digest)))
    }

    /// Digests are one-way.
    fn decrypt(&self, value: &Value) -> Result<Value, Error> {
        Ok(value.clone())
    }
}

#[cfg(test)]
mod test {
    use shardgate_config::Properties;

    use super::*;

    fn aes() -> Arc<dyn Encryptor> {
        create(&Algorithm::new(
            "aes",
            "AES",
            Properties::from_iter([("aes-key-value", "123456abc")]),
        ))
        .unwrap()
    }

    #[test]
    fn test_aes() {
        let aes = aes();
        let encrypted = aes.encrypt(&Value::from("hello")).unwrap();
        assert_ne!(encrypted, Value::from("hello"));
        // One block, base64.
        assert_eq!(encrypted.text().len(), 24);
        assert_eq!(aes.encrypt(&Value::from("hello")).unwrap(), encrypted);
        assert_eq!(aes.decrypt(&encrypted).unwrap(), Value::from("hello"));
        assert_eq!(aes.encrypt(&Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_aes_missing_key() {
        let err = create(&Algorithm::new("aes", "AES", Properties::default())).unwrap_err();
        assert!(matches!(err, Error::MissingProperty { .. }));
    }

    #[test]
    fn test_md5() {
        let md5 = create(&Algorithm::new("md5", "md5", Properties::default())).unwrap();
        assert_eq!(
            md5.encrypt(&Value::from("hello")).unwrap(),
            Value::from("5d41402abc4b2a76b9719d911017c592")
        );
        assert_eq!(
            md5.encrypt(&Value::from(42)).unwrap(),
            md5.encrypt(&Value::from("42")).unwrap()
        );

        let salted = create(&Algorithm::new(
            "md5",
            "MD5",
            Properties::from_iter([("salt", "pepper")]),
        ))
        .unwrap();
        assert_ne!(
            salted.encrypt(&Value::from("hello")).unwrap(),
            md5.encrypt(&Value::from("hello")).unwrap()
        );
    }

    #[test]
    fn test_unknown_type() {
        assert!(matches!(
            create(&Algorithm::new("x", "ROT13", Properties::default())),
            Err(Error::UnknownEncryptorType(_))
        ));
    }
}
