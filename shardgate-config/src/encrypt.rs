use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Table with encrypted columns.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct EncryptTable {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<EncryptColumn>,
}

/// Encrypted column.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct EncryptColumn {
    /// Logical (plaintext) column name used by applications.
    pub name: String,
    /// Column storing the ciphertext.
    pub cipher_column: String,
    /// Column used for equality lookups.
    #[serde(default)]
    pub assisted_query_column: Option<String>,
    /// Column used for LIKE lookups.
    #[serde(default)]
    pub like_query_column: Option<String>,
    /// Encryptor for the cipher column.
    pub encryptor: String,
    /// Encryptor for the assisted query column.
    #[serde(default)]
    pub assisted_query_encryptor: Option<String>,
}
