//! Compiled encrypt rule.

use std::collections::HashMap;
use std::sync::Arc;

use shardgate_config::Config;
use tracing::debug;

use super::encryptor::{self, Encryptor};
use super::Error;
use crate::statement::Value;

/// Encrypted column and the columns backing it.
#[derive(Debug, Clone)]
pub struct EncryptColumnRule {
    pub logic_column: String,
    pub cipher_column: String,
    pub assisted_query_column: Option<String>,
    pub like_query_column: Option<String>,
    pub encryptor: Arc<dyn Encryptor>,
    pub assisted_query_encryptor: Option<Arc<dyn Encryptor>>,
}

impl EncryptColumnRule {
    pub fn encrypt(&self, value: &Value) -> Result<Value, Error> {
        self.encryptor.encrypt(value)
    }

    /// Column and encryptor used to look rows up by equality.
    pub fn query_column(&self) -> (&str, &dyn Encryptor) {
        match (&self.assisted_query_column, &self.assisted_query_encryptor) {
            (Some(column), Some(encryptor)) => (column.as_str(), encryptor.as_ref()),
            (Some(column), None) => (column.as_str(), self.encryptor.as_ref()),
            _ => (self.cipher_column.as_str(), self.encryptor.as_ref()),
        }
    }

    /// Assisted query column and the value stored in it.
    pub fn assisted(&self, value: &Value) -> Result<Option<(&str, Value)>, Error> {
        match self.assisted_query_column {
            Some(ref column) => {
                let (_, encryptor) = self.query_column();
                Ok(Some((column.as_str(), encryptor.encrypt(value)?)))
            }
            None => Ok(None),
        }
    }
}

/// Encrypted columns of one table.
#[derive(Debug, Clone, Default)]
pub struct EncryptTableRule {
    pub name: String,
    pub columns: Vec<EncryptColumnRule>,
}

impl EncryptTableRule {
    pub fn column(&self, name: &str) -> Option<&EncryptColumnRule> {
        self.columns
            .iter()
            .find(|c| c.logic_column.eq_ignore_ascii_case(name))
    }
}

/// Every encrypted table.
#[derive(Debug, Clone, Default)]
pub struct EncryptRule {
    tables: HashMap<String, EncryptTableRule>,
}

impl EncryptRule {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let mut encryptors: HashMap<String, Arc<dyn Encryptor>> = HashMap::new();
        for algorithm in &config.encryptors {
            encryptors.insert(algorithm.name.clone(), encryptor::create(algorithm)?);
        }
        let find = |name: &str| {
            encryptors
                .get(name)
                .cloned()
                .ok_or_else(|| Error::UnknownEncryptor(name.to_string()))
        };

        let mut tables = HashMap::new();
        for table in &config.encrypt_tables {
            let mut columns = vec![];
            for column in &table.columns {
                columns.push(EncryptColumnRule {
                    logic_column: column.name.clone(),
                    cipher_column: column.cipher_column.clone(),
                    assisted_query_column: column.assisted_query_column.clone(),
                    like_query_column: column.like_query_column.clone(),
                    encryptor: find(&column.encryptor)?,
                    assisted_query_encryptor: column
                        .assisted_query_encryptor
                        .as_deref()
                        .map(find)
                        .transpose()?,
                });
            }
            debug!(
                "table \"{}\" encrypts {} column(s)",
                table.name,
                columns.len()
            );
            tables.insert(
                table.name.to_lowercase(),
                EncryptTableRule {
                    name: table.name.clone(),
                    columns,
                },
            );
        }

        Ok(Self { tables })
    }

    pub fn table(&self, name: &str) -> Option<&EncryptTableRule> {
        self.tables.get(&name.to_lowercase())
    }

    pub fn column(&self, table: &str, column: &str) -> Option<&EncryptColumnRule> {
        self.table(table)?.column(column)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
