//! Key generators for auto-generated columns.
//!
//! `SNOWFLAKE` ids are 63-bit: 41 bits of milliseconds since a fixed epoch,
//! 10 bits of worker id and 12 bits of sequence. They are monotonic per
//! generator, even if the clock goes backwards.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use shardgate_config::Algorithm;
use uuid::Uuid;

use super::Error;
use crate::statement::Value;

const WORKER_BITS: u64 = 10; // Max 1023 workers
const SEQUENCE_BITS: u64 = 12;
const TIMESTAMP_BITS: u64 = 41;
const MAX_WORKER_ID: u64 = (1 << WORKER_BITS) - 1;
const MAX_SEQUENCE: u64 = (1 << SEQUENCE_BITS) - 1;
const MAX_TIMESTAMP: u64 = (1 << TIMESTAMP_BITS) - 1;
const EPOCH: u64 = 1477958400000; // 2016-11-01T00:00:00Z
const WORKER_SHIFT: u8 = SEQUENCE_BITS as u8;
const TIMESTAMP_SHIFT: u8 = (SEQUENCE_BITS + WORKER_BITS) as u8;

/// Generates values for an auto-generated key column.
pub trait KeyGenerator: Debug + Send + Sync {
    fn generate(&self) -> Value;
}

/// Create the configured key generator.
///
/// `worker_id` is used by `SNOWFLAKE` unless the generator sets `worker-id`.
pub fn create(algorithm: &Algorithm, worker_id: u64) -> Result<Arc<dyn KeyGenerator>, Error> {
    match algorithm.kind.to_uppercase().as_str() {
        "SNOWFLAKE" => {
            let worker_id = match algorithm.props.integer("worker-id") {
                Some(id) if id >= 0 => id as u64,
                Some(id) => {
                    return Err(Error::InvalidProperty {
                        algorithm: algorithm.name.clone(),
                        property: "worker-id".into(),
                        reason: format!("{} is negative", id),
                    })
                }
                None => worker_id,
            };
            Ok(Arc::new(Snowflake::new(&algorithm.name, worker_id)?))
        }
        "UUID" => Ok(Arc::new(UuidGenerator)),
        _ => Err(Error::UnknownAlgorithmType(algorithm.kind.clone())),
    }
}

#[derive(Debug, Default)]
struct State {
    last_timestamp_ms: u64,
    sequence: u64,
}

impl State {
    /// Never waits: a clock behind the last id, or an exhausted sequence,
    /// moves the id's timestamp past the wall clock instead.
    fn next_id(&mut self, worker_id: u64, now: u64) -> u64 {
        if now > self.last_timestamp_ms {
            self.last_timestamp_ms = now;
            self.sequence = 0;
        } else {
            self.sequence = (self.sequence + 1) & MAX_SEQUENCE;
            // Wraparound.
            if self.sequence == 0 {
                self.last_timestamp_ms += 1;
            }
        }

        let elapsed = self.last_timestamp_ms.saturating_sub(EPOCH) & MAX_TIMESTAMP;
        (elapsed << TIMESTAMP_SHIFT) | (worker_id << WORKER_SHIFT) | self.sequence
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Snowflake id generator.
#[derive(Debug)]
pub struct Snowflake {
    worker_id: u64,
    state: Mutex<State>,
}

impl Snowflake {
    pub fn new(name: &str, worker_id: u64) -> Result<Self, Error> {
        if worker_id > MAX_WORKER_ID {
            return Err(Error::InvalidProperty {
                algorithm: name.to_string(),
                property: "worker-id".into(),
                reason: format!("{} exceeds maximum ({})", worker_id, MAX_WORKER_ID),
            });
        }

        Ok(Self {
            worker_id,
            state: Mutex::new(State::default()),
        })
    }

    pub fn next_id(&self) -> i64 {
        self.state.lock().next_id(self.worker_id, now_ms()) as i64
    }
}

impl KeyGenerator for Snowflake {
    fn generate(&self) -> Value {
        Value::Integer(self.next_id())
    }
}

/// Random UUID, without dashes.
#[derive(Debug, Clone, Copy)]
pub struct UuidGenerator;

impl KeyGenerator for UuidGenerator {
    fn generate(&self) -> Value {
        Value::String(Uuid::new_v4().simple().to_string())
    }
}
