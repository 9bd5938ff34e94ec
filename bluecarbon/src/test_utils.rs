//! In-memory stand-in for the remote platform.
use parking_lot::Mutex;
use serde_json::Value;

use crate::collect::earth_engine::Expression;
use crate::collect::platform::RemotePlatform;
use crate::error::{Error, Result};

/// Returns a canned answer and records every expression it receives
pub struct FakePlatform {
    answer: std::result::Result<Value, String>,
    pub received: Mutex<Vec<Expression>>,
}

impl FakePlatform {
    pub fn answering(answer: Value) -> Self {
        FakePlatform {
            answer: Ok(answer),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        FakePlatform {
            answer: Err(message.to_string()),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.received.lock().len()
    }
}

impl RemotePlatform for FakePlatform {
    fn compute(&self, expression: &Expression) -> Result<Value> {
        self.received.lock().push(expression.clone());
        self.answer.clone().map_err(Error::RemoteComputation)
    }
}
