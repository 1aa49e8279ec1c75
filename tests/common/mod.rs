//! Common test utilities and helpers

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use tasklink::{Error, ResultSink};

/// Collects every outcome delivered to the sinks it hands out.
#[derive(Clone)]
pub struct Recorder<T> {
    outcomes: Arc<Mutex<Vec<Result<T, Error>>>>,
}

impl<T: Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn sink(&self) -> ResultSink<T> {
        let outcomes = Arc::clone(&self.outcomes);
        ResultSink::new(move |result| outcomes.lock().unwrap().push(result))
    }

    pub fn count(&self) -> usize {
        self.outcomes.lock().unwrap().len()
    }

    pub fn take(&self) -> Vec<Result<T, Error>> {
        std::mem::take(&mut *self.outcomes.lock().unwrap())
    }
}

/// Initialize test logging if needed
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("tasklink=trace")
        .with_test_writer()
        .try_init();
}
