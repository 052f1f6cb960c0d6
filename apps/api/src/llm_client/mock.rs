//! Scripted oracles for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LlmError, Oracle};

/// Oracle that answers every prompt through a closure and records the prompts it saw.
pub struct ScriptedOracle<F> {
    respond: F,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl<F> ScriptedOracle<F>
where
    F: Fn(&str) -> Result<String, LlmError> + Send + Sync,
{
    pub fn new(respond: F) -> Self {
        Self {
            respond,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl<F> Oracle for ScriptedOracle<F>
where
    F: Fn(&str) -> Result<String, LlmError> + Send + Sync,
{
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        (self.respond)(prompt)
    }
}

/// Oracle that always returns the same text.
pub fn fixed(response: &str) -> ScriptedOracle<impl Fn(&str) -> Result<String, LlmError> + Send + Sync> {
    let response = response.to_string();
    ScriptedOracle::new(move |_: &str| Ok(response.clone()))
}

/// Oracle whose transport is always down.
pub fn unreachable() -> ScriptedOracle<impl Fn(&str) -> Result<String, LlmError> + Send + Sync> {
    ScriptedOracle::new(|_: &str| {
        Err(LlmError::Api {
            status: 503,
            message: "oracle unavailable".to_string(),
        })
    })
}
