use async_trait::async_trait;
use fieldvisit_core::{BusinessDirectory, Resolution, ResolutionSource};
use fieldvisit_protocol::BusinessInfo;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Scripted {
    delay: Duration,
    resolution: Option<Resolution>,
}

/// Directory with per-name latency and canned answers.
///
/// Unscripted names resolve to `None` immediately. Every call is recorded.
#[derive(Debug, Default)]
pub struct ScriptedDirectory {
    responses: HashMap<String, Scripted>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `name` with a directory hit after `delay`.
    pub fn with_response(mut self, name: &str, delay: Duration, info: BusinessInfo) -> Self {
        self.responses.insert(
            name.to_string(),
            Scripted {
                delay,
                resolution: Some(Resolution {
                    info,
                    source: ResolutionSource::Directory(name.to_string()),
                }),
            },
        );
        self
    }

    /// Answer `name` with nothing after `delay`.
    pub fn with_miss(mut self, name: &str, delay: Duration) -> Self {
        self.responses.insert(
            name.to_string(),
            Scripted {
                delay,
                resolution: None,
            },
        );
        self
    }

    /// Names passed to `resolve`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl BusinessDirectory for ScriptedDirectory {
    async fn resolve(&self, name: &str) -> Option<Resolution> {
        self.calls.lock().push(name.to_string());
        let scripted = self.responses.get(name)?.clone();
        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }
        scripted.resolution
    }
}
