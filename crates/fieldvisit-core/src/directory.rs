//! Business-name lookup against a fixed directory with a synthetic fallback.

use async_trait::async_trait;
use fieldvisit_config::DirectoryConfig;
use fieldvisit_protocol::BusinessInfo;
use log::debug;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::time::Duration;

const STREETS: [&str; 4] = ["Main", "Church", "Market", "High"];
const CITIES: [&str; 4] = ["Cape Town", "Johannesburg", "Durban", "Pretoria"];

/// Known business with fixed details.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    pub name: String,
    pub info: BusinessInfo,
}

impl DirectoryEntry {
    pub fn new(name: &str, address: &str, contact: &str, distance_km: f64) -> Self {
        Self {
            name: name.to_string(),
            info: BusinessInfo {
                address: address.to_string(),
                contact: contact.to_string(),
                distance_km,
            },
        }
    }
}

/// The built-in directory, in match order.
pub fn default_entries() -> Vec<DirectoryEntry> {
    vec![
        DirectoryEntry::new(
            "Pick n Pay",
            "123 Main Road, Cape Town, Western Cape, 8001",
            "+27 21 658 1000",
            15.2,
        ),
        DirectoryEntry::new(
            "Shoprite",
            "456 Church Street, Johannesburg, Gauteng, 2000",
            "+27 11 517 4000",
            8.7,
        ),
        DirectoryEntry::new(
            "Woolworths",
            "789 Adderley Street, Cape Town, Western Cape, 8000",
            "+27 21 407 9111",
            12.5,
        ),
        DirectoryEntry::new(
            "Checkers",
            "321 Oxford Road, Rosebank, Johannesburg, 2196",
            "+27 11 280 8000",
            18.9,
        ),
    ]
}

/// Where a resolution came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionSource {
    /// Matched a directory entry with this name.
    Directory(String),
    /// Generated for an unknown business.
    Synthesized,
}

/// Result of resolving a business name.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub info: BusinessInfo,
    pub source: ResolutionSource,
}

/// Resolves a free-text business name to client details.
#[async_trait]
pub trait BusinessDirectory: Send + Sync {
    /// Resolve a name; `None` for empty input.
    async fn resolve(&self, name: &str) -> Option<Resolution>;
}

/// Directory lookup with simulated latency and a seedable synthetic fallback.
pub struct DirectoryLookup {
    entries: Vec<DirectoryEntry>,
    rng: Mutex<Box<dyn RngCore + Send>>,
    delay: Duration,
}

impl std::fmt::Debug for DirectoryLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryLookup")
            .field("entries", &self.entries.len())
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl Default for DirectoryLookup {
    fn default() -> Self {
        Self::from_config(&DirectoryConfig::default())
    }
}

impl DirectoryLookup {
    /// Built-in directory with the given latency and an OS-seeded generator.
    pub fn new(delay: Duration) -> Self {
        Self {
            entries: default_entries(),
            rng: Mutex::new(Box::new(StdRng::from_os_rng())),
            delay,
        }
    }

    /// Build from config, seeding the generator when a seed is set.
    pub fn from_config(config: &DirectoryConfig) -> Self {
        let lookup = Self::new(Duration::from_millis(config.lookup_delay_ms));
        match config.seed {
            Some(seed) => lookup.with_seed(seed),
            None => lookup,
        }
    }

    /// Replace the synthetic generator with a seeded one.
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    /// Inject any random source for the synthetic generator.
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Mutex::new(Box::new(rng));
        self
    }

    /// Replace the directory entries.
    pub fn with_entries(mut self, entries: Vec<DirectoryEntry>) -> Self {
        self.entries = entries;
        self
    }

    /// Simulated latency applied to each `resolve`.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// First entry whose name contains the query, case-insensitively.
    pub fn find(&self, name: &str) -> Option<&DirectoryEntry> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| entry.name.to_lowercase().contains(&needle))
    }

    /// Generate a plausible record for an unknown business.
    pub fn synthesize(&self) -> BusinessInfo {
        let mut rng = self.rng.lock();
        let number = rng.random_range(1..=999);
        let street = STREETS[rng.random_range(0..STREETS.len())];
        let city = CITIES[rng.random_range(0..CITIES.len())];
        let contact = format!(
            "+27 {} {} {}",
            rng.random_range(10..=99),
            rng.random_range(100..=999),
            rng.random_range(1000..=9999)
        );
        let tenths: u32 = rng.random_range(50..=550);
        BusinessInfo {
            address: format!("{number} {street} Street, {city}, South Africa"),
            contact,
            distance_km: f64::from(tenths) / 10.0,
        }
    }

    /// Resolve without the simulated latency.
    pub fn resolve_now(&self, name: &str) -> Option<Resolution> {
        if name.trim().is_empty() {
            debug!("directory lookup skipped for empty name");
            return None;
        }
        if let Some(entry) = self.find(name) {
            debug!("directory hit (query={}, match={})", name.trim(), entry.name);
            return Some(Resolution {
                info: entry.info.clone(),
                source: ResolutionSource::Directory(entry.name.clone()),
            });
        }
        debug!("directory miss, synthesizing (query={})", name.trim());
        Some(Resolution {
            info: self.synthesize(),
            source: ResolutionSource::Synthesized,
        })
    }
}

#[async_trait]
impl BusinessDirectory for DirectoryLookup {
    async fn resolve(&self, name: &str) -> Option<Resolution> {
        if name.trim().is_empty() {
            return None;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.resolve_now(name)
    }
}
