//! Directory resolution through the async contract.

use fieldvisit_config::DirectoryConfig;
use fieldvisit_core::{BusinessDirectory, DirectoryLookup, ResolutionSource};
use fieldvisit_protocol::BusinessInfo;
use pretty_assertions::assert_eq;
use regex::Regex;
use std::time::Duration;

#[tokio::test]
async fn pick_n_pay_resolves_to_directory_entry() {
    let lookup = DirectoryLookup::new(Duration::ZERO);
    let resolution = lookup.resolve("Pick n Pay").await.expect("resolution");

    assert_eq!(
        resolution.info,
        BusinessInfo {
            address: "123 Main Road, Cape Town, Western Cape, 8001".to_string(),
            contact: "+27 21 658 1000".to_string(),
            distance_km: 15.2,
        }
    );
    assert_eq!(
        resolution.source,
        ResolutionSource::Directory("Pick n Pay".to_string())
    );
}

#[tokio::test]
async fn unknown_business_is_synthesized() {
    let lookup = DirectoryLookup::new(Duration::ZERO);
    let contact = Regex::new(r"^\+27 \d{2} \d{3} \d{4}$").expect("regex");
    let address = Regex::new(
        r"^[1-9]\d{0,2} (Main|Church|Market|High) Street, (Cape Town|Johannesburg|Durban|Pretoria), South Africa$",
    )
    .expect("regex");

    for _ in 0..50 {
        let resolution = lookup
            .resolve("Unknown Business Co")
            .await
            .expect("resolution");
        assert_eq!(resolution.source, ResolutionSource::Synthesized);
        assert!(contact.is_match(&resolution.info.contact), "{}", resolution.info.contact);
        assert!(address.is_match(&resolution.info.address), "{}", resolution.info.address);
        assert!((5.0..=55.0).contains(&resolution.info.distance_km));
    }
}

#[tokio::test]
async fn empty_input_is_a_no_op() {
    let lookup = DirectoryLookup::new(Duration::from_secs(60));
    assert_eq!(lookup.resolve("").await, None);
    assert_eq!(lookup.resolve("  \t").await, None);
}

#[tokio::test]
async fn configured_seed_makes_synthesis_repeatable() {
    let config = DirectoryConfig {
        lookup_delay_ms: 0,
        min_query_chars: 3,
        seed: Some(99),
    };
    let first = DirectoryLookup::from_config(&config)
        .resolve("Acme Plumbing")
        .await;
    let second = DirectoryLookup::from_config(&config)
        .resolve("Acme Plumbing")
        .await;
    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn resolve_waits_for_the_configured_delay() {
    let lookup = DirectoryLookup::new(Duration::from_millis(2000));
    let started = tokio::time::Instant::now();
    lookup.resolve("Shoprite").await.expect("resolution");
    assert!(started.elapsed() >= Duration::from_millis(2000));
}
