//! Property-Based Tests for the listing cache

use std::collections::HashMap;
use std::time::Duration;

use proptest::prelude::*;

use crate::cache::{ListingCache, MemoryCache};

const TTL: Duration = Duration::from_secs(60);

fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("members".to_string()),
        Just("students".to_string()),
        Just("projects".to_string()),
    ]
}

fn value_strategy() -> impl Strategy<Value = String> {
    "\\[[0-9,]{0,16}\\]"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Within a TTL the first value written under a key is the one served,
    // whatever is written after it.
    #[test]
    fn prop_first_write_wins(
        writes in prop::collection::vec((key_strategy(), value_strategy()), 1..30)
    ) {
        let cache = MemoryCache::new(16);
        let mut first: HashMap<String, String> = HashMap::new();

        tokio_test::block_on(async {
            for (key, value) in &writes {
                let written = cache.set_if_absent(key, value, TTL).await.unwrap();
                let expected = !first.contains_key(key);
                prop_assert_eq!(written, expected);
                first.entry(key.clone()).or_insert_with(|| value.clone());
            }

            for (key, value) in &first {
                prop_assert_eq!(cache.get(key).await.unwrap(), Some(value.clone()));
            }
            Ok(())
        })?;
    }

    // The cache never holds more entries than its capacity.
    #[test]
    fn prop_capacity_bound(
        capacity in 1usize..8,
        keys in prop::collection::vec("[a-z]{1,6}", 1..40)
    ) {
        let cache = MemoryCache::new(capacity);

        tokio_test::block_on(async {
            for key in &keys {
                cache.set_if_absent(key, "[]", TTL).await.unwrap();
                prop_assert!(cache.len().await <= capacity);
            }
            Ok(())
        })?;
    }
}
