//! Cache-tag invalidation.
//!
//! Every mutation bumps the generation of the tags whose rendered data it made stale.
//! A rendering layer compares generations to decide what to recompute.

use std::collections::BTreeMap;

use tokio::sync::RwLock;

pub const LEADS: &str = "leads";
pub const LEADS_STATS: &str = "leads-stats";
pub const PRODUCTS: &str = "products";
pub const FEATURED_PRODUCTS: &str = "featured-products";
pub const COLLECTIONS: &str = "collections";
pub const WEAVE_TYPES: &str = "weave-types";
pub const SITE_SETTINGS: &str = "site-settings";
pub const LOOKBOOK: &str = "lookbook";

pub fn product_tag(slug: &str) -> String {
    format!("product-{}", slug)
}

pub fn collection_tag(slug: &str) -> String {
    format!("collection-{}", slug)
}

/// Per-tag generation counters.
#[derive(Debug, Default)]
pub struct CacheTags {
    generations: RwLock<BTreeMap<String, u64>>,
}

impl CacheTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a tag stale.
    pub async fn revalidate(&self, tag: &str) {
        let mut generations = self.generations.write().await;
        let generation = generations.entry(tag.to_string()).or_insert(0);
        *generation += 1;
        tracing::debug!(tag, generation = *generation, "Revalidated cache tag");
    }

    /// Mark several tags stale, skipping duplicates.
    pub async fn revalidate_all<I, S>(&self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut generations = self.generations.write().await;
        let mut seen = Vec::new();
        for tag in tags {
            let tag = tag.as_ref();
            if seen.iter().any(|t: &String| t == tag) {
                continue;
            }
            seen.push(tag.to_string());
            let generation = generations.entry(tag.to_string()).or_insert(0);
            *generation += 1;
        }
        tracing::debug!(tags = ?seen, "Revalidated cache tags");
    }

    /// Current generation of a tag; 0 if it was never invalidated.
    #[cfg(test)]
    pub async fn generation(&self, tag: &str) -> u64 {
        self.generations
            .read()
            .await
            .get(tag)
            .copied()
            .unwrap_or(0)
    }

    pub async fn snapshot(&self) -> BTreeMap<String, u64> {
        self.generations.read().await.clone()
    }
}
