//! Category tree cache.
//!
//! The category navigation is derived from the full product list, which is
//! expensive to fetch on every request. The derived tree is kept in a `moka`
//! cache owned by `AppState`, with explicit invalidation and refresh.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use super::{BackendClient, BackendError, Category, Product};

/// Single cache slot for the category tree.
const CATEGORY_TREE_KEY: &str = "categories";

/// Cached category tree backed by the product list.
#[derive(Clone)]
pub struct CategoryCache {
    client: BackendClient,
    cache: Cache<&'static str, Arc<Vec<Category>>>,
}

impl CategoryCache {
    /// Create an empty cache that reloads after `ttl`.
    #[must_use]
    pub fn new(client: BackendClient, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { client, cache }
    }

    /// Get the category tree, loading it from the backend on a miss.
    ///
    /// # Errors
    ///
    /// Returns an error if the product list cannot be fetched.
    #[instrument(skip(self))]
    pub async fn get(&self) -> Result<Arc<Vec<Category>>, BackendError> {
        if let Some(tree) = self.cache.get(CATEGORY_TREE_KEY).await {
            debug!("Cache hit for categories");
            return Ok(tree);
        }

        let products = self.client.products().await?;
        let tree = Arc::new(build_category_tree(&products));

        self.cache.insert(CATEGORY_TREE_KEY, Arc::clone(&tree)).await;
        Ok(tree)
    }

    /// Drop the cached tree; the next `get` reloads it.
    pub async fn invalidate(&self) {
        self.cache.invalidate(CATEGORY_TREE_KEY).await;
    }

    /// Invalidate and reload immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the product list cannot be fetched. The cache is
    /// left empty in that case.
    pub async fn refresh(&self) -> Result<Arc<Vec<Category>>, BackendError> {
        self.invalidate().await;
        self.get().await
    }
}

/// Group active products into categories with sorted, distinct subcategories.
///
/// Categories are sorted by name. Products without a category are skipped.
#[must_use]
pub fn build_category_tree(products: &[Product]) -> Vec<Category> {
    let mut groups: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for product in products.iter().filter(|p| p.is_active()) {
        let Some(category) = product.category.as_deref().filter(|c| !c.trim().is_empty()) else {
            continue;
        };
        let subcategories = groups.entry(category).or_default();
        if let Some(sub) = product.subcategory.as_deref().filter(|s| !s.trim().is_empty()) {
            subcategories.insert(sub);
        }
    }

    groups
        .into_iter()
        .map(|(name, subcategories)| Category {
            name: name.to_string(),
            slug: category_slug(name),
            subcategories: subcategories.into_iter().map(String::from).collect(),
        })
        .collect()
}

/// URL slug for a category name: lowercase, `&` dropped, whitespace runs
/// collapsed to a single `-`.
///
/// "Art & Antiques" becomes "art-antiques".
#[must_use]
pub fn category_slug(name: &str) -> String {
    name.to_lowercase()
        .replace('&', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
