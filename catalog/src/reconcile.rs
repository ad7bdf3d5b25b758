//! Applies fulfilled create/update/delete results to the product list.
//!
//! Each function runs under the store's write lock, so no half-applied list is
//! ever observable. Pagination totals are left alone until the next list fetch.

use crate::drafts::DraftImageBuffer;
use crate::types::{Product, ProductId};

/// Append a created product and empty the draft buffer.
pub fn apply_created(products: &mut Vec<Product>, drafts: &mut DraftImageBuffer, product: Product) {
    products.push(product);
    drafts.reset();
}

/// Replace the product with the same identity in place.
///
/// Returns `false`, leaving the list untouched, when no product matches.
pub fn apply_updated(products: &mut [Product], product: Product) -> bool {
    match products.iter_mut().find(|existing| existing.id == product.id) {
        Some(existing) => {
            *existing = product;
            true
        },
        None => false,
    }
}

/// Remove every product with the given identity.
///
/// Returns `false` when nothing was removed.
pub fn apply_deleted(products: &mut Vec<Product>, id: &ProductId) -> bool {
    let before = products.len();
    products.retain(|product| &product.id != id);
    products.len() != before
}
