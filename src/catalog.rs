//! The reference catalog of craftable items.
//!
//! [`Catalog`] is immutable once built. It is shared behind an [`Arc`] by the
//! planner and every optimizer it spawns, so any number of searches can read
//! it at the same time.

use std::collections::{BTreeMap, HashMap};
use std::ops::Index;
use std::sync::Arc;

use tracing::debug;

use crate::data::DataError;
use crate::models::{Category, Item, ItemId};

/// Item lookup plus the category index used to chain workshop steps.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Arc<Item>>,
    by_id: HashMap<ItemId, usize>,
    categories: BTreeMap<Category, Vec<usize>>,
    successors: Vec<Vec<usize>>,
}

impl Catalog {
    /// Builds the catalog, ordering items by id.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::DuplicateItem`] if two items share an id and
    /// [`DataError::InvalidItem`] for items that take no time or expose no
    /// category.
    pub fn new(mut items: Vec<Item>) -> Result<Self, DataError> {
        items.sort_by_key(|i| i.id);

        let mut by_id = HashMap::with_capacity(items.len());
        let mut categories: BTreeMap<Category, Vec<usize>> = BTreeMap::new();
        for (index, item) in items.iter().enumerate() {
            if item.hours == 0 {
                return Err(DataError::InvalidItem {
                    item: item.name.clone(),
                    reason: "takes zero hours".to_string(),
                });
            }
            if item.categories.is_empty() {
                return Err(DataError::InvalidItem {
                    item: item.name.clone(),
                    reason: "has no category".to_string(),
                });
            }
            if by_id.insert(item.id, index).is_some() {
                return Err(DataError::DuplicateItem(item.id.0));
            }
            for category in &item.categories {
                let members = categories.entry(category.clone()).or_default();
                if !members.contains(&index) {
                    members.push(index);
                }
            }
        }

        // An item may expose several categories shared with the same
        // successor; each successor is listed once, in catalog order.
        let successors = items
            .iter()
            .map(|item| {
                let mut next: Vec<usize> = item
                    .categories
                    .iter()
                    .filter_map(|c| categories.get(c))
                    .flatten()
                    .copied()
                    .collect();
                next.sort_unstable();
                next.dedup();
                next
            })
            .collect();

        debug!(
            items = items.len(),
            categories = categories.len(),
            "built item catalog"
        );

        Ok(Catalog {
            items: items.into_iter().map(Arc::new).collect(),
            by_id,
            categories,
            successors,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items, ordered by id.
    pub fn items(&self) -> &[Arc<Item>] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Arc<Item>> {
        self.by_id.get(&id).map(|&i| &self.items[i])
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Arc<Item>> {
        self.items
            .iter()
            .find(|i| i.name.eq_ignore_ascii_case(name) || i.short_name().eq_ignore_ascii_case(name))
    }

    /// Items exposing `category`.
    pub fn items_in_category(&self, category: &Category) -> Vec<&Arc<Item>> {
        self.categories
            .get(category)
            .map(|members| members.iter().map(|&i| &self.items[i]).collect())
            .unwrap_or_default()
    }

    /// Every known category, in name order.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.keys()
    }

    /// Items that may follow `id` in the next step of a workshop.
    ///
    /// Returns an empty list for ids the catalog does not contain.
    pub fn efficient_items(&self, id: ItemId) -> Vec<&Arc<Item>> {
        self.by_id
            .get(&id)
            .map(|&i| self.successors[i].iter().map(|&s| &self.items[s]).collect())
            .unwrap_or_default()
    }

    pub(crate) fn successors_of(&self, position: usize) -> &[usize] {
        &self.successors[position]
    }
}

impl Index<ItemId> for Catalog {
    type Output = Arc<Item>;

    /// # Panics
    ///
    /// Panics if the catalog has no item with this id.
    fn index(&self, id: ItemId) -> &Arc<Item> {
        match self.item(id) {
            Some(item) => item,
            None => panic!("item {id} is not in the catalog"),
        }
    }
}
