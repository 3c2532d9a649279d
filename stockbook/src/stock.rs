//! A single stock and its price-change history.

use ranktree::{Key, RankTree};

use crate::error::MarketError;
use crate::price::Price;

/// Moment of a price change, in caller-defined units.
pub type Timestamp = i64;

/// A stock with its current price and every change that produced it.
///
/// Changes live in a [`RankTree`] keyed by `(timestamp, timestamp)`. The
/// initial price is recorded as the first change, so the current price is
/// always the sum of all recorded changes.
#[derive(Clone)]
pub struct Stock {
    id: String,
    price: Price,
    first_timestamp: Timestamp,
    changes: RankTree<Timestamp, Timestamp, Price>,
}

impl Stock {
    pub fn new(id: impl Into<String>, timestamp: Timestamp, initial_price: Price) -> Self {
        let mut changes = RankTree::new();
        changes.insert_entry(timestamp, timestamp, initial_price);
        Self {
            id: id.into(),
            price: initial_price,
            first_timestamp: timestamp,
            changes,
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }

    #[inline]
    pub fn first_timestamp(&self) -> Timestamp {
        self.first_timestamp
    }

    pub fn has_change(&self, timestamp: Timestamp) -> bool {
        self.changes.exists(&Key::new(timestamp, timestamp))
    }

    /// Records `change` at `timestamp` and moves the price by it.
    pub fn add_change(&mut self, timestamp: Timestamp, change: Price) -> Result<(), MarketError> {
        if self.has_change(timestamp) {
            return Err(MarketError::TimestampExists {
                id: self.id.clone(),
                timestamp,
            });
        }
        self.price = self
            .price
            .checked_add(change)
            .ok_or_else(|| MarketError::PriceOverflow(self.id.clone()))?;
        self.changes.insert_entry(timestamp, timestamp, change);
        Ok(())
    }

    /// Drops the change at `timestamp`, reverting the price by it, and
    /// returns the change. The initial price can't be removed.
    pub fn remove_change(&mut self, timestamp: Timestamp) -> Result<Price, MarketError> {
        let leaf = self
            .changes
            .find(&Key::new(timestamp, timestamp))
            .ok_or_else(|| MarketError::NoSuchTimestamp {
                id: self.id.clone(),
                timestamp,
            })?;
        if timestamp == self.first_timestamp {
            return Err(MarketError::InitialTimestamp {
                id: self.id.clone(),
                timestamp,
            });
        }

        let change = self.changes.value(leaf).copied().unwrap_or_default();
        let price = self
            .price
            .checked_sub(change)
            .ok_or_else(|| MarketError::PriceOverflow(self.id.clone()))?;
        self.changes.delete(leaf)?;
        self.price = price;
        Ok(change)
    }

    /// Recorded changes in timestamp order, the initial price first.
    pub fn changes(&self) -> impl DoubleEndedIterator<Item = (Timestamp, Price)> + '_ {
        self.changes
            .iter()
            .filter_map(|(key, change)| Some((*key.primary()?, *change)))
    }

    pub fn change_count(&self) -> usize {
        self.changes.len()
    }
}

impl std::fmt::Debug for Stock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stock")
            .field("id", &self.id)
            .field("price", &self.price)
            .field("first_timestamp", &self.first_timestamp)
            .field("changes", &self.changes)
            .finish()
    }
}
