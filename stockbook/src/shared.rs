//! A [`StockManager`] behind a reader-writer lock.

use parking_lot::RwLock;

use crate::error::MarketError;
use crate::manager::StockManager;
use crate::price::Price;
use crate::stock::{Stock, Timestamp};

/// Thread-safe stock book. Queries share a read lock, mutations take the
/// write lock, so every request sees both indexes in agreement.
#[derive(Debug, Default)]
pub struct SharedStockManager {
    inner: RwLock<StockManager>,
}

impl SharedStockManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init_stocks(&self) {
        self.inner.write().init_stocks();
    }

    pub fn add_stock(&self, id: &str, timestamp: Timestamp, price: Price) -> Result<(), MarketError> {
        self.inner.write().add_stock(id, timestamp, price)
    }

    pub fn remove_stock(&self, id: &str) -> Result<Stock, MarketError> {
        self.inner.write().remove_stock(id)
    }

    pub fn update_stock(&self, id: &str, timestamp: Timestamp, difference: Price) -> Result<(), MarketError> {
        self.inner.write().update_stock(id, timestamp, difference)
    }

    pub fn remove_stock_timestamp(&self, id: &str, timestamp: Timestamp) -> Result<(), MarketError> {
        self.inner.write().remove_stock_timestamp(id, timestamp)
    }

    pub fn stock_price(&self, id: &str) -> Result<Price, MarketError> {
        self.inner.read().stock_price(id)
    }

    pub fn amount_stocks_in_price_range(&self, lo: Price, hi: Price) -> Result<usize, MarketError> {
        self.inner.read().amount_stocks_in_price_range(lo, hi)
    }

    pub fn stocks_in_price_range(&self, lo: Price, hi: Price) -> Result<Vec<String>, MarketError> {
        self.inner.read().stocks_in_price_range(lo, hi)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.read().contains(id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Runs `f` against the book under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&StockManager) -> R) -> R {
        f(&self.inner.read())
    }

    pub fn into_inner(self) -> StockManager {
        self.inner.into_inner()
    }
}

impl From<StockManager> for SharedStockManager {
    fn from(manager: StockManager) -> Self {
        Self {
            inner: RwLock::new(manager),
        }
    }
}
