//! The stock book: every stock indexed twice, by id and by current price.
//!
//! The id index is keyed `(id, price)` and owns the [`Stock`]s. The price
//! index is keyed `(price, id)`, so stocks sharing a price stay distinct and
//! list in id order. A price change re-keys both indexes by detaching the
//! entries and inserting them again under the new price.

use ranktree::{Key, RankTree};
use tracing::{debug, info};

use crate::error::MarketError;
use crate::price::Price;
use crate::stock::{Stock, Timestamp};

#[derive(Clone, Debug, Default)]
pub struct StockManager {
    by_id: RankTree<String, Price, Stock>,
    by_price: RankTree<Price, String, ()>,
}

impl StockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every stock.
    pub fn init_stocks(&mut self) {
        self.by_id.clear();
        self.by_price.clear();
        debug!("stock book reset");
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.exists(&id_key(id))
    }

    pub fn stock(&self, id: &str) -> Option<&Stock> {
        self.by_id.get(&id_key(id))
    }

    /// All stocks in id order.
    pub fn stocks(&self) -> impl Iterator<Item = &Stock> + '_ {
        self.by_id.iter().map(|(_, stock)| stock)
    }

    /// Adds a stock whose history starts with `price` at `timestamp`.
    pub fn add_stock(&mut self, id: &str, timestamp: Timestamp, price: Price) -> Result<(), MarketError> {
        if !price.is_positive() {
            return Err(MarketError::NonPositivePrice(price));
        }
        if timestamp <= 0 {
            return Err(MarketError::NonPositiveTimestamp(timestamp));
        }
        if self.contains(id) {
            return Err(MarketError::StockExists(id.to_string()));
        }

        self.attach(Stock::new(id, timestamp, price));
        info!(id, timestamp, %price, "stock added");
        Ok(())
    }

    /// Removes a stock and returns it with its full history.
    pub fn remove_stock(&mut self, id: &str) -> Result<Stock, MarketError> {
        let stock = self.detach(id)?;
        info!(id, "stock removed");
        Ok(stock)
    }

    /// Records a price change of `difference` at `timestamp`.
    pub fn update_stock(
        &mut self,
        id: &str,
        timestamp: Timestamp,
        difference: Price,
    ) -> Result<(), MarketError> {
        if timestamp < 0 {
            return Err(MarketError::NegativeTimestamp(timestamp));
        }
        if difference.is_zero() {
            return Err(MarketError::ZeroDifference);
        }
        let stock = self
            .stock(id)
            .ok_or_else(|| MarketError::NoSuchStock(id.to_string()))?;
        if stock.has_change(timestamp) {
            return Err(MarketError::TimestampExists {
                id: id.to_string(),
                timestamp,
            });
        }
        if stock.price().checked_add(difference).is_none() {
            return Err(MarketError::PriceOverflow(id.to_string()));
        }

        let mut stock = self.detach(id)?;
        let outcome = stock.add_change(timestamp, difference);
        let price = stock.price();
        self.attach(stock);
        outcome?;
        debug!(id, timestamp, %difference, %price, "stock updated");
        Ok(())
    }

    pub fn stock_price(&self, id: &str) -> Result<Price, MarketError> {
        self.stock(id)
            .map(Stock::price)
            .ok_or_else(|| MarketError::NoSuchStock(id.to_string()))
    }

    /// Removes the change recorded at `timestamp`, reverting the price by it.
    /// The initial timestamp can't be removed.
    pub fn remove_stock_timestamp(&mut self, id: &str, timestamp: Timestamp) -> Result<(), MarketError> {
        let stock = self
            .stock(id)
            .ok_or_else(|| MarketError::NoSuchStock(id.to_string()))?;
        if !stock.has_change(timestamp) {
            return Err(MarketError::NoSuchTimestamp {
                id: id.to_string(),
                timestamp,
            });
        }
        if timestamp == stock.first_timestamp() {
            return Err(MarketError::InitialTimestamp {
                id: id.to_string(),
                timestamp,
            });
        }

        let mut stock = self.detach(id)?;
        let outcome = stock.remove_change(timestamp);
        let price = stock.price();
        self.attach(stock);
        let change = outcome?;
        debug!(id, timestamp, %change, %price, "stock change removed");
        Ok(())
    }

    /// Number of stocks priced within `[lo, hi]`.
    pub fn amount_stocks_in_price_range(&self, lo: Price, hi: Price) -> Result<usize, MarketError> {
        let (lo, hi) = price_window(lo, hi)?;
        Ok(self.by_price.range_count(&lo, &hi))
    }

    /// Ids of the stocks priced within `[lo, hi]`, cheapest first. Stocks
    /// sharing a price list in id order.
    pub fn stocks_in_price_range(&self, lo: Price, hi: Price) -> Result<Vec<String>, MarketError> {
        let (lo, hi) = price_window(lo, hi)?;
        Ok(self
            .by_price
            .range(&lo, &hi)
            .filter_map(|(key, _)| key.secondary().cloned())
            .collect())
    }

    /// Unlinks a stock from both indexes. Both entries are located before
    /// either tree is touched.
    fn detach(&mut self, id: &str) -> Result<Stock, MarketError> {
        let missing = || MarketError::NoSuchStock(id.to_string());
        let id_leaf = self.by_id.find(&id_key(id)).ok_or_else(missing)?;
        let price = self.by_id.value(id_leaf).map(Stock::price).ok_or_else(missing)?;
        let price_leaf = self
            .by_price
            .find(&Key::new(price, id.to_string()))
            .ok_or_else(missing)?;

        let (_, stock) = self.by_id.delete(id_leaf)?;
        self.by_price.delete(price_leaf)?;
        Ok(stock)
    }

    /// Links a stock into both indexes under its current price.
    fn attach(&mut self, stock: Stock) {
        let (id, price) = (stock.id().to_string(), stock.price());
        self.by_price.insert_entry(price, id.clone(), ());
        self.by_id.insert_entry(id, price, stock);
    }
}

fn id_key(id: &str) -> Key<String, Price> {
    Key::primary_only(id.to_string())
}

fn price_window(lo: Price, hi: Price) -> Result<(Key<Price, String>, Key<Price, String>), MarketError> {
    if lo > hi {
        return Err(MarketError::InvalidRange { lo, hi });
    }
    Ok((Key::primary_only(lo), Key::primary_only(hi)))
}
