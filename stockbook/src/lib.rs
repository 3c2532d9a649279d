//! # stockbook
//!
//! A stock book that keeps every stock indexed by id and by current price,
//! built on [`ranktree`]. Counting the stocks inside a price window costs
//! O(log n) regardless of how many fall inside it.
//!
//! ## Example
//!
//! ```rust
//! use stockbook::{Price, StockManager};
//!
//! let mut book = StockManager::new();
//! book.add_stock("AAPL", 1, "150".parse().unwrap()).unwrap();
//! book.add_stock("MSFT", 1, "300.5".parse().unwrap()).unwrap();
//! book.update_stock("AAPL", 2, "-25.25".parse().unwrap()).unwrap();
//!
//! assert_eq!(book.stock_price("AAPL").unwrap().to_string(), "124.75");
//! let (lo, hi) = (Price::from_whole(100), Price::from_whole(200));
//! assert_eq!(book.amount_stocks_in_price_range(lo, hi).unwrap(), 1);
//! assert_eq!(book.stocks_in_price_range(lo, hi).unwrap(), ["AAPL"]);
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod manager;
pub mod menu;
pub mod price;
pub mod shared;
pub mod stock;

pub use error::MarketError;
pub use manager::StockManager;
pub use menu::{Menu, MenuChoice, MenuError, ParseError};
pub use price::{ParsePriceError, Price};
pub use shared::SharedStockManager;
pub use stock::{Stock, Timestamp};
