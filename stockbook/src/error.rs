use ranktree::TreeError;
use thiserror::Error;

use crate::price::{ParsePriceError, Price};
use crate::stock::Timestamp;

/// Reasons a stock book request is rejected. A rejected request leaves the
/// book unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarketError {
    #[error("initial price must be positive, got {0}")]
    NonPositivePrice(Price),
    #[error("initial timestamp must be positive, got {0}")]
    NonPositiveTimestamp(Timestamp),
    #[error("timestamp can't be negative, got {0}")]
    NegativeTimestamp(Timestamp),
    #[error("price difference can't be 0")]
    ZeroDifference,
    #[error("stock {0:?} already exists")]
    StockExists(String),
    #[error("no stock with id {0:?}")]
    NoSuchStock(String),
    #[error("stock {id:?} already has a change at timestamp {timestamp}")]
    TimestampExists { id: String, timestamp: Timestamp },
    #[error("stock {id:?} has no change at timestamp {timestamp}")]
    NoSuchTimestamp { id: String, timestamp: Timestamp },
    #[error("timestamp {timestamp} is the initial price of stock {id:?} and can't be removed")]
    InitialTimestamp { id: String, timestamp: Timestamp },
    #[error("price interval [{lo}, {hi}] is empty")]
    InvalidRange { lo: Price, hi: Price },
    #[error(transparent)]
    InvalidPrice(#[from] ParsePriceError),
    #[error("price of stock {0:?} would overflow")]
    PriceOverflow(String),
    #[error("index corrupted: {0}")]
    Tree(#[from] TreeError),
}
