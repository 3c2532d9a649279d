//! Interactive text menu over a [`StockManager`].
//!
//! Input is read one field per line from any [`BufRead`], output goes to any
//! [`Write`]. A failed request prints its error and the loop goes on; option
//! 8 or the end of input ends it.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

use crate::error::MarketError;
use crate::manager::StockManager;
use crate::price::{ParsePriceError, Price};
use crate::stock::Timestamp;

const MENU: &str = "\
Choose an option:
1. Add Stock
2. Remove Stock
3. Update Stock
4. Get Stock Price
5. Remove Stock Timestamp
6. Get Stock Count in Price Range
7. Get Stock IDs in Price Range
8. Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AddStock,
    RemoveStock,
    UpdateStock,
    StockPrice,
    RemoveTimestamp,
    CountInRange,
    ListInRange,
    Exit,
}

impl FromStr for MenuChoice {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let choice = match s.trim() {
            "1" => MenuChoice::AddStock,
            "2" => MenuChoice::RemoveStock,
            "3" => MenuChoice::UpdateStock,
            "4" => MenuChoice::StockPrice,
            "5" => MenuChoice::RemoveTimestamp,
            "6" => MenuChoice::CountInRange,
            "7" => MenuChoice::ListInRange,
            "8" => MenuChoice::Exit,
            other => return Err(ParseError::InvalidChoice(other.to_string())),
        };
        Ok(choice)
    }
}

/// Malformed menu input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid choice {0:?}")]
    InvalidChoice(String),
    #[error("input ended while reading {0}")]
    EndOfInput(&'static str),
    #[error("{0} can't be empty")]
    EmptyField(&'static str),
    #[error("{field} must be an integer, got {value:?}")]
    InvalidInteger { field: &'static str, value: String },
    #[error("{field}: {source}")]
    InvalidPrice {
        field: &'static str,
        source: ParsePriceError,
    },
}

#[derive(Debug, Error)]
pub enum MenuError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Market(#[from] MarketError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub struct Menu<R, W> {
    manager: StockManager,
    input: R,
    output: W,
    prompts: bool,
    line: String,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(manager: StockManager, input: R, output: W) -> Self {
        Self {
            manager,
            input,
            output,
            prompts: true,
            line: String::new(),
        }
    }

    /// Show or hide the menu listing and field prompts.
    pub fn prompts(mut self, enabled: bool) -> Self {
        self.prompts = enabled;
        self
    }

    pub fn manager(&self) -> &StockManager {
        &self.manager
    }

    pub fn into_parts(self) -> (StockManager, W) {
        (self.manager, self.output)
    }

    /// Serves requests until option 8 or the end of input. Only I/O failures
    /// are returned; request errors are printed.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            if self.prompts {
                writeln!(self.output, "\n{MENU}")?;
                write!(self.output, "Your choice: ")?;
                self.output.flush()?;
            }
            let Some(line) = self.next_line()? else {
                break;
            };
            let choice = match line.parse::<MenuChoice>() {
                Ok(MenuChoice::Exit) => break,
                Ok(choice) => choice,
                Err(err) => {
                    warn!(%err, "rejected menu input");
                    writeln!(self.output, "Invalid choice.")?;
                    continue;
                }
            };

            match self.serve(choice) {
                Ok(()) => {}
                Err(MenuError::Io(err)) => return Err(err),
                Err(MenuError::Parse(ParseError::EndOfInput(field))) => {
                    warn!(field, "input ended mid-request");
                    break;
                }
                Err(err) => {
                    warn!(?choice, %err, "request rejected");
                    writeln!(self.output, "Error: {err}")?;
                }
            }
        }
        writeln!(self.output, "Goodbye!")?;
        self.output.flush()
    }

    /// Reads the fields for `choice`, applies it and prints the outcome.
    pub fn serve(&mut self, choice: MenuChoice) -> Result<(), MenuError> {
        match choice {
            MenuChoice::AddStock => {
                let id = self.read_id()?;
                let timestamp = self.read_timestamp("Timestamp")?;
                let price = self.read_price("Price")?;
                self.manager.add_stock(&id, timestamp, price)?;
                writeln!(self.output, "Stock added.")?;
            }
            MenuChoice::RemoveStock => {
                let id = self.read_id()?;
                self.manager.remove_stock(&id)?;
                writeln!(self.output, "Stock removed.")?;
            }
            MenuChoice::UpdateStock => {
                let id = self.read_id()?;
                let timestamp = self.read_timestamp("Timestamp")?;
                let difference = self.read_price("Price difference")?;
                self.manager.update_stock(&id, timestamp, difference)?;
                writeln!(self.output, "Stock updated.")?;
            }
            MenuChoice::StockPrice => {
                let id = self.read_id()?;
                let price = self.manager.stock_price(&id)?;
                writeln!(self.output, "Stock price: {price}")?;
            }
            MenuChoice::RemoveTimestamp => {
                let id = self.read_id()?;
                let timestamp = self.read_timestamp("Timestamp")?;
                self.manager.remove_stock_timestamp(&id, timestamp)?;
                writeln!(self.output, "Timestamp removed.")?;
            }
            MenuChoice::CountInRange => {
                let lo = self.read_price("Min price")?;
                let hi = self.read_price("Max price")?;
                let count = self.manager.amount_stocks_in_price_range(lo, hi)?;
                writeln!(self.output, "Stock count in range: {count}")?;
            }
            MenuChoice::ListInRange => {
                let lo = self.read_price("Min price")?;
                let hi = self.read_price("Max price")?;
                let ids = self.manager.stocks_in_price_range(lo, hi)?;
                writeln!(self.output, "Stock IDs in range:")?;
                for id in ids {
                    writeln!(self.output, "- {id}")?;
                }
            }
            MenuChoice::Exit => {}
        }
        Ok(())
    }

    fn next_line(&mut self) -> io::Result<Option<String>> {
        self.line.clear();
        if self.input.read_line(&mut self.line)? == 0 {
            return Ok(None);
        }
        Ok(Some(self.line.trim().to_string()))
    }

    fn field(&mut self, name: &'static str) -> Result<String, MenuError> {
        if self.prompts {
            write!(self.output, "{name}: ")?;
            self.output.flush()?;
        }
        let value = self.next_line()?.ok_or(ParseError::EndOfInput(name))?;
        if value.is_empty() {
            return Err(ParseError::EmptyField(name).into());
        }
        Ok(value)
    }

    fn read_id(&mut self) -> Result<String, MenuError> {
        self.field("Stock ID")
    }

    fn read_timestamp(&mut self, name: &'static str) -> Result<Timestamp, MenuError> {
        let value = self.field(name)?;
        value
            .parse()
            .map_err(|_| ParseError::InvalidInteger { field: name, value }.into())
    }

    fn read_price(&mut self, name: &'static str) -> Result<Price, MenuError> {
        let value = self.field(name)?;
        value.parse().map_err(|source| {
            ParseError::InvalidPrice {
                field: name,
                source,
            }
            .into()
        })
    }
}
