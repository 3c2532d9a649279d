//! Basic usage examples for stockbook.

use ranktree::{Key, RankTree};
use stockbook::{Price, SharedStockManager, StockManager};

fn main() {
    example_rank_tree();
    example_stock_manager();
    example_shared();
}

fn example_rank_tree() {
    println!("=== RankTree (composite keys) ===\n");

    let mut tree: RankTree<u32, &str, u32> = RankTree::new();
    for (i, (price, id)) in [(40, "d"), (10, "a"), (30, "c"), (20, "b"), (5, "e")]
        .into_iter()
        .enumerate()
    {
        tree.insert_entry(price, id, i as u32);
    }

    let (lo, hi) = (Key::primary_only(10), Key::primary_only(30));
    println!("Entries: {tree:?}");
    println!("Count in [10, 30]: {}", tree.range_count(&lo, &hi));
    for (key, value) in tree.range(&lo, &hi) {
        println!("  {key:?} -> {value}");
    }
    if let Some(leaf) = tree.find(&Key::new(20, "b")) {
        println!("Rank of (20, b): {:?}", tree.rank(leaf));
    }
    println!("Height: {}\n", tree.height());
}

fn example_stock_manager() {
    println!("=== StockManager ===\n");

    let price = |s: &str| s.parse::<Price>().unwrap();
    let mut book = StockManager::new();
    book.add_stock("AAPL", 1, price("150")).unwrap();
    book.add_stock("MSFT", 1, price("300.5")).unwrap();
    book.add_stock("NVDA", 1, price("120.25")).unwrap();

    book.update_stock("AAPL", 2, price("-25.25")).unwrap();
    println!("AAPL = {}", book.stock_price("AAPL").unwrap());

    let (lo, hi) = (price("100"), price("200"));
    println!(
        "In [{lo}, {hi}]: {} -> {:?}",
        book.amount_stocks_in_price_range(lo, hi).unwrap(),
        book.stocks_in_price_range(lo, hi).unwrap()
    );

    book.remove_stock_timestamp("AAPL", 2).unwrap();
    println!("AAPL after revert = {}", book.stock_price("AAPL").unwrap());

    if let Err(e) = book.remove_stock_timestamp("AAPL", 1) {
        println!("Rejected: {e}");
    }
    if let Some(stock) = book.stock("AAPL") {
        println!("AAPL history: {:?}\n", stock.changes().collect::<Vec<_>>());
    }
}

fn example_shared() {
    println!("=== SharedStockManager ===\n");

    let book = SharedStockManager::new();
    std::thread::scope(|s| {
        for t in 0..4 {
            let book = &book;
            s.spawn(move || {
                for i in 0..10 {
                    let id = format!("T{t}-{i}");
                    book.add_stock(&id, 1, Price::from_whole(i + 1)).unwrap();
                }
            });
        }
    });
    println!("Stocks: {}", book.len());
    println!(
        "Priced 1..=5: {}",
        book.amount_stocks_in_price_range(Price::from_whole(1), Price::from_whole(5))
            .unwrap()
    );
}
