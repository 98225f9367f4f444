pub mod orders;
pub mod shards;
pub mod transactions;

pub use orders::OrderBook;
pub use shards::{MonthShards, YearMonthShards, transaction_shard};
pub use transactions::TransactionLedger;
