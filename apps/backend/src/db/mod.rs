pub mod txn;

pub use txn::{with_txn, with_txn_retry, RetryPolicy, TxnFuture};
