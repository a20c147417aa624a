//! Storage Adapters
//!
//! Implementations of the `TransactionStore` port.
//!
//! ## Available Adapters
//!
//! - **InMemoryTransactionStore** - Per-key locked records in process memory
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::InMemoryTransactionStore;
//!
//! let store = Arc::new(InMemoryTransactionStore::new());
//! ```

mod in_memory_transaction_store;

pub use in_memory_transaction_store::InMemoryTransactionStore;
