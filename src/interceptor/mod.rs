//! The two decision-making pipeline stages.
//!
//! - `ParameterLoader`: resolves load-directed handler parameters from
//!   storage before the handler runs, answering not-found when it cannot
//! - `TransactionInterceptor`: brackets the rest of the chain in one
//!   transaction, committed only when validation recorded no errors
//!
//! The default order puts the loader first, so a not-found request never
//! opens a transaction.

mod loader;
mod transaction;

pub use loader::ParameterLoader;
pub use transaction::{TransactionInterceptor, TransactionScope};
