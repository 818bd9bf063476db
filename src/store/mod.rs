//! The tree store: a single actor owning a JSON tree, addressed by
//! slash-separated paths, with full-node reads, set/merge/remove writes,
//! push-style inserts, and an atomic conditional commit.

mod actor;
mod client;
mod error;
mod msg;
mod path;
mod tree;
mod tx;

pub use actor::StoreActor;
pub use client::StoreClient;
pub use error::StoreError;
pub use msg::{Response, StoreRequest, StoreResult};
pub use path::{paths, Path};
pub use tx::{Adjust, Cond, Guard, Transaction};
