//! hashscope: an instrumented hash table engine for visualization.
//!
//! The core is [`HashTable`], a table with pluggable hashing and collision
//! strategies whose every operation reports how it reached its answer:
//!
//! - **Hashing**: simple position-weighted sums (with a per-character trace)
//!   or universal hashing `((a * k + b) mod p) mod m`
//! - **Collision resolution**: chaining, linear probing, or double hashing
//! - **Slot resolution**: one shared probe routine for get, set, and remove,
//!   with tombstones preserving probe sequences across deletions
//! - **Resize / strategy changes**: full storage replacement, with a report
//!   of any entries that did not survive
//!
//! # Architecture
//!
//! ```text
//!            +-------------+      +-------------+
//!   key ---> |   Hasher    | ---> |  find_slot  |
//!            | (h1 and h2) |      |  (probing)  |
//!            +-------------+      +------+------+
//!                                        |
//!                                        v
//!                                 +-------------+
//!                                 |   Buckets   |
//!                                 | chained or  |
//!                                 | open slots  |
//!                                 +-------------+
//! ```
//!
//! The binary search tree, self-organizing list and skip list shown by the
//! visualizer live in [`structures`]. [`session`] drives all of them from
//! text commands.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core types
mod bucket;
mod error;
mod hashing;
mod prime;
mod probe;
mod table;

// Ambient
pub mod config;
pub mod logging;
pub mod session;

// Other visualized structures
pub mod structures;

// Re-exports
pub use bucket::{Buckets, Entry, Slot};
pub use error::{TableError, TableResult};
pub use hashing::{
    CollisionResolution, HashStep, Hashed, Hasher, HashingStrategy, Substitution,
    UniversalParams, key_to_int, secondary_step, simple_hash,
};
pub use prime::{is_prime, next_prime, prev_prime};
pub use probe::{ProbeSequence, SlotSearch, find_slot};
pub use table::{
    DEFAULT_LOAD_FACTOR_WARNING, GetOutcome, HashTable, MAX_TABLE_SIZE, RemoveOutcome,
    ResizeReport, SetOutcome, TableOptions, TableStats, Trace, UniversalRegeneration,
};
