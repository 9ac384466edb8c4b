//! The simpler structures shown alongside the hash table.
//!
//! Each operation reports the path it took so the traversal can be
//! replayed step by step.

mod bst;
mod linked_list;
mod skip_list;

pub use bst::{Bst, TreeVisit};
pub use linked_list::{ListVisit, SelfOrganizingList};
pub use skip_list::{MAX_LEVEL, SkipList, SkipStep, SkipVisit};
