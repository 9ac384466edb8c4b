//! The instrumented hash table engine.
//!
//! [`HashTable`] owns its bucket storage, strategy parameters and item count.
//! Every operation runs to completion and returns the diagnostics a renderer
//! needs: the initial hash index, the simple-hash derivation (when
//! applicable), the slot finally used, and the probe sequence.
//!
//! # Storage replacement
//!
//! Resizing and changing strategies never migrate buckets incrementally. The
//! live entries are copied out, fresh storage is allocated, and (for
//! resize) every entry is re-inserted through [`HashTable::set`] so it
//! experiences the current strategy and parameters.
//!
//! # Example
//!
//! ```
//! use hashscope::{CollisionResolution, HashTable, HashingStrategy};
//!
//! let mut table =
//!     HashTable::new(7, HashingStrategy::Simple, CollisionResolution::DoubleHashing).unwrap();
//! let outcome = table.set("ab", "first").unwrap();
//! assert!(!outcome.is_update);
//! assert_eq!(outcome.trace.initial_index, 293 % 7);
//! assert_eq!(table.get("ab").value.as_deref(), Some("first"));
//! ```

use crate::bucket::{Buckets, Entry, Slot};
use crate::error::{TableError, TableResult};
use crate::hashing::{
    CollisionResolution, HashStep, Hashed, Hasher, HashingStrategy, Substitution,
    UniversalParams,
};
use crate::probe::{SlotSearch, find_slot};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// Largest capacity a table accepts.
pub const MAX_TABLE_SIZE: usize = 1 << 24;

/// Load factor at which open addressing inserts recommend a resize.
pub const DEFAULT_LOAD_FACTOR_WARNING: f64 = 0.7;

/// When universal-hash parameters are drawn again.
///
/// Parameters are always regenerated on a strategy change, and whenever they
/// stop being valid for the table size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UniversalRegeneration {
    /// Keep parameters across resizes so hash values stay stable.
    #[default]
    OnStrategyChange,
    /// Also draw new parameters on every resize.
    OnResize,
}

/// Construction options for a [`HashTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    /// Requested capacity (clamped to at least 1).
    pub size: usize,
    /// Primary hash function.
    pub hashing: HashingStrategy,
    /// Collision policy.
    pub collision: CollisionResolution,
    /// Universal parameter regeneration policy.
    pub universal_regeneration: UniversalRegeneration,
    /// Load factor at which open addressing inserts recommend a resize.
    pub load_factor_warning: f64,
    /// Seed for parameter generation. `None` draws one from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            size: 11,
            hashing: HashingStrategy::default(),
            collision: CollisionResolution::default(),
            universal_regeneration: UniversalRegeneration::default(),
            load_factor_warning: DEFAULT_LOAD_FACTOR_WARNING,
            seed: None,
        }
    }
}

impl TableOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the requested capacity.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Set the hashing strategy.
    pub fn with_hashing(mut self, hashing: HashingStrategy) -> Self {
        self.hashing = hashing;
        self
    }

    /// Set the collision policy.
    pub fn with_collision(mut self, collision: CollisionResolution) -> Self {
        self.collision = collision;
        self
    }

    /// Set the universal parameter regeneration policy.
    pub fn with_universal_regeneration(mut self, policy: UniversalRegeneration) -> Self {
        self.universal_regeneration = policy;
        self
    }

    /// Set the load factor warning threshold.
    pub fn with_load_factor_warning(mut self, threshold: f64) -> Self {
        self.load_factor_warning = threshold;
        self
    }

    /// Use a fixed seed for deterministic parameters.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Diagnostics shared by every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    /// Primary hash index of the key.
    pub initial_index: usize,
    /// Per-character derivation; simple hashing only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<HashStep>>,
    /// Slot actually used, or `None` if no slot was read or written.
    pub final_index: Option<usize>,
    /// Number of probes (chaining: entries in the bucket examined).
    pub probes: usize,
    /// Slot indices visited, in order.
    pub probe_sequence: Vec<usize>,
}

impl Trace {
    fn chained(hashed: Hashed, final_index: Option<usize>, probes: usize) -> Self {
        let initial_index = hashed.index;
        Self {
            initial_index,
            steps: hashed.steps,
            final_index,
            probes,
            probe_sequence: vec![initial_index],
        }
    }

    fn probed(hashed: Hashed, final_index: Option<usize>, search: SlotSearch) -> Self {
        Self {
            initial_index: hashed.index,
            steps: hashed.steps,
            final_index,
            probes: search.probes,
            probe_sequence: search.probe_sequence,
        }
    }
}

/// Result of [`HashTable::set`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetOutcome {
    /// `true` if an existing entry's value was replaced.
    pub is_update: bool,
    /// The load factor had reached the warning threshold before this insert.
    pub resize_recommended: bool,
    /// Operation diagnostics.
    #[serde(flatten)]
    pub trace: Trace,
}

/// Result of [`HashTable::get`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetOutcome {
    /// The stored value, or `None` if the key is absent.
    pub value: Option<String>,
    /// Operation diagnostics.
    #[serde(flatten)]
    pub trace: Trace,
}

/// Result of [`HashTable::remove`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveOutcome {
    /// `true` if a live entry was removed.
    pub removed: bool,
    /// Operation diagnostics.
    #[serde(flatten)]
    pub trace: Trace,
}

/// Result of a rebuild ([`HashTable::resize`] or a parameter change).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeReport {
    /// Live entries before the rebuild.
    pub expected: usize,
    /// Entries successfully re-inserted.
    pub reinserted: usize,
    /// Keys that could not be re-inserted.
    pub dropped: Vec<String>,
    /// Defaults substituted while rebuilding.
    pub substitutions: Vec<Substitution>,
}

impl ResizeReport {
    /// Returns `true` if every entry survived the rebuild.
    pub fn is_consistent(&self) -> bool {
        self.expected == self.reinserted && self.dropped.is_empty()
    }
}

/// Point-in-time summary of a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStats {
    /// Requested capacity.
    pub size: usize,
    /// Effective array length.
    pub table_size: usize,
    /// Live entries.
    pub item_count: usize,
    /// `item_count / table_size`.
    pub load_factor: f64,
    /// See [`HashTable::collision_count`].
    pub collision_count: usize,
    /// Tombstoned slots.
    pub tombstones: usize,
    /// Active hashing strategy.
    pub hashing: HashingStrategy,
    /// Active collision policy.
    pub collision: CollisionResolution,
    /// Double-hashing step prime, when double hashing is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_prime: Option<u64>,
    /// When universal parameters are redrawn.
    pub universal_regeneration: UniversalRegeneration,
}

/// Hash table with pluggable hashing and collision strategies.
pub struct HashTable {
    size: usize,
    table_size: usize,
    collision: CollisionResolution,
    hasher: Hasher,
    buckets: Buckets,
    item_count: usize,
    regeneration: UniversalRegeneration,
    load_factor_warning: f64,
    rng: Xoshiro256PlusPlus,
}

impl HashTable {
    /// Create a table with default options for everything but the strategies.
    pub fn new(
        size: usize,
        hashing: HashingStrategy,
        collision: CollisionResolution,
    ) -> TableResult<Self> {
        Self::with_options(
            TableOptions::new()
                .with_size(size)
                .with_hashing(hashing)
                .with_collision(collision),
        )
    }

    /// Create a table from options.
    ///
    /// # Errors
    /// - [`TableError::InvalidSize`] if `size` exceeds [`MAX_TABLE_SIZE`]
    /// - [`TableError::InvalidLoadFactor`] if `load_factor_warning` is not
    ///   in `(0, 1]` (this includes NaN)
    pub fn with_options(options: TableOptions) -> TableResult<Self> {
        if options.size > MAX_TABLE_SIZE {
            return Err(TableError::InvalidSize(options.size as u64));
        }
        let threshold = options.load_factor_warning;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(TableError::InvalidLoadFactor(threshold));
        }

        let seed = options.seed.unwrap_or_else(rand::random);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

        let size = options.size.max(1);
        let table_size = options.collision.table_size_for(size);
        let universal = UniversalParams::generate(table_size, &mut rng);

        debug!(
            size,
            table_size,
            hashing = %options.hashing,
            collision = %options.collision,
            "creating hashtable"
        );

        Ok(Self {
            size,
            table_size,
            collision: options.collision,
            hasher: Hasher::new(options.hashing, universal, table_size),
            buckets: Buckets::fresh(options.collision, table_size),
            item_count: 0,
            regeneration: options.universal_regeneration,
            load_factor_warning: options.load_factor_warning,
            rng,
        })
    }

    // =========================================================================
    // Hashing
    // =========================================================================

    /// Primary hash of `key` under the current configuration.
    pub fn hash(&self, key: &str) -> Hashed {
        self.hasher.primary(key, self.table_size)
    }

    /// Secondary hash (probe step) of `key`; `None` unless double hashing.
    pub fn hash2(&self, key: &str) -> Option<usize> {
        match self.collision {
            CollisionResolution::DoubleHashing => Some(self.hasher.step(key, self.collision)),
            _ => None,
        }
    }

    /// Resolve `key` against open addressing storage; `None` under chaining.
    pub fn find_slot(&self, key: &str) -> Option<SlotSearch> {
        match &self.buckets {
            Buckets::Open(slots) => {
                let initial = self.hash(key).index;
                let step = self.hasher.step(key, self.collision);
                Some(find_slot(slots, key, initial, step))
            }
            Buckets::Chained(_) => None,
        }
    }

    // =========================================================================
    // Core operations
    // =========================================================================

    /// Insert or update `key`.
    ///
    /// # Errors
    /// - [`TableError::EmptyKey`] if `key` is empty
    /// - [`TableError::Overflow`] if open addressing has no room along the
    ///   key's probe sequence; the table is left unchanged
    pub fn set(&mut self, key: &str, value: &str) -> TableResult<SetOutcome> {
        if key.is_empty() {
            return Err(TableError::EmptyKey);
        }

        let hashed = self.hash(key);
        let index = hashed.index;

        match &mut self.buckets {
            Buckets::Chained(chains) => {
                let chain = &mut chains[index];
                let is_update = match chain.iter_mut().find(|e| e.key == key) {
                    Some(entry) => {
                        entry.value = value.to_string();
                        true
                    }
                    None => {
                        chain.push(Entry::new(key, value));
                        self.item_count += 1;
                        false
                    }
                };
                let probes = chain.len();

                Ok(SetOutcome {
                    is_update,
                    resize_recommended: false,
                    trace: Trace::chained(hashed, Some(index), probes),
                })
            }
            Buckets::Open(slots) => {
                let load_factor = self.item_count as f64 / self.table_size as f64;
                let resize_recommended = load_factor >= self.load_factor_warning;
                if resize_recommended {
                    warn!(
                        load_factor,
                        threshold = self.load_factor_warning,
                        "load factor high, resize recommended"
                    );
                }

                let step = self.hasher.step(key, self.collision);
                let search = find_slot(slots, key, index, step);

                let (slot, is_update) = match search.index {
                    Some(slot) => (slot, search.found),
                    None => {
                        return Err(TableError::Overflow {
                            key: key.to_string(),
                            table_size: self.table_size,
                        });
                    }
                };

                slots[slot] = Slot::Occupied(Entry::new(key, value));
                if !is_update {
                    self.item_count += 1;
                }

                Ok(SetOutcome {
                    is_update,
                    resize_recommended,
                    trace: Trace::probed(hashed, Some(slot), search),
                })
            }
        }
    }

    /// Look up `key`. Absence is reported in the outcome, never as an error.
    pub fn get(&self, key: &str) -> GetOutcome {
        let hashed = self.hash(key);
        let index = hashed.index;

        match &self.buckets {
            Buckets::Chained(chains) => {
                let chain = &chains[index];
                match chain.iter().position(|e| e.key == key) {
                    Some(pos) => GetOutcome {
                        value: Some(chain[pos].value.clone()),
                        trace: Trace::chained(hashed, Some(index), pos + 1),
                    },
                    None => GetOutcome {
                        value: None,
                        trace: Trace::chained(hashed, None, chain.len()),
                    },
                }
            }
            Buckets::Open(slots) => {
                let step = self.hasher.step(key, self.collision);
                let search = find_slot(slots, key, index, step);
                if search.found {
                    let slot = search.index;
                    let value = slot
                        .and_then(|i| slots[i].entry())
                        .map(|e| e.value.clone());
                    GetOutcome {
                        value,
                        trace: Trace::probed(hashed, slot, search),
                    }
                } else {
                    GetOutcome {
                        value: None,
                        trace: Trace::probed(hashed, None, search),
                    }
                }
            }
        }
    }

    /// Remove `key`. Open addressing leaves a tombstone in its slot.
    pub fn remove(&mut self, key: &str) -> RemoveOutcome {
        let hashed = self.hash(key);
        let index = hashed.index;

        match &mut self.buckets {
            Buckets::Chained(chains) => {
                let chain = &mut chains[index];
                match chain.iter().position(|e| e.key == key) {
                    Some(pos) => {
                        chain.remove(pos);
                        self.item_count -= 1;
                        RemoveOutcome {
                            removed: true,
                            trace: Trace::chained(hashed, Some(index), pos + 1),
                        }
                    }
                    None => {
                        let probes = chain.len();
                        RemoveOutcome {
                            removed: false,
                            trace: Trace::chained(hashed, None, probes),
                        }
                    }
                }
            }
            Buckets::Open(slots) => {
                let step = self.hasher.step(key, self.collision);
                let search = find_slot(slots, key, index, step);
                match (search.found, search.index) {
                    (true, Some(slot)) => {
                        slots[slot] = Slot::Tombstone;
                        self.item_count -= 1;
                        RemoveOutcome {
                            removed: true,
                            trace: Trace::probed(hashed, Some(slot), search),
                        }
                    }
                    _ => RemoveOutcome {
                        removed: false,
                        trace: Trace::probed(hashed, None, search),
                    },
                }
            }
        }
    }

    // =========================================================================
    // Resize and strategy changes
    // =========================================================================

    /// Rebuild the table with a new requested capacity.
    ///
    /// Entries that no longer fit are logged and listed in the report rather
    /// than aborting the rebuild.
    ///
    /// # Errors
    /// [`TableError::InvalidSize`] if `new_size` exceeds [`MAX_TABLE_SIZE`].
    pub fn resize(&mut self, new_size: usize) -> TableResult<ResizeReport> {
        if new_size > MAX_TABLE_SIZE {
            return Err(TableError::InvalidSize(new_size as u64));
        }

        let entries = self.buckets.live_entries();

        self.size = new_size.max(1);
        self.table_size = self.collision.table_size_for(self.size);
        self.hasher.retarget(self.table_size);

        let mut substitutions = Vec::new();
        if self.regeneration == UniversalRegeneration::OnResize {
            self.regenerate_universal();
        } else if let Some(substitution) = self.ensure_universal_valid() {
            substitutions.push(substitution);
        }

        debug!(
            size = self.size,
            table_size = self.table_size,
            entries = entries.len(),
            "resizing hashtable"
        );

        let mut report = self.rebuild(entries);
        report.substitutions = substitutions;
        Ok(report)
    }

    /// Switch strategies. All entries are discarded.
    ///
    /// A hashing-only change also clears the table, since existing entries
    /// would be unreachable under the new hash function.
    pub fn set_strategies(&mut self, hashing: HashingStrategy, collision: CollisionResolution) {
        debug!(
            from_hashing = %self.hasher.strategy(),
            from_collision = %self.collision,
            to_hashing = %hashing,
            to_collision = %collision,
            discarded = self.item_count,
            "changing strategies"
        );

        self.collision = collision;
        self.table_size = collision.table_size_for(self.size);
        self.hasher.set_strategy(hashing);
        self.hasher.retarget(self.table_size);
        if hashing == HashingStrategy::Universal {
            self.regenerate_universal();
        } else {
            self.ensure_universal_valid();
        }
        self.clear();
    }

    /// Switch strategies by name, substituting defaults for unknown names.
    pub fn set_strategies_by_name(&mut self, hashing: &str, collision: &str) -> Vec<Substitution> {
        let (hashing, h) = HashingStrategy::parse_lenient(hashing);
        let (collision, c) = CollisionResolution::parse_lenient(collision);
        self.set_strategies(hashing, collision);
        h.into_iter().chain(c).collect()
    }

    /// Install explicit universal-hash parameters and rehash existing entries.
    ///
    /// Parameters that violate the family's constraints are replaced with
    /// freshly generated ones and reported as a substitution.
    pub fn set_universal_params(&mut self, params: UniversalParams) -> ResizeReport {
        let mut substitutions = Vec::new();
        if params.is_valid_for(self.table_size) {
            self.hasher.set_universal(params);
        } else {
            warn!(?params, "invalid universal parameters, regenerating");
            self.regenerate_universal();
            substitutions.push(Substitution::RegeneratedUniversalParams);
        }

        let entries = self.buckets.live_entries();
        let mut report = self.rebuild(entries);
        report.substitutions = substitutions;
        report
    }

    /// Discard all entries, keeping capacity and strategies.
    pub fn clear(&mut self) {
        self.buckets = Buckets::fresh(self.collision, self.table_size);
        self.item_count = 0;
    }

    fn rebuild(&mut self, entries: Vec<Entry>) -> ResizeReport {
        self.clear();

        let mut report = ResizeReport {
            expected: entries.len(),
            ..Default::default()
        };

        for entry in entries {
            match self.set(&entry.key, &entry.value) {
                Ok(_) => report.reinserted += 1,
                Err(e) => {
                    error!(key = %entry.key, error = %e, "failed to re-insert entry");
                    report.dropped.push(entry.key);
                }
            }
        }

        if self.item_count != report.expected {
            warn!(
                expected = report.expected,
                actual = self.item_count,
                "item count changed during rebuild"
            );
        }

        report
    }

    fn regenerate_universal(&mut self) {
        let params = UniversalParams::generate(self.table_size, &mut self.rng);
        self.hasher.set_universal(params);
    }

    fn ensure_universal_valid(&mut self) -> Option<Substitution> {
        if self.hasher.universal().is_valid_for(self.table_size) {
            return None;
        }
        warn!("universal parameters invalid for table size, regenerating");
        self.regenerate_universal();
        Some(Substitution::RegeneratedUniversalParams)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Raw bucket storage for rendering.
    #[inline]
    pub fn buckets(&self) -> &Buckets {
        &self.buckets
    }

    /// `item_count / table_size`.
    pub fn load_factor(&self) -> f64 {
        self.item_count as f64 / self.table_size as f64
    }

    /// Diagnostic collision count.
    ///
    /// Chaining counts buckets holding more than one entry. Open addressing
    /// counts entries that sit away from their primary hash index.
    pub fn collision_count(&self) -> usize {
        match &self.buckets {
            Buckets::Chained(chains) => chains.iter().filter(|c| c.len() > 1).count(),
            Buckets::Open(slots) => slots
                .iter()
                .enumerate()
                .filter_map(|(i, slot)| slot.entry().map(|e| (i, e)))
                .filter(|(i, e)| self.hash(&e.key).index != *i)
                .count(),
        }
    }

    /// Requested capacity.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Effective array length (prime for open addressing).
    #[inline]
    pub fn table_size(&self) -> usize {
        self.table_size
    }

    /// Number of live entries.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Active `(hashing, collision)` strategies.
    #[inline]
    pub fn strategies(&self) -> (HashingStrategy, CollisionResolution) {
        (self.hasher.strategy(), self.collision)
    }

    /// Current universal-hash parameters.
    #[inline]
    pub fn universal_params(&self) -> UniversalParams {
        self.hasher.universal()
    }

    /// Double-hashing step prime `R`; `None` unless double hashing is active.
    pub fn step_prime(&self) -> Option<u64> {
        match self.collision {
            CollisionResolution::DoubleHashing => Some(self.hasher.step_prime()),
            _ => None,
        }
    }

    /// Universal parameter regeneration policy.
    #[inline]
    pub fn universal_regeneration(&self) -> UniversalRegeneration {
        self.regeneration
    }

    /// Summary of the table's current state.
    pub fn stats(&self) -> TableStats {
        TableStats {
            size: self.size,
            table_size: self.table_size,
            item_count: self.item_count,
            load_factor: self.load_factor(),
            collision_count: self.collision_count(),
            tombstones: self.buckets.tombstones(),
            hashing: self.hasher.strategy(),
            collision: self.collision,
            step_prime: self.step_prime(),
            universal_regeneration: self.universal_regeneration(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(size: usize, hashing: HashingStrategy, collision: CollisionResolution) -> HashTable {
        HashTable::with_options(
            TableOptions::new()
                .with_size(size)
                .with_hashing(hashing)
                .with_collision(collision)
                .with_seed(7),
        )
        .unwrap()
    }

    // simple hash: "ab" -> 293 % 7 = 6, "h" -> 104 % 7 = 6
    const COLLIDING: [&str; 2] = ["ab", "h"];

    #[test]
    fn test_table_creation() {
        let t = table(10, HashingStrategy::Simple, CollisionResolution::Chaining);
        assert_eq!(t.size(), 10);
        assert_eq!(t.table_size(), 10);
        assert_eq!(t.item_count(), 0);
        assert_eq!(t.step_prime(), None);

        let t = table(10, HashingStrategy::Simple, CollisionResolution::LinearProbing);
        assert_eq!(t.table_size(), 11);

        let t = table(10, HashingStrategy::Simple, CollisionResolution::DoubleHashing);
        assert_eq!(t.table_size(), 11);
        assert_eq!(t.step_prime(), Some(7));

        let t = table(0, HashingStrategy::Simple, CollisionResolution::Chaining);
        assert_eq!(t.size(), 1);
        assert_eq!(t.table_size(), 1);
    }

    #[test]
    fn test_table_creation_too_large() {
        let result = HashTable::new(
            MAX_TABLE_SIZE + 1,
            HashingStrategy::Simple,
            CollisionResolution::Chaining,
        );
        assert!(matches!(result, Err(TableError::InvalidSize(_))));
    }

    #[test]
    fn test_table_creation_invalid_load_factor() {
        for threshold in [0.0, -0.5, 1.5, f64::NAN, f64::INFINITY] {
            let result = HashTable::with_options(
                TableOptions::new()
                    .with_collision(CollisionResolution::LinearProbing)
                    .with_load_factor_warning(threshold),
            );
            assert!(
                matches!(result, Err(TableError::InvalidLoadFactor(_))),
                "threshold {} accepted",
                threshold
            );
        }

        let result = HashTable::with_options(TableOptions::new().with_load_factor_warning(1.0));
        assert!(result.is_ok());
    }

    #[test]
    fn test_set_empty_key() {
        let mut t = table(7, HashingStrategy::Simple, CollisionResolution::Chaining);
        assert_eq!(t.set("", "v"), Err(TableError::EmptyKey));
        assert_eq!(t.item_count(), 0);
    }

    #[test]
    fn test_chaining_set_get_remove() {
        let mut t = table(7, HashingStrategy::Simple, CollisionResolution::Chaining);

        let first = t.set(COLLIDING[0], "1").unwrap();
        assert!(!first.is_update);
        assert_eq!(first.trace.initial_index, 6);
        assert_eq!(first.trace.probes, 1);
        assert_eq!(first.trace.probe_sequence, vec![6]);

        let second = t.set(COLLIDING[1], "2").unwrap();
        assert_eq!(second.trace.initial_index, 6);
        assert_eq!(second.trace.probes, 2);
        assert_eq!(t.collision_count(), 1);

        let got = t.get(COLLIDING[1]);
        assert_eq!(got.value.as_deref(), Some("2"));
        assert_eq!(got.trace.probes, 2);
        assert_eq!(got.trace.final_index, Some(6));

        let removed = t.remove(COLLIDING[0]);
        assert!(removed.removed);
        assert_eq!(t.item_count(), 1);
        assert_eq!(t.get(COLLIDING[0]).value, None);
        assert_eq!(t.get(COLLIDING[1]).value.as_deref(), Some("2"));
        assert_eq!(t.collision_count(), 0);
    }

    #[test]
    fn test_chaining_update_in_place() {
        let mut t = table(7, HashingStrategy::Simple, CollisionResolution::Chaining);
        t.set("ab", "1").unwrap();
        t.set("h", "2").unwrap();

        let outcome = t.set("ab", "3").unwrap();
        assert!(outcome.is_update);
        assert_eq!(t.item_count(), 2);

        // insertion order within the chain is preserved
        match t.buckets() {
            Buckets::Chained(chains) => {
                assert_eq!(chains[6][0], Entry::new("ab", "3"));
                assert_eq!(chains[6][1], Entry::new("h", "2"));
            }
            _ => panic!("expected chained storage"),
        }
    }

    #[test]
    fn test_linear_probing_collision() {
        let mut t = table(7, HashingStrategy::Simple, CollisionResolution::LinearProbing);

        t.set("ab", "1").unwrap();
        let outcome = t.set("h", "2").unwrap();
        assert_eq!(outcome.trace.initial_index, 6);
        assert_eq!(outcome.trace.final_index, Some(0));
        assert_eq!(outcome.trace.probe_sequence, vec![6, 0]);
        assert_eq!(outcome.trace.probes, 2);
        assert_eq!(t.collision_count(), 1);
    }

    #[test]
    fn test_open_addressing_update_keeps_count() {
        let mut t = table(7, HashingStrategy::Simple, CollisionResolution::DoubleHashing);
        t.set("key", "1").unwrap();
        let outcome = t.set("key", "2").unwrap();
        assert!(outcome.is_update);
        assert_eq!(t.item_count(), 1);
        assert_eq!(t.get("key").value.as_deref(), Some("2"));
    }

    #[test]
    fn test_remove_leaves_tombstone() {
        let mut t = table(7, HashingStrategy::Simple, CollisionResolution::LinearProbing);
        t.set("ab", "1").unwrap();
        t.set("h", "2").unwrap();

        let removed = t.remove("ab");
        assert!(removed.removed);
        assert_eq!(removed.trace.final_index, Some(6));

        match t.buckets() {
            Buckets::Open(slots) => assert_eq!(slots[6], Slot::Tombstone),
            _ => panic!("expected open addressing storage"),
        }

        let got = t.get("h");
        assert_eq!(got.value.as_deref(), Some("2"));
        assert_eq!(got.trace.probe_sequence, vec![6, 0]);

        // reinsertion reuses the tombstone
        let outcome = t.set("ab", "3").unwrap();
        assert_eq!(outcome.trace.final_index, Some(6));
        assert_eq!(t.buckets().tombstones(), 0);
    }

    #[test]
    fn test_remove_missing() {
        let mut t = table(7, HashingStrategy::Simple, CollisionResolution::LinearProbing);
        let outcome = t.remove("missing");
        assert!(!outcome.removed);
        assert_eq!(outcome.trace.final_index, None);
        assert_eq!(t.item_count(), 0);

        let mut t = table(7, HashingStrategy::Simple, CollisionResolution::Chaining);
        assert!(!t.remove("missing").removed);
    }

    #[test]
    fn test_overflow_leaves_table_unchanged() {
        let mut t = table(3, HashingStrategy::Simple, CollisionResolution::LinearProbing);
        assert_eq!(t.table_size(), 3);
        for key in ["a", "b", "c"] {
            t.set(key, key).unwrap();
        }

        let before = t.buckets().clone();
        let err = t.set("d", "d").unwrap_err();
        assert!(err.is_overflow());
        assert_eq!(t.buckets(), &before);
        assert_eq!(t.item_count(), 3);
    }

    #[test]
    fn test_resize_recommended() {
        let mut t = HashTable::with_options(
            TableOptions::new()
                .with_size(5)
                .with_collision(CollisionResolution::LinearProbing)
                .with_load_factor_warning(0.5)
                .with_seed(1),
        )
        .unwrap();

        assert!(!t.set("a", "1").unwrap().resize_recommended);
        assert!(!t.set("b", "2").unwrap().resize_recommended);
        assert!(!t.set("c", "3").unwrap().resize_recommended);
        // 3 / 5 >= 0.5
        assert!(t.set("d", "4").unwrap().resize_recommended);
    }

    #[test]
    fn test_universal_has_no_steps() {
        let mut t = table(11, HashingStrategy::Universal, CollisionResolution::Chaining);
        let outcome = t.set("key", "value").unwrap();
        assert!(outcome.trace.steps.is_none());
        assert!(outcome.trace.initial_index < 11);

        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("steps").is_none());
        assert!(json.get("initialIndex").is_some());
    }

    #[test]
    fn test_simple_has_steps() {
        let mut t = table(11, HashingStrategy::Simple, CollisionResolution::Chaining);
        let outcome = t.set("ab", "value").unwrap();
        let steps = outcome.trace.steps.as_ref().unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].subtotal, 293);

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["isUpdate"], false);
        assert_eq!(json["steps"][1]["subtotal"], 293);
        assert_eq!(json["probeSequence"][0], 293 % 11);
    }

    #[test]
    fn test_hash2() {
        let t = table(7, HashingStrategy::Simple, CollisionResolution::DoubleHashing);
        let step = t.hash2("key").unwrap();
        assert!((1..=5).contains(&step));

        let t = table(7, HashingStrategy::Simple, CollisionResolution::LinearProbing);
        assert_eq!(t.hash2("key"), None);
    }

    #[test]
    fn test_find_slot_chaining() {
        let t = table(7, HashingStrategy::Simple, CollisionResolution::Chaining);
        assert!(t.find_slot("key").is_none());
    }

    #[test]
    fn test_resize_preserves_entries() {
        let mut t = table(5, HashingStrategy::Simple, CollisionResolution::LinearProbing);
        for key in ["one", "two", "three"] {
            t.set(key, key).unwrap();
        }
        t.remove("two");

        let report = t.resize(20).unwrap();
        assert!(report.is_consistent());
        assert_eq!(report.expected, 2);
        assert_eq!(t.table_size(), 23);
        assert_eq!(t.item_count(), 2);
        assert_eq!(t.buckets().tombstones(), 0);
        assert_eq!(t.get("one").value.as_deref(), Some("one"));
        assert_eq!(t.get("three").value.as_deref(), Some("three"));
    }

    #[test]
    fn test_resize_too_small_reports_dropped() {
        let mut t = table(11, HashingStrategy::Simple, CollisionResolution::LinearProbing);
        for key in ["a", "b", "c", "d", "e"] {
            t.set(key, key).unwrap();
        }

        // 3 slots for 5 entries
        let report = t.resize(3).unwrap();
        assert!(!report.is_consistent());
        assert_eq!(report.expected, 5);
        assert_eq!(report.reinserted, 3);
        assert_eq!(report.dropped.len(), 2);
        assert_eq!(t.item_count(), 3);
    }

    #[test]
    fn test_resize_chaining_never_drops() {
        let mut t = table(8, HashingStrategy::Simple, CollisionResolution::Chaining);
        for i in 0..20 {
            t.set(&format!("key{}", i), "v").unwrap();
        }
        let report = t.resize(0).unwrap();
        assert!(report.is_consistent());
        assert_eq!(t.size(), 1);
        assert_eq!(t.table_size(), 1);
        assert_eq!(t.item_count(), 20);
        assert!((t.load_factor() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_updates_step_prime() {
        let mut t = table(7, HashingStrategy::Simple, CollisionResolution::DoubleHashing);
        assert_eq!(t.step_prime(), Some(5));
        t.resize(12).unwrap();
        assert_eq!(t.table_size(), 13);
        assert_eq!(t.step_prime(), Some(11));
    }

    #[test]
    fn test_resize_keeps_universal_params() {
        let mut t = table(11, HashingStrategy::Universal, CollisionResolution::Chaining);
        let before = t.universal_params();
        t.resize(50).unwrap();
        assert_eq!(t.universal_params(), before);
    }

    #[test]
    fn test_resize_regenerates_universal_params() {
        let mut t = HashTable::with_options(
            TableOptions::new()
                .with_size(11)
                .with_hashing(HashingStrategy::Universal)
                .with_universal_regeneration(UniversalRegeneration::OnResize)
                .with_seed(3),
        )
        .unwrap();
        let before = t.universal_params();
        t.resize(50).unwrap();
        assert_ne!(t.universal_params(), before);
    }

    #[test]
    fn test_resize_too_large() {
        let mut t = table(11, HashingStrategy::Simple, CollisionResolution::Chaining);
        t.set("a", "1").unwrap();
        assert!(matches!(
            t.resize(MAX_TABLE_SIZE + 1),
            Err(TableError::InvalidSize(_))
        ));
        assert_eq!(t.get("a").value.as_deref(), Some("1"));
    }

    #[test]
    fn test_set_strategies_clears() {
        let mut t = table(10, HashingStrategy::Simple, CollisionResolution::Chaining);
        t.set("a", "1").unwrap();
        t.set("b", "2").unwrap();

        t.set_strategies(HashingStrategy::Simple, CollisionResolution::LinearProbing);
        assert_eq!(t.load_factor(), 0.0);
        assert_eq!(t.item_count(), 0);
        assert_eq!(t.table_size(), 11);
        assert!(matches!(t.buckets(), Buckets::Open(_)));
        assert_eq!(t.get("a").value, None);
    }

    #[test]
    fn test_set_strategies_hashing_only_clears() {
        let mut t = table(10, HashingStrategy::Simple, CollisionResolution::Chaining);
        t.set("a", "1").unwrap();
        t.set_strategies(HashingStrategy::Universal, CollisionResolution::Chaining);
        assert_eq!(t.item_count(), 0);
        assert_eq!(t.strategies(), (HashingStrategy::Universal, CollisionResolution::Chaining));
    }

    #[test]
    fn test_set_strategies_regenerates_universal() {
        let mut t = table(10, HashingStrategy::Universal, CollisionResolution::Chaining);
        let before = t.universal_params();
        t.set_strategies(HashingStrategy::Universal, CollisionResolution::DoubleHashing);
        assert_ne!(t.universal_params(), before);
        assert_eq!(t.step_prime(), Some(7));
    }

    #[test]
    fn test_set_strategies_by_name() {
        let mut t = table(10, HashingStrategy::Universal, CollisionResolution::Chaining);
        let substitutions = t.set_strategies_by_name("murmur", "double");
        assert_eq!(
            substitutions,
            vec![Substitution::UnknownHashing("murmur".to_string())]
        );
        assert_eq!(
            t.strategies(),
            (HashingStrategy::Simple, CollisionResolution::DoubleHashing)
        );

        let substitutions = t.set_strategies_by_name("universal", "linear-probing");
        assert!(substitutions.is_empty());
    }

    #[test]
    fn test_set_universal_params_invalid() {
        let mut t = table(11, HashingStrategy::Universal, CollisionResolution::Chaining);
        t.set("a", "1").unwrap();

        let report = t.set_universal_params(UniversalParams { p: 7, a: 0, b: 9 });
        assert_eq!(
            report.substitutions,
            vec![Substitution::RegeneratedUniversalParams]
        );
        assert!(t.universal_params().is_valid_for(t.table_size()));
        assert!(report.is_consistent());
        assert_eq!(t.get("a").value.as_deref(), Some("1"));
    }

    #[test]
    fn test_resize_regenerates_invalid_universal_params() {
        let mut t = table(11, HashingStrategy::Universal, CollisionResolution::Chaining);
        let params = UniversalParams { p: 13, a: 5, b: 3 };
        assert!(t.set_universal_params(params).substitutions.is_empty());
        for key in ["x", "y", "z"] {
            t.set(key, key).unwrap();
        }

        // p = 13 no longer exceeds the table size
        let report = t.resize(40).unwrap();
        assert_eq!(
            report.substitutions,
            vec![Substitution::RegeneratedUniversalParams]
        );
        assert!(report.is_consistent());
        assert_ne!(t.universal_params(), params);
        assert!(t.universal_params().is_valid_for(t.table_size()));
        for key in ["x", "y", "z"] {
            assert_eq!(t.get(key).value.as_deref(), Some(key));
        }
    }

    #[test]
    fn test_set_universal_params_rehashes() {
        let mut t = table(11, HashingStrategy::Universal, CollisionResolution::LinearProbing);
        for key in ["x", "y", "z"] {
            t.set(key, key).unwrap();
        }
        let params = UniversalParams {
            p: 1_000_000_007,
            a: 12345,
            b: 678,
        };
        let report = t.set_universal_params(params);
        assert!(report.substitutions.is_empty());
        assert!(report.is_consistent());
        assert_eq!(t.universal_params(), params);
        for key in ["x", "y", "z"] {
            assert_eq!(t.get(key).value.as_deref(), Some(key));
        }
    }

    #[test]
    fn test_seeded_tables_agree() {
        let a = table(11, HashingStrategy::Universal, CollisionResolution::Chaining);
        let b = table(11, HashingStrategy::Universal, CollisionResolution::Chaining);
        assert_eq!(a.universal_params(), b.universal_params());
        assert_eq!(a.hash("key"), b.hash("key"));
    }

    #[test]
    fn test_stats() {
        let mut t = table(7, HashingStrategy::Simple, CollisionResolution::LinearProbing);
        t.set("ab", "1").unwrap();
        t.set("h", "2").unwrap();
        t.remove("ab");

        let stats = t.stats();
        assert_eq!(stats.table_size, 7);
        assert_eq!(stats.item_count, 1);
        assert_eq!(stats.tombstones, 1);
        assert_eq!(stats.collision_count, 1);
        assert_eq!(stats.step_prime, None);
        assert_eq!(
            stats.universal_regeneration,
            UniversalRegeneration::OnStrategyChange
        );

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["universalRegeneration"], "on-strategy-change");
    }
}
