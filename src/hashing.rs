//! Hashing strategies and their parameters.
//!
//! This module provides:
//! - [`HashingStrategy`] / [`CollisionResolution`] - the closed set of policies
//! - [`HashStep`] - per-character derivation trace of the simple hash
//! - [`UniversalParams`] - the `(p, a, b)` triple of the universal family
//! - [`Hasher`] - primary (h1) and secondary (h2) hash dispatch

use crate::prime::{is_prime, next_prime, prev_prime};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Multiplier of the polynomial rolling hash used to turn keys into integers.
const ROLLING_MULTIPLIER: u64 = 31;

/// Universal-hash primes are drawn from `[UNIVERSAL_PRIME_MIN, UNIVERSAL_PRIME_MAX)`.
///
/// `p < 2^30` keeps `a * k + b` well inside `u64`.
const UNIVERSAL_PRIME_MIN: u64 = 1 << 28;
const UNIVERSAL_PRIME_MAX: u64 = 1 << 30;

/// Primary hash function selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashingStrategy {
    /// Position-weighted sum of character codes.
    #[default]
    Simple,
    /// `((a * k + b) mod p) mod m` with random `a`, `b`.
    Universal,
}

impl HashingStrategy {
    /// Parse a strategy name, falling back to [`HashingStrategy::Simple`].
    ///
    /// Unknown names never fail: the fallback is reported as a
    /// [`Substitution`] so callers can detect degraded mode.
    pub fn parse_lenient(name: &str) -> (Self, Option<Substitution>) {
        match name.parse() {
            Ok(strategy) => (strategy, None),
            Err(_) => {
                tracing::warn!(name, "unknown hashing strategy, using simple");
                (
                    Self::Simple,
                    Some(Substitution::UnknownHashing(name.to_string())),
                )
            }
        }
    }
}

impl FromStr for HashingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "universal" => Ok(Self::Universal),
            other => Err(format!(
                "invalid hashing strategy: '{}' (expected 'simple' or 'universal')",
                other
            )),
        }
    }
}

impl fmt::Display for HashingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Universal => write!(f, "universal"),
        }
    }
}

/// Collision resolution policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionResolution {
    /// Ordered list of entries per bucket.
    #[default]
    Chaining,
    /// Open addressing with a step of one.
    #[serde(alias = "linear")]
    LinearProbing,
    /// Open addressing with a key-dependent step from the secondary hash.
    #[serde(alias = "double")]
    DoubleHashing,
}

impl CollisionResolution {
    /// Returns `true` for the single-entry-per-slot policies.
    #[inline]
    pub fn is_open_addressing(&self) -> bool {
        !matches!(self, Self::Chaining)
    }

    /// Effective array length for a requested capacity.
    ///
    /// Open addressing rounds up to a prime; chaining uses the request as is.
    pub fn table_size_for(&self, size: usize) -> usize {
        if self.is_open_addressing() {
            next_prime(size as u64) as usize
        } else {
            size
        }
    }

    /// Parse a policy name, falling back to [`CollisionResolution::Chaining`].
    pub fn parse_lenient(name: &str) -> (Self, Option<Substitution>) {
        match name.parse() {
            Ok(policy) => (policy, None),
            Err(_) => {
                tracing::warn!(name, "unknown collision resolution, using chaining");
                (
                    Self::Chaining,
                    Some(Substitution::UnknownCollision(name.to_string())),
                )
            }
        }
    }
}

impl FromStr for CollisionResolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chaining" => Ok(Self::Chaining),
            "linear" | "linear-probing" | "linear_probing" => Ok(Self::LinearProbing),
            "double" | "double-hashing" | "double_hashing" => Ok(Self::DoubleHashing),
            other => Err(format!(
                "invalid collision resolution: '{}' (expected 'chaining', 'linear-probing', or 'double-hashing')",
                other
            )),
        }
    }
}

impl fmt::Display for CollisionResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chaining => write!(f, "chaining"),
            Self::LinearProbing => write!(f, "linear-probing"),
            Self::DoubleHashing => write!(f, "double-hashing"),
        }
    }
}

/// A default that was substituted for an invalid configuration.
///
/// The operation that produced it still succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "detail")]
pub enum Substitution {
    /// Unrecognized hashing strategy name; simple hashing was used.
    UnknownHashing(String),
    /// Unrecognized collision policy name; chaining was used.
    UnknownCollision(String),
    /// Universal parameters were unusable and were drawn again.
    RegeneratedUniversalParams,
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownHashing(name) => {
                write!(f, "unknown hashing strategy '{}', using simple", name)
            }
            Self::UnknownCollision(name) => {
                write!(f, "unknown collision resolution '{}', using chaining", name)
            }
            Self::RegeneratedUniversalParams => write!(f, "universal parameters regenerated"),
        }
    }
}

/// One character's contribution to the simple hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HashStep {
    /// The character.
    pub char: char,
    /// Its character code.
    pub code: u32,
    /// 1-based position within the key.
    pub position: usize,
    /// `code * position`.
    pub contribution: u64,
    /// Running sum including this character.
    pub subtotal: u64,
}

/// Convert a key to an integer in `[0, p)` with a polynomial rolling hash.
pub fn key_to_int(key: &str, p: u64) -> u64 {
    debug_assert!(p > 0);
    key.chars().fold(0u64, |k, c| {
        (k.wrapping_mul(ROLLING_MULTIPLIER) + c as u64) % p
    })
}

/// Simple hash: `sum(code(key[i]) * (i + 1)) mod table_size`, with its trace.
pub fn simple_hash(key: &str, table_size: usize) -> (usize, Vec<HashStep>) {
    debug_assert!(table_size > 0);
    let mut steps = Vec::with_capacity(key.len());
    let mut subtotal = 0u64;

    for (i, c) in key.chars().enumerate() {
        let code = c as u32;
        let position = i + 1;
        let contribution = (code as u64).wrapping_mul(position as u64);
        subtotal = subtotal.wrapping_add(contribution);
        steps.push(HashStep {
            char: c,
            code,
            position,
            contribution,
            subtotal,
        });
    }

    ((subtotal % table_size as u64) as usize, steps)
}

/// Double-hashing step: `r - (k mod r)`, always in `[1, r]`.
#[inline]
pub fn secondary_step(k: u64, r: u64) -> u64 {
    let r = r.max(1);
    r - (k % r)
}

/// Parameters of the universal hash family `((a * k + b) mod p) mod m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversalParams {
    /// Prime modulus exceeding the key space.
    pub p: u64,
    /// Multiplier in `[1, p - 1]`.
    pub a: u64,
    /// Offset in `[0, p - 1]`.
    pub b: u64,
}

impl UniversalParams {
    /// Draw a fresh parameter triple usable with `table_size`.
    pub fn generate<R: Rng>(table_size: usize, rng: &mut R) -> Self {
        let floor = UNIVERSAL_PRIME_MIN.max(table_size as u64 + 1);
        let ceiling = UNIVERSAL_PRIME_MAX.max(floor + 1);
        let p = next_prime(rng.random_range(floor..ceiling));
        let a = rng.random_range(1..p);
        let b = rng.random_range(0..p);
        Self { p, a, b }
    }

    /// Returns `true` if these parameters satisfy the family's constraints.
    pub fn is_valid_for(&self, table_size: usize) -> bool {
        self.p > table_size as u64
            && self.p < UNIVERSAL_PRIME_MAX * 2
            && is_prime(self.p)
            && (1..self.p).contains(&self.a)
            && self.b < self.p
    }

    /// Map an already-converted key to a slot index.
    #[inline]
    pub fn index(&self, k: u64, table_size: usize) -> usize {
        let m = table_size as u64;
        // k < p and a < p < 2^31, so a * k + b cannot overflow.
        (((self.a * (k % self.p) + self.b) % self.p) % m) as usize
    }
}

/// Result of applying the primary hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hashed {
    /// Initial slot index in `[0, table_size)`.
    pub index: usize,
    /// Derivation trace; present for the simple strategy only.
    pub steps: Option<Vec<HashStep>>,
}

/// Primary and secondary hash dispatch for one table configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hasher {
    strategy: HashingStrategy,
    universal: UniversalParams,
    step_prime: u64,
}

impl Hasher {
    /// Create a hasher. `step_prime` is derived from `table_size`.
    pub fn new(strategy: HashingStrategy, universal: UniversalParams, table_size: usize) -> Self {
        Self {
            strategy,
            universal,
            step_prime: prev_prime(table_size as u64),
        }
    }

    /// The active strategy.
    #[inline]
    pub fn strategy(&self) -> HashingStrategy {
        self.strategy
    }

    /// The universal parameters (kept even while the simple strategy is active).
    #[inline]
    pub fn universal(&self) -> UniversalParams {
        self.universal
    }

    /// The double-hashing step prime `R`.
    #[inline]
    pub fn step_prime(&self) -> u64 {
        self.step_prime
    }

    pub(crate) fn set_universal(&mut self, params: UniversalParams) {
        self.universal = params;
    }

    pub(crate) fn set_strategy(&mut self, strategy: HashingStrategy) {
        self.strategy = strategy;
    }

    /// Recompute parameters that depend on the effective array length.
    pub(crate) fn retarget(&mut self, table_size: usize) {
        self.step_prime = prev_prime(table_size as u64);
    }

    /// h1: the primary slot index of `key`.
    pub fn primary(&self, key: &str, table_size: usize) -> Hashed {
        match self.strategy {
            HashingStrategy::Simple => {
                let (index, steps) = simple_hash(key, table_size);
                Hashed {
                    index,
                    steps: Some(steps),
                }
            }
            HashingStrategy::Universal => {
                let k = key_to_int(key, self.universal.p);
                Hashed {
                    index: self.universal.index(k, table_size),
                    steps: None,
                }
            }
        }
    }

    /// h2: the probe step of `key` for `policy`.
    ///
    /// Linear probing and chaining always step by one.
    pub fn step(&self, key: &str, policy: CollisionResolution) -> usize {
        match policy {
            CollisionResolution::DoubleHashing => {
                let k = key_to_int(key, self.universal.p);
                secondary_step(k, self.step_prime) as usize
            }
            CollisionResolution::LinearProbing | CollisionResolution::Chaining => 1,
        }
    }
}
