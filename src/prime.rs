//! Prime number helpers.
//!
//! Open addressing tables are sized to a prime so that double hashing visits
//! every slot, and the secondary step is derived from the largest prime below
//! the table size.

/// Returns `true` if `n` is prime.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }

    // 6k ± 1
    let mut i = 5u64;
    while i.saturating_mul(i) <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// Smallest prime greater than or equal to `n`.
pub fn next_prime(n: u64) -> u64 {
    let mut candidate = n.max(2);
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}

/// Largest prime strictly less than `n`, or `1` if there is none.
pub fn prev_prime(n: u64) -> u64 {
    let mut candidate = n.saturating_sub(1);
    while candidate >= 2 {
        if is_prime(candidate) {
            return candidate;
        }
        candidate -= 1;
    }
    1
}
