//! # Identifier Schemes
//!
//! Human-readable identifiers for products, users and stock movements.
//!
//! ## Schemes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SEQUENTIAL  prefix + zero-padded counter                               │
//! │                                                                         │
//! │     P001, P002 … P999, P1000        (products)                         │
//! │     T001, T002 …                    (movement headers)                 │
//! │     TD001, TD002 …                  (movement details)                 │
//! │                                                                         │
//! │     next = parse(current max) + 1, re-rendered with the same padding   │
//! │                                                                         │
//! │  RANDOM      prefix + uppercase alphanumeric suffix                     │
//! │                                                                         │
//! │     TIN7Q2K9A, TOUTX81MZP           (movement headers)                 │
//! │     TD4J8QW21B                      (movement details)                 │
//! │                                                                         │
//! │  USER        4 chars from [A-Za-z0-9]                                   │
//! │                                                                         │
//! │     aZ3k, Q9x0                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This module only renders and parses. Finding the current maximum and
//! checking for collisions is the database layer's job.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::MovementType;

/// Characters used for random upper-case suffixes.
const UPPER_ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a user id.
pub const USER_ID_LEN: usize = 4;

/// Attempts at finding an unused random user id before falling back.
pub const USER_ID_MAX_TRIES: usize = 100;

// =============================================================================
// Sequential Ids
// =============================================================================

/// Prefix + zero-padded decimal counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequentialId {
    prefix: &'static str,
    width: usize,
}

/// Product ids: `P001`.
pub const PRODUCT_IDS: SequentialId = SequentialId::new("P", 3);

/// Movement header ids: `T001`.
pub const TRANSACTION_IDS: SequentialId = SequentialId::new("T", 3);

/// Movement detail ids: `TD001`.
pub const DETAIL_IDS: SequentialId = SequentialId::new("TD", 3);

impl SequentialId {
    pub const fn new(prefix: &'static str, width: usize) -> Self {
        SequentialId { prefix, width }
    }

    #[inline]
    pub const fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// The id issued when nothing exists yet.
    pub fn first(&self) -> String {
        self.render(1)
    }

    /// Renders `n` padded to the scheme width. Wider numbers are never
    /// truncated: `T999` is followed by `T1000`.
    pub fn render(&self, n: u64) -> String {
        format!("{}{:0width$}", self.prefix, n, width = self.width)
    }

    /// Extracts the counter from an id of exactly this shape.
    ///
    /// Returns `None` for anything else: other prefixes, random suffixes,
    /// empty counters.
    ///
    /// ```rust
    /// use stockroom_core::ids::SequentialId;
    ///
    /// let t = SequentialId::new("T", 3);
    /// assert_eq!(t.parse("T042"), Some(42));
    /// assert_eq!(t.parse("TD042"), None);
    /// assert_eq!(t.parse("TINAB12"), None);
    /// ```
    pub fn parse(&self, id: &str) -> Option<u64> {
        let digits = id.strip_prefix(self.prefix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// The id following `current`, or [`first`](Self::first) when there is
    /// no usable current id.
    pub fn next_after(&self, current: Option<&str>) -> String {
        match current.and_then(|id| self.parse(id)) {
            Some(n) => self.render(n.saturating_add(1)),
            None => self.first(),
        }
    }
}

// =============================================================================
// Random Ids
// =============================================================================

/// Prefix + random uppercase alphanumeric suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomId {
    prefix: &'static str,
    len: usize,
}

impl RandomId {
    pub const fn new(prefix: &'static str, len: usize) -> Self {
        RandomId { prefix, len }
    }

    #[inline]
    pub const fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// Generates one candidate id. Uniqueness is checked by the caller.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let mut id = String::with_capacity(self.prefix.len() + self.len);
        id.push_str(self.prefix);
        for _ in 0..self.len {
            let idx = rng.gen_range(0..UPPER_ALPHANUMERIC.len());
            id.push(UPPER_ALPHANUMERIC[idx] as char);
        }
        id
    }
}

// =============================================================================
// Scheme Selection
// =============================================================================

/// Which identifier scheme stock movements use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    /// `T001` / `TD001`.
    #[default]
    Sequential,
    /// `TIN…` / `TOUT…` / `TD…` with random suffixes.
    Random,
}

impl IdScheme {
    /// Random header scheme for a movement direction.
    pub const fn random_header(movement: MovementType) -> RandomId {
        match movement {
            MovementType::In => RandomId::new("TIN", 6),
            MovementType::Out => RandomId::new("TOUT", 6),
        }
    }

    /// Random detail scheme.
    pub const fn random_detail() -> RandomId {
        RandomId::new("TD", 8)
    }
}

impl std::str::FromStr for IdScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(IdScheme::Sequential),
            "random" => Ok(IdScheme::Random),
            other => Err(format!("unknown id scheme: {other}")),
        }
    }
}

// =============================================================================
// User Ids
// =============================================================================

/// Random 4-character user id from `[A-Za-z0-9]`.
pub fn random_user_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(USER_ID_LEN)
        .map(char::from)
        .collect()
}

/// Picks a user id not contained in `taken`.
///
/// Tries [`USER_ID_MAX_TRIES`] random ids, then falls back to the last four
/// digits of `now_millis`.
pub fn unique_user_id<R, F>(rng: &mut R, taken: F, now_millis: i64) -> String
where
    R: Rng + ?Sized,
    F: Fn(&str) -> bool,
{
    for _ in 0..USER_ID_MAX_TRIES {
        let candidate = random_user_id(rng);
        if !taken(&candidate) {
            return candidate;
        }
    }
    format!("{:04}", now_millis.rem_euclid(10_000))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_first_ids() {
        assert_eq!(TRANSACTION_IDS.first(), "T001");
        assert_eq!(DETAIL_IDS.first(), "TD001");
        assert_eq!(PRODUCT_IDS.first(), "P001");
    }

    #[test]
    fn test_next_after_increments_with_padding() {
        assert_eq!(TRANSACTION_IDS.next_after(Some("T001")), "T002");
        assert_eq!(DETAIL_IDS.next_after(Some("TD041")), "TD042");
        assert_eq!(PRODUCT_IDS.next_after(Some("P099")), "P100");
    }

    #[test]
    fn test_next_after_widens_past_width() {
        assert_eq!(TRANSACTION_IDS.next_after(Some("T999")), "T1000");
        assert_eq!(TRANSACTION_IDS.next_after(Some("T1000")), "T1001");
    }

    #[test]
    fn test_next_after_falls_back_to_first() {
        assert_eq!(TRANSACTION_IDS.next_after(None), "T001");
        assert_eq!(TRANSACTION_IDS.next_after(Some("TINAB12CD")), "T001");
        assert_eq!(TRANSACTION_IDS.next_after(Some("T")), "T001");
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert_eq!(TRANSACTION_IDS.parse("TD001"), None);
        assert_eq!(TRANSACTION_IDS.parse("T0A1"), None);
        assert_eq!(TRANSACTION_IDS.parse("X001"), None);
        assert_eq!(DETAIL_IDS.parse("TD010"), Some(10));
    }

    #[test]
    fn test_random_id_shape() {
        let mut rng = rand::thread_rng();
        let scheme = IdScheme::random_header(MovementType::Out);
        let id = scheme.generate(&mut rng);
        assert!(id.starts_with("TOUT"));
        assert_eq!(id.len(), 10);
        assert!(id[4..]
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
    }

    #[test]
    fn test_id_scheme_from_str() {
        assert_eq!("random".parse::<IdScheme>(), Ok(IdScheme::Random));
        assert_eq!(" Sequential ".parse::<IdScheme>(), Ok(IdScheme::Sequential));
        assert!("uuid".parse::<IdScheme>().is_err());
    }

    #[test]
    fn test_random_user_id_shape() {
        let mut rng = rand::thread_rng();
        let id = random_user_id(&mut rng);
        assert_eq!(id.len(), USER_ID_LEN);
        assert!(id.bytes().all(|b| b.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_unique_user_id_avoids_taken() {
        let mut rng = rand::thread_rng();
        let taken: HashSet<String> = (0..50).map(|_| random_user_id(&mut rng)).collect();
        let id = unique_user_id(&mut rng, |c| taken.contains(c), 0);
        assert!(!taken.contains(&id));
    }

    #[test]
    fn test_unique_user_id_falls_back_to_timestamp() {
        let mut rng = rand::thread_rng();
        let id = unique_user_id(&mut rng, |_| true, 1_700_000_123_456);
        assert_eq!(id, "3456");
    }
}
