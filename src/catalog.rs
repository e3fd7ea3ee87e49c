//! Pair catalog.
//!
//! The fixed, ordered universe of pairs probed every cycle: G10 majors
//! that should price continuously, then emerging/exotic currencies and
//! precious metals whose markets close and exercise last-value persistence.

use crate::types::{Pair, PairGroup};

/// `(base, quote, group)` in probe order.
const DEFAULT_PAIRS: &[(&str, &str, PairGroup)] = &[
    // G10
    ("AUD", "USD", PairGroup::G10),
    ("EUR", "USD", PairGroup::G10),
    ("GBP", "USD", PairGroup::G10),
    ("NZD", "USD", PairGroup::G10),
    ("USD", "CAD", PairGroup::G10),
    ("USD", "CHF", PairGroup::G10),
    ("USD", "DKK", PairGroup::G10),
    ("USD", "JPY", PairGroup::G10),
    ("USD", "NOK", PairGroup::G10),
    ("USD", "SEK", PairGroup::G10),
    // Emerging / exotic
    ("USD", "ARS", PairGroup::Emerging),
    ("USD", "BRL", PairGroup::Emerging),
    ("USD", "CLP", PairGroup::Emerging),
    ("USD", "CNH", PairGroup::Emerging),
    ("USD", "CNY", PairGroup::Emerging),
    ("USD", "COP", PairGroup::Emerging),
    ("USD", "CZK", PairGroup::Emerging),
    ("USD", "GHS", PairGroup::Emerging),
    ("USD", "HKD", PairGroup::Emerging),
    ("USD", "HUF", PairGroup::Emerging),
    ("USD", "IDR", PairGroup::Emerging),
    ("USD", "ILS", PairGroup::Emerging),
    ("USD", "INR", PairGroup::Emerging),
    ("USD", "KES", PairGroup::Emerging),
    ("USD", "KRW", PairGroup::Emerging),
    ("USD", "MXN", PairGroup::Emerging),
    ("USD", "NGN", PairGroup::Emerging),
    ("USD", "PHP", PairGroup::Emerging),
    ("USD", "PLN", PairGroup::Emerging),
    ("USD", "SGD", PairGroup::Emerging),
    ("USD", "THB", PairGroup::Emerging),
    ("USD", "TRY", PairGroup::Emerging),
    ("USD", "XOF", PairGroup::Emerging),
    ("USD", "ZAR", PairGroup::Emerging),
    // Precious metals
    ("XAG", "USD", PairGroup::Metal),
    ("XAU", "USD", PairGroup::Metal),
    ("XPD", "USD", PairGroup::Metal),
    ("XPT", "USD", PairGroup::Metal),
];

/// Ordered, read-only list of pairs. Traversed in full once per cycle.
#[derive(Debug, Clone)]
pub struct Catalog {
    pairs: Vec<Pair>,
}

impl Catalog {
    /// A custom catalog. Duplicates are kept as given.
    pub fn new(pairs: Vec<Pair>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pair> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Group of a pair in the built-in table, if it is listed there.
    pub fn group_of(pair: &Pair) -> Option<PairGroup> {
        DEFAULT_PAIRS
            .iter()
            .find(|(base, quote, _)| pair.base == *base && pair.quote == *quote)
            .map(|(_, _, group)| *group)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(
            DEFAULT_PAIRS
                .iter()
                .map(|(base, quote, _)| Pair::new(*base, *quote))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Pair;
    type IntoIter = std::slice::Iter<'a, Pair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}
