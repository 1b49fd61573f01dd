//! Candidate selection and relative-strength ranking at the entry instant.

use std::collections::HashMap;

use crate::domain::snapshot::SignalSnapshot;

/// An instrument that passed the entry filter, carrying the price it was
/// evaluated at and its frozen ranking strength.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub symbol: String,
    pub price: f64,
    pub strength: f64,
}

/// Filter the day's snapshots down to entry candidates, in universe scan
/// order. An instrument qualifies when its snapshot signalled an entry
/// crossover and its current price has not already breached the snapshot's
/// stop threshold relative to the reference open — the pre-trade veto uses
/// the same arithmetic as the in-trade drawdown stop.
pub fn qualified_candidates(
    scan_order: &[String],
    snapshots: &HashMap<String, SignalSnapshot>,
    prices: &HashMap<String, f64>,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for symbol in scan_order {
        let Some(snapshot) = snapshots.get(symbol) else {
            continue;
        };
        let Some(&price) = prices.get(symbol) else {
            continue;
        };
        if !price.is_finite() || price <= 0.0 {
            continue;
        }
        if !snapshot.is_entry_signal || !snapshot.stop_fraction.is_finite() {
            continue;
        }
        if price / snapshot.reference_open - 1.0 < snapshot.stop_fraction {
            continue;
        }
        candidates.push(Candidate {
            symbol: symbol.clone(),
            price,
            strength: snapshot.strength,
        });
    }

    candidates
}

/// Rank descending by strength and truncate to the free slot count. The sort
/// is stable, so equal-strength candidates keep their scan order and repeated
/// runs over identical inputs select identically.
pub fn rank_and_truncate(mut candidates: Vec<Candidate>, free_slots: usize) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.strength
            .partial_cmp(&a.strength)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(free_slots);
    candidates
}
