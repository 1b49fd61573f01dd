//! Equal-weight position sizing and buy-order planning.

use std::collections::HashMap;

use crate::domain::order::{Order, Side};
use crate::domain::selection::Candidate;

/// Whole lots affordable with `budget` at `price`, as a share count.
/// Zero when the budget does not cover one lot.
pub fn lot_shares(budget: f64, price: f64, lot_size: i64) -> i64 {
    if lot_size <= 0 || !(price.is_finite() && price > 0.0) || !(budget.is_finite() && budget > 0.0)
    {
        return 0;
    }
    let lots = (budget / price / lot_size as f64).floor() as i64;
    lots.max(0) * lot_size
}

/// Plan buy orders for ranked candidates. The per-slot budget divides the
/// capital base by the slots still free at dispatch time, not at planning
/// time. Already-held symbols are skipped (the live account decides what is
/// held), and sizes below one lot are silently dropped — a policy floor, not
/// an error.
pub fn plan_entries(
    candidates: &[Candidate],
    held: &HashMap<String, i64>,
    capital_base: f64,
    max_positions: usize,
    lot_size: i64,
) -> Vec<Order> {
    let mut held_count = held.len();
    if held_count >= max_positions {
        return Vec::new();
    }

    let remaining_slots = max_positions - held_count;
    let budget_per_slot = capital_base / remaining_slots as f64;

    let mut orders = Vec::new();
    for candidate in candidates {
        if held_count >= max_positions {
            break;
        }
        if held.contains_key(&candidate.symbol) {
            continue;
        }
        let shares = lot_shares(budget_per_slot, candidate.price, lot_size);
        if shares < lot_size {
            continue;
        }
        orders.push(Order {
            side: Side::Buy,
            symbol: candidate.symbol.clone(),
            shares,
            price: candidate.price,
        });
        held_count += 1;
    }

    orders
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn candidate(symbol: &str, price: f64) -> Candidate {
        Candidate {
            symbol: symbol.into(),
            price,
            strength: 0.0,
        }
    }

    #[test]
    fn lot_shares_floors_to_whole_lots() {
        // 100_000 / 10 / 100 = 100 lots → 10_000 shares
        assert_eq!(lot_shares(100_000.0, 10.0, 100), 10_000);
        // 1_234 / 10 = 123.4 shares → 1 lot
        assert_eq!(lot_shares(1_234.0, 10.0, 100), 100);
    }

    #[test]
    fn lot_shares_below_one_lot_is_zero() {
        assert_eq!(lot_shares(999.0, 10.0, 100), 0);
    }

    #[test]
    fn lot_shares_degenerate_inputs() {
        assert_eq!(lot_shares(100_000.0, 0.0, 100), 0);
        assert_eq!(lot_shares(-5.0, 10.0, 100), 0);
        assert_eq!(lot_shares(f64::NAN, 10.0, 100), 0);
        assert_eq!(lot_shares(100_000.0, 10.0, 0), 0);
    }

    #[test]
    fn budget_divides_by_remaining_slots() {
        let held: HashMap<String, i64> = [("X".to_string(), 500)].into();
        let candidates = vec![candidate("A", 10.0)];
        // 4 slots free of 5: budget 100_000/4 = 25_000 → 25 lots
        let orders = plan_entries(&candidates, &held, 100_000.0, 5, 100);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].shares, 2_500);
        assert_eq!(orders[0].side, Side::Buy);
    }

    #[test]
    fn held_symbol_is_skipped() {
        let held: HashMap<String, i64> = [("A".to_string(), 500)].into();
        let candidates = vec![candidate("A", 10.0), candidate("B", 10.0)];
        let orders = plan_entries(&candidates, &held, 100_000.0, 5, 100);
        let symbols: Vec<&str> = orders.iter().map(|o| o.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["B"]);
    }

    #[test]
    fn at_capacity_plans_nothing() {
        let held: HashMap<String, i64> =
            [("X".to_string(), 100), ("Y".to_string(), 100)].into();
        let candidates = vec![candidate("A", 10.0)];
        assert!(plan_entries(&candidates, &held, 100_000.0, 2, 100).is_empty());
    }

    #[test]
    fn stops_when_slots_fill_mid_list() {
        let held = HashMap::new();
        let candidates = vec![
            candidate("A", 10.0),
            candidate("B", 10.0),
            candidate("C", 10.0),
        ];
        let orders = plan_entries(&candidates, &held, 100_000.0, 2, 100);
        assert_eq!(orders.len(), 2);
    }

    #[test]
    fn sub_lot_budget_drops_order_silently() {
        let held = HashMap::new();
        // 2 slots → 400 per slot; one lot of a 10.0 stock costs 1_000
        let candidates = vec![candidate("A", 10.0), candidate("B", 3.0)];
        let orders = plan_entries(&candidates, &held, 800.0, 2, 100);
        // A is unaffordable, B gets one lot (400/3 = 133 shares → 100)
        let symbols: Vec<&str> = orders.iter().map(|o| o.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["B"]);
        assert_eq!(orders[0].shares, 100);
    }

    proptest! {
        #[test]
        fn shares_are_nonnegative_whole_lots(
            budget in -1e9_f64..1e9,
            price in 0.01_f64..10_000.0,
        ) {
            let shares = lot_shares(budget, price, 100);
            prop_assert!(shares >= 0);
            prop_assert_eq!(shares % 100, 0);
        }

        #[test]
        fn capacity_never_exceeded(
            n_candidates in 0usize..20,
            n_held in 0usize..10,
            max_positions in 1usize..10,
        ) {
            let candidates: Vec<Candidate> = (0..n_candidates)
                .map(|i| candidate(&format!("C{i}"), 10.0))
                .collect();
            let held: HashMap<String, i64> =
                (0..n_held).map(|i| (format!("H{i}"), 100)).collect();
            let orders = plan_entries(&candidates, &held, 1e6, max_positions, 100);
            prop_assert!(held.len() + orders.len() <= max_positions.max(held.len()));
        }
    }
}
