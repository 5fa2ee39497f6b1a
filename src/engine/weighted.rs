//! Weighted random selection over candidate pools

use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Select one element by weight. Zero-weight elements are never picked
/// unless every weight is zero, in which case selection falls back to
/// uniform.
pub fn pick_weighted<'a, T>(
    items: &[&'a T],
    weight: impl Fn(&T) -> u32,
    rng: &mut ChaCha8Rng,
) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }

    let total: u64 = items.iter().map(|item| weight(item) as u64).sum();
    if total == 0 {
        return pick_uniform(items, rng);
    }

    let roll = rng.gen_range(0..total);
    let mut cumulative = 0u64;
    for item in items {
        cumulative += weight(item) as u64;
        if roll < cumulative {
            return Some(item);
        }
    }

    items.last().copied()
}

/// Select one element uniformly.
pub fn pick_uniform<'a, T>(items: &[&'a T], rng: &mut ChaCha8Rng) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        Some(items[rng.gen_range(0..items.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_empty_pool_yields_none() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let items: Vec<&u32> = Vec::new();
        assert!(pick_weighted(&items, |_| 1, &mut rng).is_none());
        assert!(pick_uniform(&items, &mut rng).is_none());
    }

    #[test]
    fn test_zero_weight_falls_back_to_uniform() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let values = [10u32, 20, 30];
        let items: Vec<&u32> = values.iter().collect();
        let picked = pick_weighted(&items, |_| 0, &mut rng).unwrap();
        assert!(values.contains(picked));
    }

    #[test]
    fn test_zero_weight_items_never_picked() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let values = [(1u32, 0u32), (2, 5), (3, 0)];
        let items: Vec<&(u32, u32)> = values.iter().collect();
        for _ in 0..100 {
            let picked = pick_weighted(&items, |(_, w)| *w, &mut rng).unwrap();
            assert_eq!(picked.0, 2);
        }
    }

    #[test]
    fn test_deterministic_under_fixed_seed() {
        let values: Vec<u32> = (0..50).collect();
        let items: Vec<&u32> = values.iter().collect();

        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..20 {
            assert_eq!(
                pick_weighted(&items, |v| v + 1, &mut a),
                pick_weighted(&items, |v| v + 1, &mut b)
            );
        }
    }
}
