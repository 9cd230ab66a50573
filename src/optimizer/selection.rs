use strum_macros::{Display, EnumString};

use crate::error::{KeyvolveError, KvResult};
use crate::layout::Layout;
use crate::optimizer::MAX_REROLLS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum SelectionMethod {
    Tournament,
    Roulette,
    Rank,
    Sus,
}

/// Parent selection over a scored population. `scored` pairs each layout
/// with its effort; lower effort is fitter throughout.
#[derive(Debug, Clone)]
pub struct Selector {
    pub method: SelectionMethod,
    pub tournament_size: usize,
    pub rank_exponent: f64,
}

impl Selector {
    pub fn select(
        &self,
        scored: &[(Layout, f64)],
        count: usize,
        rng: &mut fastrand::Rng,
    ) -> KvResult<Vec<Layout>> {
        if scored.is_empty() {
            return Err(KeyvolveError::InvalidState(
                "cannot select parents from an empty population".into(),
            ));
        }
        if count == 0 {
            return Ok(Vec::new());
        }
        Ok(match self.method {
            SelectionMethod::Tournament => self.tournament(scored, count, rng),
            SelectionMethod::Roulette => self.roulette(scored, count, rng),
            SelectionMethod::Rank => self.rank(scored, count, rng),
            SelectionMethod::Sus => self.sus(scored, count, rng),
        })
    }

    /// Repeated k-way tournaments. Entrants are drawn without replacement
    /// from a pool that is refilled from the full population whenever it
    /// can no longer seat a whole tournament.
    fn tournament(&self, scored: &[(Layout, f64)], count: usize, rng: &mut fastrand::Rng) -> Vec<Layout> {
        let k = self.tournament_size.clamp(1, scored.len());
        let mut pool: Vec<usize> = (0..scored.len()).collect();
        let mut winners = Vec::with_capacity(count);
        while winners.len() < count {
            if pool.len() < k {
                pool = (0..scored.len()).collect();
            }
            let mut best: Option<usize> = None;
            for _ in 0..k {
                let entrant = pool.swap_remove(rng.usize(0..pool.len()));
                best = Some(match best {
                    Some(b) if scored[b].1 <= scored[entrant].1 => b,
                    _ => entrant,
                });
            }
            if let Some(b) = best {
                winners.push(scored[b].0.clone());
            }
        }
        winners
    }

    /// Fitness-proportionate spins with fitness 1/effort. The wheel is
    /// walked in descending-fitness order so the fittest segments come
    /// first.
    fn roulette(&self, scored: &[(Layout, f64)], count: usize, rng: &mut fastrand::Rng) -> Vec<Layout> {
        let mut wheel: Vec<(usize, f64)> = scored
            .iter()
            .enumerate()
            .map(|(i, (_, effort))| (i, 1.0 / effort.max(f64::EPSILON)))
            .collect();
        wheel.sort_by(|a, b| b.1.total_cmp(&a.1));
        let total: f64 = wheel.iter().map(|&(_, f)| f).sum();

        let mut picks = Vec::with_capacity(count);
        for _ in 0..count {
            let spin = rng.f64() * total;
            let mut cumulative = 0.0;
            let mut chosen = wheel[wheel.len() - 1].0;
            for &(i, fitness) in &wheel {
                cumulative += fitness;
                if cumulative >= spin {
                    chosen = i;
                    break;
                }
            }
            picks.push(scored[chosen].0.clone());
        }
        picks
    }

    /// Rank-weighted draw without replacement. Weights depend only on rank,
    /// so a runaway best effort cannot dominate the wheel. When every member
    /// has been drawn the taken set resets and a fresh pass begins.
    fn rank(&self, scored: &[(Layout, f64)], count: usize, rng: &mut fastrand::Rng) -> Vec<Layout> {
        let n = scored.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| scored[a].1.total_cmp(&scored[b].1));
        let probs = rank_probabilities(n, self.rank_exponent);

        let mut taken = vec![false; n];
        let mut taken_count = 0;
        let mut picks = Vec::with_capacity(count);
        while picks.len() < count {
            if taken_count == n {
                taken.fill(false);
                taken_count = 0;
            }
            let mut chosen = None;
            for _ in 0..MAX_REROLLS {
                let roll = rng.f64();
                let mut cumulative = 0.0;
                for (rank, &p) in probs.iter().enumerate() {
                    cumulative += p;
                    if roll < cumulative {
                        if !taken[rank] {
                            chosen = Some(rank);
                        }
                        break;
                    }
                }
                if chosen.is_some() {
                    break;
                }
            }
            // Only unlikely ranks are left; take the best of them.
            let rank = match chosen {
                Some(r) => r,
                None => match taken.iter().position(|&t| !t) {
                    Some(r) => r,
                    None => continue,
                },
            };
            taken[rank] = true;
            taken_count += 1;
            picks.push(scored[order[rank]].0.clone());
        }
        picks
    }

    /// Stochastic universal sampling: one spin places `count` equally
    /// spaced pointers on the 1/effort wheel.
    fn sus(&self, scored: &[(Layout, f64)], count: usize, rng: &mut fastrand::Rng) -> Vec<Layout> {
        let mut wheel: Vec<(usize, f64)> = scored
            .iter()
            .enumerate()
            .map(|(i, (_, effort))| (i, 1.0 / effort.max(f64::EPSILON)))
            .collect();
        wheel.sort_by(|a, b| b.1.total_cmp(&a.1));
        let total: f64 = wheel.iter().map(|&(_, f)| f).sum();
        let spacing = total / count as f64;
        let start = rng.f64() * spacing;

        let mut picks = Vec::with_capacity(count);
        let mut cumulative = 0.0;
        let mut segment = 0;
        for p in 0..count {
            let pointer = start + p as f64 * spacing;
            while segment < wheel.len() && cumulative + wheel[segment].1 < pointer {
                cumulative += wheel[segment].1;
                segment += 1;
            }
            let chosen = wheel[segment.min(wheel.len() - 1)].0;
            picks.push(scored[chosen].0.clone());
        }
        picks
    }
}

/// Normalized rank weights, best rank first: `(n - rank) ^ exponent / sum`.
pub fn rank_probabilities(n: usize, exponent: f64) -> Vec<f64> {
    let weights: Vec<f64> = (0..n).map(|rank| ((n - rank) as f64).powf(exponent)).collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::KEY_COUNT;

    fn scored_population(n: usize) -> Vec<(Layout, f64)> {
        let mut rng = fastrand::Rng::with_seed(1);
        (0..n)
            .map(|i| (Layout::random(&mut rng), 100.0 + i as f64))
            .collect()
    }

    fn selector(method: SelectionMethod) -> Selector {
        Selector {
            method,
            tournament_size: 3,
            rank_exponent: 1.0,
        }
    }

    #[test]
    fn empty_population_is_an_error() {
        let mut rng = fastrand::Rng::with_seed(2);
        let err = selector(SelectionMethod::Tournament).select(&[], 4, &mut rng).unwrap_err();
        assert!(matches!(err, KeyvolveError::InvalidState(_)));
    }

    #[test]
    fn every_method_returns_count_members_of_the_population() {
        let scored = scored_population(12);
        for method in [
            SelectionMethod::Tournament,
            SelectionMethod::Roulette,
            SelectionMethod::Rank,
            SelectionMethod::Sus,
        ] {
            let mut rng = fastrand::Rng::with_seed(3);
            let picks = selector(method).select(&scored, 8, &mut rng).unwrap();
            assert_eq!(picks.len(), 8, "{method}");
            for pick in &picks {
                assert!(scored.iter().any(|(l, _)| l == pick), "{method}");
            }
        }
    }

    #[test]
    fn selection_can_exceed_population_size() {
        let scored = scored_population(5);
        for method in [
            SelectionMethod::Tournament,
            SelectionMethod::Roulette,
            SelectionMethod::Rank,
            SelectionMethod::Sus,
        ] {
            let mut rng = fastrand::Rng::with_seed(4);
            let picks = selector(method).select(&scored, 13, &mut rng).unwrap();
            assert_eq!(picks.len(), 13, "{method}");
        }
    }

    #[test]
    fn tournament_favors_low_effort() {
        let scored = scored_population(20);
        let mut rng = fastrand::Rng::with_seed(5);
        let picks = selector(SelectionMethod::Tournament)
            .select(&scored, 200, &mut rng)
            .unwrap();
        let best_hits = picks.iter().filter(|p| **p == scored[0].0).count();
        let worst_hits = picks.iter().filter(|p| **p == scored[19].0).count();
        assert!(best_hits > worst_hits);
    }

    #[test]
    fn rank_probabilities_are_monotone_and_normalized() {
        for exponent in [0.5, 1.0, 2.0, 4.0] {
            let probs = rank_probabilities(10, exponent);
            let sum: f64 = probs.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
            for pair in probs.windows(2) {
                assert!(pair[0] > pair[1], "exponent {exponent}");
            }
        }
    }

    #[test]
    fn rank_draws_without_replacement_within_a_pass() {
        let scored = scored_population(10);
        let mut rng = fastrand::Rng::with_seed(6);
        let picks = selector(SelectionMethod::Rank).select(&scored, 10, &mut rng).unwrap();
        let mut keys: Vec<&[u8; KEY_COUNT]> = picks.iter().map(|l| l.as_bytes()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 10);
    }

    #[test]
    fn sus_single_pointer_lands_on_the_wheel() {
        let scored = scored_population(6);
        let mut rng = fastrand::Rng::with_seed(7);
        let picks = selector(SelectionMethod::Sus).select(&scored, 1, &mut rng).unwrap();
        assert_eq!(picks.len(), 1);
    }

    #[test]
    fn method_tags_parse() {
        assert_eq!("sus".parse::<SelectionMethod>().unwrap(), SelectionMethod::Sus);
        assert!("lottery".parse::<SelectionMethod>().is_err());
    }
}
