use strum_macros::{Display, EnumString};

use crate::layout::{Layout, KEY_COUNT};
use crate::optimizer::{crossover, MAX_REROLLS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum MutationMethod {
    ReverseSequence,
    Swap,
    Scramble,
    Displacement,
}

/// Mutates each individual independently with probability `rate` percent.
/// A mutated individual is re-rolled until it differs from the original,
/// up to the shared re-roll bound.
pub fn apply(
    method: MutationMethod,
    population: &[Layout],
    rate: f64,
    rng: &mut fastrand::Rng,
) -> Vec<Layout> {
    population
        .iter()
        .map(|individual| {
            if rng.f64() * 100.0 < rate {
                mutate_one(method, individual, rng)
            } else {
                individual.clone()
            }
        })
        .collect()
}

fn mutate_one(method: MutationMethod, individual: &Layout, rng: &mut fastrand::Rng) -> Layout {
    let mut candidate = mutate_once(method, individual, rng);
    for _ in 1..MAX_REROLLS {
        if candidate != *individual {
            break;
        }
        candidate = mutate_once(method, individual, rng);
    }
    candidate
}

fn mutate_once(method: MutationMethod, individual: &Layout, rng: &mut fastrand::Rng) -> Layout {
    match method {
        MutationMethod::ReverseSequence => crossover::reverse_segment(individual, rng),
        MutationMethod::Swap => swap_pairs(individual, rng),
        MutationMethod::Scramble => scramble_segment(individual, rng),
        MutationMethod::Displacement => displace_segment(individual, rng),
    }
}

const MIN_SWAP_SPREAD: usize = 3;

/// Two to four position swaps, each between slots at least three apart.
fn swap_pairs(individual: &Layout, rng: &mut fastrand::Rng) -> Layout {
    let swaps = rng.usize(2..=4);
    individual.map_flat(|keys| {
        for _ in 0..swaps {
            let a = rng.usize(0..KEY_COUNT);
            let mut b = rng.usize(0..KEY_COUNT);
            let mut tries = 0;
            while a.abs_diff(b) < MIN_SWAP_SPREAD && tries < MAX_REROLLS {
                b = rng.usize(0..KEY_COUNT);
                tries += 1;
            }
            if a.abs_diff(b) < MIN_SWAP_SPREAD {
                b = (a + MIN_SWAP_SPREAD) % KEY_COUNT;
            }
            keys.swap(a, b);
        }
    })
}

/// Shuffles one random segment of length at least 3.
fn scramble_segment(individual: &Layout, rng: &mut fastrand::Rng) -> Layout {
    let start = rng.usize(0..KEY_COUNT - 2);
    let len = rng.usize(3..=KEY_COUNT - start);
    individual.map_flat(|keys| rng.shuffle(&mut keys[start..start + len]))
}

/// Cuts a segment of three to five keys and reinserts it somewhere else.
fn displace_segment(individual: &Layout, rng: &mut fastrand::Rng) -> Layout {
    let len = rng.usize(3..=5);
    let start = rng.usize(0..=KEY_COUNT - len);
    individual.map_flat(|keys| {
        let mut rest: Vec<u8> = keys.to_vec();
        let segment: Vec<u8> = rest.drain(start..start + len).collect();
        let mut at = rng.usize(0..=rest.len());
        let mut tries = 0;
        while at == start && tries < MAX_REROLLS {
            at = rng.usize(0..=rest.len());
            tries += 1;
        }
        if at == start {
            at = (start + 1) % (rest.len() + 1);
        }
        for (offset, &symbol) in segment.iter().enumerate() {
            rest.insert(at + offset, symbol);
        }
        keys.copy_from_slice(&rest);
    })
}
