use strum_macros::{Display, EnumString};

use crate::layout::{Layout, KEY_COUNT};
use crate::optimizer::MAX_REROLLS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum CrossoverMethod {
    ReverseSequence,
    Pmx,
    Aex,
}

/// Recombines parents pairwise, `(0,1)`, `(2,3)` and so on. A trailing
/// unpaired parent is dropped. Every method emits two offspring per pair,
/// each a valid permutation.
pub fn apply(method: CrossoverMethod, parents: &[Layout], rng: &mut fastrand::Rng) -> Vec<Layout> {
    let mut offspring = Vec::with_capacity(parents.len() & !1);
    for pair in parents.chunks_exact(2) {
        match method {
            CrossoverMethod::ReverseSequence => {
                offspring.push(reverse_sequence(&pair[0], rng));
                offspring.push(reverse_sequence(&pair[1], rng));
            }
            CrossoverMethod::Pmx => {
                let (a, b) = pmx_pair(&pair[0], &pair[1], rng);
                offspring.push(a);
                offspring.push(b);
            }
            CrossoverMethod::Aex => {
                offspring.push(aex(&pair[0], &pair[1], rng));
                offspring.push(aex(&pair[1], &pair[0], rng));
            }
        }
    }
    offspring
}

/// Reverses one random segment of a single parent. Re-rolls until the
/// child differs from the parent, up to the shared re-roll bound.
pub fn reverse_sequence(parent: &Layout, rng: &mut fastrand::Rng) -> Layout {
    let mut child = reverse_segment(parent, rng);
    for _ in 1..MAX_REROLLS {
        if child != *parent {
            break;
        }
        child = reverse_segment(parent, rng);
    }
    child
}

/// One reversal of a random segment of length at least 2.
pub(crate) fn reverse_segment(parent: &Layout, rng: &mut fastrand::Rng) -> Layout {
    let start = rng.usize(0..KEY_COUNT - 1);
    let len = rng.usize(2..=KEY_COUNT - start);
    parent.map_flat(|keys| keys[start..start + len].reverse())
}

/// Partially mapped crossover. One cut window is drawn per pair and both
/// children are built from it with the parents' roles swapped.
pub fn pmx_pair(first: &Layout, second: &Layout, rng: &mut fastrand::Rng) -> (Layout, Layout) {
    let mut cut_start = rng.usize(0..=KEY_COUNT);
    let mut cut_end = rng.usize(0..=KEY_COUNT);
    if cut_start > cut_end {
        std::mem::swap(&mut cut_start, &mut cut_end);
    }
    (
        pmx_child(second, first, cut_start, cut_end),
        pmx_child(first, second, cut_start, cut_end),
    )
}

/// The child copies `[cut_start, cut_end)` from `segment_src` and takes the
/// remaining positions from `fill_src`, chasing the segment mapping whenever
/// a fill symbol already sits inside the copied window.
fn pmx_child(segment_src: &Layout, fill_src: &Layout, cut_start: usize, cut_end: usize) -> Layout {
    let segment = &segment_src.as_bytes()[cut_start..cut_end];
    let mut in_segment = [false; 256];
    for &s in segment {
        in_segment[s as usize] = true;
    }
    fill_src.map_flat(|keys| {
        let fill = *keys;
        keys[cut_start..cut_end].copy_from_slice(segment);
        for i in (0..cut_start).chain(cut_end..KEY_COUNT) {
            let mut symbol = fill[i];
            while in_segment[symbol as usize] {
                let offset = segment
                    .iter()
                    .position(|&s| s == symbol)
                    .unwrap_or_default();
                symbol = fill[cut_start + offset];
            }
            keys[i] = symbol;
        }
    })
}

/// Alternating-edges crossover. Both parents are read as cyclic sequences;
/// the child starts at the first parent's first symbol and repeatedly steps
/// to the earliest-recorded unused neighbor of the current symbol. With no
/// unused neighbor left it jumps to a random unused symbol. Two identical
/// parents therefore reproduce themselves exactly.
pub fn aex(first: &Layout, second: &Layout, rng: &mut fastrand::Rng) -> Layout {
    let mut neighbors: Vec<Vec<u8>> = vec![Vec::new(); 256];
    for parent in [first, second] {
        let bytes = parent.as_bytes();
        for i in 0..KEY_COUNT {
            let symbol = bytes[i] as usize;
            for adjacent in [bytes[(i + 1) % KEY_COUNT], bytes[(i + KEY_COUNT - 1) % KEY_COUNT]] {
                if !neighbors[symbol].contains(&adjacent) {
                    neighbors[symbol].push(adjacent);
                }
            }
        }
    }

    let mut used = [false; 256];
    let mut current = first.as_bytes()[0];
    used[current as usize] = true;
    let mut walk = [0u8; KEY_COUNT];
    walk[0] = current;
    for slot in walk.iter_mut().skip(1) {
        let next = neighbors[current as usize]
            .iter()
            .copied()
            .find(|&n| !used[n as usize]);
        let next = match next {
            Some(n) => n,
            None => {
                let unused: Vec<u8> = first
                    .as_bytes()
                    .iter()
                    .copied()
                    .filter(|&s| !used[s as usize])
                    .collect();
                unused[rng.usize(0..unused.len())]
            }
        };
        used[next as usize] = true;
        *slot = next;
        current = next;
    }
    first.map_flat(|keys| keys.copy_from_slice(&walk))
}
