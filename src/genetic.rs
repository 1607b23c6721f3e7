// Genetic operators: crossovers on both chromosome vectors, mutations, and
// the elitist + tournament selection. All operators are pure and return
// fresh vectors; parents are never modified.

use itertools::Itertools;
use rand::seq::{index, IndexedRandom};
use rand::Rng;

use crate::encoding::Chromosome;
use crate::instance::Instance;

/// Retries allowed when hunting for three mutually distinct values before
/// neighborhood mutation gives up and degrades to a swap.
const TRIPLE_RETRIES: usize = 64;

/// Builds one offspring sequence: positions of `template` whose job is kept
/// retain their value, the rest are filled left-to-right with the not-kept
/// values of `donor` in donor order. Both parents carry the same per-job
/// multiset, so the donor supplies exactly the missing occurrences.
fn crossover_child(
    template: &[usize],
    donor: &[usize],
    kept: impl Fn(usize) -> bool,
) -> Vec<usize> {
    let mut fill = donor.iter().copied().filter(|&job| !kept(job));
    template
        .iter()
        .map(|&job| {
            if kept(job) {
                job
            } else {
                fill.next().expect("parents carry equal job multisets")
            }
        })
        .collect()
}

fn random_job_set<R: Rng>(jobs_count: usize, rng: &mut R) -> Vec<bool> {
    let size = rng.random_range(0..=jobs_count);
    let all: Vec<usize> = (0..jobs_count).collect();
    let mut kept = vec![false; jobs_count];
    for &job in all.choose_multiple(rng, size) {
        kept[job] = true;
    }
    kept
}

/// Precedence operation crossover on operation sequences.
pub fn pox_crossover<R: Rng>(
    p1: &[usize],
    p2: &[usize],
    jobs_count: usize,
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let kept = random_job_set(jobs_count, rng);
    (
        crossover_child(p1, p2, |job| kept[job]),
        crossover_child(p2, p1, |job| kept[job]),
    )
}

/// Job-based crossover on operation sequences. The first offspring keeps the
/// sampled job set from the first parent, the second keeps the complement
/// from the second parent.
pub fn jbx_crossover<R: Rng>(
    p1: &[usize],
    p2: &[usize],
    jobs_count: usize,
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let kept = random_job_set(jobs_count, rng);
    (
        crossover_child(p1, p2, |job| kept[job]),
        crossover_child(p2, p1, |job| !kept[job]),
    )
}

pub fn crossover_os<R: Rng>(
    p1: &[usize],
    p2: &[usize],
    jobs_count: usize,
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    if rng.random_bool(0.5) {
        pox_crossover(p1, p2, jobs_count, rng)
    } else {
        jbx_crossover(p1, p2, jobs_count, rng)
    }
}

fn two_point_at(p1: &[usize], p2: &[usize], pos1: usize, pos2: usize) -> (Vec<usize>, Vec<usize>) {
    if pos1 == pos2 {
        return (p1.to_vec(), p2.to_vec());
    }
    let splice = |a: &[usize], b: &[usize]| {
        let mut offspring = a.to_vec();
        offspring[pos1..pos2].copy_from_slice(&b[pos1..pos2]);
        offspring
    };
    (splice(p1, p2), splice(p2, p1))
}

/// Two-point crossover on machine selections. Legality is positional, so
/// splicing aligned ranges preserves it.
pub fn two_point_crossover<R: Rng>(
    p1: &[usize],
    p2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let pos1 = rng.random_range(0..p1.len());
    let pos2 = rng.random_range(0..p1.len());
    two_point_at(p1, p2, pos1.min(pos2), pos1.max(pos2))
}

fn swapped_at(p: &[usize], pos1: usize, pos2: usize) -> Vec<usize> {
    let mut offspring = p.to_vec();
    offspring.swap(pos1, pos2);
    offspring
}

pub fn swapping_mutation<R: Rng>(p: &[usize], rng: &mut R) -> Vec<usize> {
    let pos1 = rng.random_range(0..p.len());
    let pos2 = rng.random_range(0..p.len());
    swapped_at(p, pos1, pos2)
}

/// Picks three positions holding mutually distinct values and places a random
/// permutation of those values back at the positions in ascending order.
/// Falls back to a swap when no such triple turns up within the retry budget.
pub fn neighborhood_mutation<R: Rng>(p: &[usize], rng: &mut R) -> Vec<usize> {
    if p.len() < 3 {
        return swapping_mutation(p, rng);
    }
    let mut budget = TRIPLE_RETRIES;
    let mut draw = |rng: &mut R, banned: [Option<usize>; 2]| -> Option<usize> {
        loop {
            let pos = rng.random_range(0..p.len());
            if !banned.iter().flatten().any(|&b| p[b] == p[pos]) {
                return Some(pos);
            }
            if budget == 0 {
                return None;
            }
            budget -= 1;
        }
    };

    let pos1 = rng.random_range(0..p.len());
    let Some(pos2) = draw(rng, [Some(pos1), None]) else {
        return swapping_mutation(p, rng);
    };
    let Some(pos3) = draw(rng, [Some(pos1), Some(pos2)]) else {
        return swapping_mutation(p, rng);
    };

    let mut positions = [pos1, pos2, pos3];
    positions.sort_unstable();
    let values = positions.map(|pos| p[pos]);

    let permutations: Vec<Vec<usize>> = values.iter().copied().permutations(3).collect();
    let permutation = permutations.choose(rng).expect("three values permute");

    let mut offspring = p.to_vec();
    for (&pos, &value) in positions.iter().zip(permutation) {
        offspring[pos] = value;
    }
    offspring
}

pub fn mutation_os<R: Rng>(p: &[usize], rng: &mut R) -> Vec<usize> {
    if rng.random_bool(0.5) {
        swapping_mutation(p, rng)
    } else {
        neighborhood_mutation(p, rng)
    }
}

/// Resamples half of the machine selections. `option_counts` bounds the legal
/// values per position (see `Instance::option_counts`).
pub fn half_mutation<R: Rng>(ms: &[usize], option_counts: &[usize], rng: &mut R) -> Vec<usize> {
    let mut offspring = ms.to_vec();
    for position in index::sample(rng, ms.len(), ms.len() / 2) {
        offspring[position] = rng.random_range(0..option_counts[position]);
    }
    offspring
}

/// Applies crossover pair-wise across the population with probability `pc`
/// per pair. An odd leftover individual carries through unchanged.
pub fn crossover<R: Rng>(
    population: &[Chromosome],
    jobs_count: usize,
    pc: f64,
    rng: &mut R,
) -> Vec<Chromosome> {
    let mut next = Vec::with_capacity(population.len());
    for pair in population.chunks(2) {
        if pair.len() == 2 && rng.random::<f64>() < pc {
            let (os1, os2) = crossover_os(&pair[0].os, &pair[1].os, jobs_count, rng);
            let (ms1, ms2) = two_point_crossover(&pair[0].ms, &pair[1].ms, rng);
            next.push(Chromosome { os: os1, ms: ms1 });
            next.push(Chromosome { os: os2, ms: ms2 });
        } else {
            next.extend_from_slice(pair);
        }
    }
    next
}

/// Mutates each individual with probability `pm`: the operation sequence by
/// swap or neighborhood mutation, the machine selection by half mutation.
pub fn mutation<R: Rng>(
    population: &[Chromosome],
    instance: &Instance,
    pm: f64,
    rng: &mut R,
) -> Vec<Chromosome> {
    let option_counts = instance.option_counts();
    population
        .iter()
        .map(|individual| {
            if rng.random::<f64>() < pm {
                Chromosome {
                    os: mutation_os(&individual.os, rng),
                    ms: half_mutation(&individual.ms, &option_counts, rng),
                }
            } else {
                individual.clone()
            }
        })
        .collect()
}

/// Elitist + binary tournament selection. The best `elite_rate` share moves
/// over unconditionally (stable on fitness ties), the remainder is refilled
/// by tournaments of two drawn with replacement.
pub fn selection<R: Rng>(
    population: &[Chromosome],
    fitness: &[i32],
    elite_rate: f64,
    rng: &mut R,
) -> Vec<Chromosome> {
    let n = population.len();
    let elite_count = (elite_rate * n as f64) as usize;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&individual| fitness[individual]);

    let mut next: Vec<Chromosome> = order[..elite_count]
        .iter()
        .map(|&individual| population[individual].clone())
        .collect();
    while next.len() < n {
        let first = rng.random_range(0..n);
        let second = rng.random_range(0..n);
        let winner = if fitness[second] < fitness[first] {
            second
        } else {
            first
        };
        next.push(population[winner].clone());
    }
    next
}
