// Random generation of legal chromosome pairs.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::instance::Instance;

/// Dual-vector chromosome of the flexible job-shop GA.
///
/// `os` is the operation sequence: a permutation of job indices in which job
/// `j` appears once per operation, the k-th occurrence standing for the k-th
/// operation of job `j`. `ms` is the machine selection: one index into the
/// machine-option list of each operation, in job-major order. Both vectors
/// are legal by construction and operators keep them that way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chromosome {
    pub os: Vec<usize>,
    pub ms: Vec<usize>,
}

/// Draws a uniformly random operation sequence.
pub fn generate_os<R: Rng>(instance: &Instance, rng: &mut R) -> Vec<usize> {
    let mut os = Vec::with_capacity(instance.total_operations());
    for (job, data) in instance.jobs.iter().enumerate() {
        os.extend(std::iter::repeat(job).take(data.operations.len()));
    }
    os.shuffle(rng);
    os
}

/// Draws a uniformly random machine selection.
pub fn generate_ms<R: Rng>(instance: &Instance, rng: &mut R) -> Vec<usize> {
    instance
        .jobs
        .iter()
        .flat_map(|job| job.operations.iter())
        .map(|op| rng.random_range(0..op.options.len()))
        .collect()
}

impl Chromosome {
    pub fn random<R: Rng>(instance: &Instance, rng: &mut R) -> Self {
        Self {
            os: generate_os(instance, rng),
            ms: generate_ms(instance, rng),
        }
    }
}

pub fn initialize_population<R: Rng>(
    instance: &Instance,
    pop_size: usize,
    rng: &mut R,
) -> Vec<Chromosome> {
    (0..pop_size)
        .map(|_| Chromosome::random(instance, rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{Job, MachineOption, Operation};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn sample_instance() -> Instance {
        let option = |machine, processing_time| MachineOption {
            machine,
            processing_time,
        };
        Instance {
            machine_count: 3,
            jobs: vec![
                Job {
                    operations: vec![
                        Operation {
                            options: vec![option(0, 2), option(1, 5)],
                        },
                        Operation {
                            options: vec![option(2, 4)],
                        },
                    ],
                },
                Job {
                    operations: vec![Operation {
                        options: vec![option(0, 1), option(1, 2), option(2, 3)],
                    }],
                },
            ],
        }
    }

    /// Job `j` must occur exactly once per operation of `j`.
    fn assert_os_legal(instance: &Instance, os: &[usize]) {
        assert_eq!(os.len(), instance.total_operations());
        for (job, data) in instance.jobs.iter().enumerate() {
            let occurrences = os.iter().filter(|&&j| j == job).count();
            assert_eq!(occurrences, data.operations.len(), "job {job}");
        }
    }

    fn assert_ms_legal(instance: &Instance, ms: &[usize]) {
        let counts = instance.option_counts();
        assert_eq!(ms.len(), counts.len());
        for (position, (&choice, &count)) in ms.iter().zip(&counts).enumerate() {
            assert!(choice < count, "position {position}");
        }
    }

    #[test]
    fn os_is_a_legal_multiset_permutation() {
        let instance = sample_instance();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..20 {
            assert_os_legal(&instance, &generate_os(&instance, &mut rng));
        }
    }

    #[test]
    fn ms_respects_option_counts() {
        let instance = sample_instance();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..20 {
            assert_ms_legal(&instance, &generate_ms(&instance, &mut rng));
        }
    }

    #[test]
    fn population_has_requested_size() {
        let instance = sample_instance();
        let mut rng = SmallRng::seed_from_u64(42);
        let population = initialize_population(&instance, 7, &mut rng);
        assert_eq!(population.len(), 7);
        for chromosome in &population {
            assert_os_legal(&instance, &chromosome.os);
            assert_ms_legal(&instance, &chromosome.ms);
        }
    }

    #[test]
    fn generation_is_reproducible_for_a_seed() {
        let instance = sample_instance();
        let mut first = SmallRng::seed_from_u64(7);
        let mut second = SmallRng::seed_from_u64(7);
        assert_eq!(
            initialize_population(&instance, 5, &mut first),
            initialize_population(&instance, 5, &mut second)
        );
    }
}
