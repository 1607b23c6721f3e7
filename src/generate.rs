// Small helper functions to generate random instances of the flexible
// job-shop problem.

use rand::seq::index;
use rand::Rng;

use crate::instance::{Instance, Job, MachineOption, Operation};

/// Generates a randomized instance with `jobs` jobs on `machines` machines.
/// Each job gets between `min_ops` and `max_ops` operations, each operation
/// between 1 and `max_options` alternative machines (all distinct) with
/// processing times drawn from `min_time..=max_time`.
#[expect(clippy::too_many_arguments)]
pub fn instance<R: Rng>(
    rng: &mut R,
    jobs: usize,
    machines: usize,
    min_ops: usize,
    max_ops: usize,
    max_options: usize,
    min_time: i32,
    max_time: i32,
) -> Instance {
    Instance {
        machine_count: machines,
        jobs: (0..jobs)
            .map(|_| job(rng, machines, min_ops, max_ops, max_options, min_time, max_time))
            .collect(),
    }
}

fn job<R: Rng>(
    rng: &mut R,
    machines: usize,
    min_ops: usize,
    max_ops: usize,
    max_options: usize,
    min_time: i32,
    max_time: i32,
) -> Job {
    let op_count = rng.random_range(min_ops..=max_ops);
    Job {
        operations: (0..op_count)
            .map(|_| operation(rng, machines, max_options, min_time, max_time))
            .collect(),
    }
}

fn operation<R: Rng>(
    rng: &mut R,
    machines: usize,
    max_options: usize,
    min_time: i32,
    max_time: i32,
) -> Operation {
    let option_count = rng.random_range(1..=max_options.min(machines));
    let options = index::sample(rng, machines, option_count)
        .iter()
        .map(|machine| MachineOption {
            machine,
            processing_time: rng.random_range(min_time..=max_time),
        })
        .collect();
    Operation { options }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn generated_instances_are_valid() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..10 {
            let generated = instance(&mut rng, 4, 3, 1, 5, 3, 1, 20);
            generated.validate().expect("generated instance is valid");
            assert_eq!(generated.jobs_count(), 4);
            assert_eq!(generated.machines_count(), 3);
            for job in &generated.jobs {
                assert!((1..=5).contains(&job.operations.len()));
                for op in &job.operations {
                    assert!((1..=3).contains(&op.options.len()));
                    // all alternatives of an operation are distinct machines
                    let mut seen = [false; 3];
                    for option in &op.options {
                        assert!(!seen[option.machine]);
                        seen[option.machine] = true;
                        assert!((1..=20).contains(&option.processing_time));
                    }
                }
            }
        }
    }

    #[test]
    fn option_count_is_capped_by_machine_count() {
        let mut rng = SmallRng::seed_from_u64(42);
        let generated = instance(&mut rng, 3, 2, 1, 3, 5, 1, 9);
        for job in &generated.jobs {
            for op in &job.operations {
                assert!(op.options.len() <= 2);
            }
        }
    }
}
