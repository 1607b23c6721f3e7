use crate::error::Error;

/// One way of executing an operation: a machine and its processing time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MachineOption {
    /// Index of the machine, 0-based.
    pub machine: usize,
    /// Time the machine needs to process the operation.
    pub processing_time: i32,
}

/// A single operation of a job together with its alternative machines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operation {
    /// The machines this operation may run on. Never empty in a valid instance.
    pub options: Vec<MachineOption>,
}

/// An ordered sequence of operations that must run one after another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub operations: Vec<Operation>,
}

/// A problem instance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instance {
    /// The number of machines available
    pub machine_count: usize,
    /// A list of jobs
    pub jobs: Vec<Job>,
}

impl Instance {
    pub fn jobs_count(&self) -> usize {
        self.jobs.len()
    }

    pub fn machines_count(&self) -> usize {
        self.machine_count
    }

    /// Total number of operations across all jobs. This is the length of both
    /// chromosome vectors.
    pub fn total_operations(&self) -> usize {
        self.jobs.iter().map(|job| job.operations.len()).sum()
    }

    pub fn operations_of(&self, job: usize) -> &[Operation] {
        &self.jobs[job].operations
    }

    pub fn options_of(&self, job: usize, op_index: usize) -> &[MachineOption] {
        &self.jobs[job].operations[op_index].options
    }

    /// Number of machine options per operation, in job-major order. Entry `p`
    /// bounds the legal values of the machine-selection vector at position `p`.
    pub fn option_counts(&self) -> Vec<usize> {
        self.jobs
            .iter()
            .flat_map(|job| job.operations.iter().map(|op| op.options.len()))
            .collect()
    }

    /// Checks the structural invariants that the parser cannot express:
    /// every job has at least one operation, every operation at least one
    /// option, machine indices are in range and processing times non-negative.
    pub fn validate(&self) -> Result<(), Error> {
        if self.machine_count == 0 {
            return Err(Error::InvalidInstance("no machines".to_string()));
        }
        if self.jobs.is_empty() {
            return Err(Error::InvalidInstance("no jobs".to_string()));
        }
        for (j, job) in self.jobs.iter().enumerate() {
            if job.operations.is_empty() {
                return Err(Error::InvalidInstance(format!("job {j} has no operations")));
            }
            for (k, op) in job.operations.iter().enumerate() {
                if op.options.is_empty() {
                    return Err(Error::InvalidInstance(format!(
                        "operation {k} of job {j} has no machine options"
                    )));
                }
                for option in &op.options {
                    if option.machine >= self.machine_count {
                        return Err(Error::InvalidInstance(format!(
                            "operation {k} of job {j} references machine {} of {}",
                            option.machine, self.machine_count
                        )));
                    }
                    if option.processing_time < 0 {
                        return Err(Error::InvalidInstance(format!(
                            "operation {k} of job {j} has negative processing time {}",
                            option.processing_time
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(machine: usize, processing_time: i32) -> MachineOption {
        MachineOption {
            machine,
            processing_time,
        }
    }

    fn two_job_instance() -> Instance {
        Instance {
            machine_count: 2,
            jobs: vec![
                Job {
                    operations: vec![
                        Operation {
                            options: vec![option(0, 3), option(1, 4)],
                        },
                        Operation {
                            options: vec![option(0, 1)],
                        },
                    ],
                },
                Job {
                    operations: vec![Operation {
                        options: vec![option(1, 6)],
                    }],
                },
            ],
        }
    }

    #[test]
    fn counts() {
        let instance = two_job_instance();
        assert_eq!(instance.jobs_count(), 2);
        assert_eq!(instance.machines_count(), 2);
        assert_eq!(instance.total_operations(), 3);
        assert_eq!(instance.option_counts(), vec![2, 1, 1]);
    }

    #[test]
    fn valid_instance_passes() {
        assert!(two_job_instance().validate().is_ok());
    }

    #[test]
    fn machine_out_of_range_fails() {
        let mut instance = two_job_instance();
        instance.jobs[1].operations[0].options[0].machine = 2;
        assert!(matches!(
            instance.validate(),
            Err(Error::InvalidInstance(_))
        ));
    }

    #[test]
    fn negative_processing_time_fails() {
        let mut instance = two_job_instance();
        instance.jobs[0].operations[1].options[0].processing_time = -1;
        assert!(matches!(
            instance.validate(),
            Err(Error::InvalidInstance(_))
        ));
    }

    #[test]
    fn empty_job_fails() {
        let mut instance = two_job_instance();
        instance.jobs[0].operations.clear();
        assert!(matches!(
            instance.validate(),
            Err(Error::InvalidInstance(_))
        ));
    }

    #[test]
    fn empty_option_list_fails() {
        let mut instance = two_job_instance();
        instance.jobs[0].operations[0].options.clear();
        assert!(matches!(
            instance.validate(),
            Err(Error::InvalidInstance(_))
        ));
    }
}
