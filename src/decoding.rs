// Decodes a chromosome pair into a concrete per-machine schedule.

use crate::encoding::Chromosome;
use crate::instance::Instance;

/// An operation placed on a machine by the decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedOperation {
    /// Job index.
    pub job: usize,
    /// Operation index within the job.
    pub op_index: usize,
    /// Processing time on the chosen machine.
    pub duration: i32,
    /// Earliest start permitted by the preceding operation of the job.
    pub earliest_start: i32,
    /// Start chosen by earliest-gap insertion. Never before `earliest_start`.
    pub start: i32,
}

impl PlacedOperation {
    pub fn end(&self) -> i32 {
        self.start + self.duration
    }

    /// External label, e.g. `OP_3-1` for the first operation of job 3.
    pub fn label(&self) -> String {
        format!("OP_{}-{}", self.job + 1, self.op_index + 1)
    }
}

/// Schedule in the export shape: per machine name, `(start, end, label)`
/// triples ordered by start. The sole contract with the Gantt renderer.
pub type GanttData = Vec<(String, Vec<(i32, i32, String)>)>;

/// Decoder for one instance, reusable across chromosomes.
///
/// Decoding is the hot path of fitness evaluation, so the per-job counters
/// and per-machine interval lists live here and are cleared instead of
/// reallocated on every call.
pub struct Decoder<'a> {
    instance: &'a Instance,
    /// Start of each job's block in the job-major machine-selection layout.
    job_offsets: Vec<usize>,
    /// How many operations of each job have been placed so far.
    op_progress: Vec<usize>,
    /// Earliest time the next operation of each job may start.
    job_ready: Vec<i32>,
    /// Busy intervals per machine, kept sorted by start.
    machines: Vec<Vec<PlacedOperation>>,
}

impl<'a> Decoder<'a> {
    pub fn new(instance: &'a Instance) -> Self {
        let mut job_offsets = Vec::with_capacity(instance.jobs_count());
        let mut offset = 0;
        for job in 0..instance.jobs_count() {
            job_offsets.push(offset);
            offset += instance.operations_of(job).len();
        }
        Self {
            instance,
            job_offsets,
            op_progress: vec![0; instance.jobs_count()],
            job_ready: vec![0; instance.jobs_count()],
            machines: vec![Vec::new(); instance.machines_count()],
        }
    }

    /// Dispatches the operations in sequence order onto their selected
    /// machines and returns the per-machine schedules, sorted by start.
    pub fn decode(&mut self, chromosome: &Chromosome) -> &[Vec<PlacedOperation>] {
        self.op_progress.fill(0);
        self.job_ready.fill(0);
        for machine in &mut self.machines {
            machine.clear();
        }

        for &job in &chromosome.os {
            let op_index = self.op_progress[job];
            let choice = chromosome.ms[self.job_offsets[job] + op_index];
            let options = self.instance.options_of(job, op_index);
            assert!(
                choice < options.len(),
                "machine option {choice} out of range for operation {op_index} of job {job}"
            );
            let option = options[choice];

            let earliest = self.job_ready[job];
            let placed = &mut self.machines[option.machine];
            let start = earliest_fit(placed, earliest, option.processing_time);
            let position = placed.partition_point(|op| op.start <= start);
            placed.insert(
                position,
                PlacedOperation {
                    job,
                    op_index,
                    duration: option.processing_time,
                    earliest_start: earliest,
                    start,
                },
            );

            self.op_progress[job] = op_index + 1;
            self.job_ready[job] = start + option.processing_time;
        }

        &self.machines
    }

    /// Completion time of the last operation across all machines.
    pub fn makespan(&mut self, chromosome: &Chromosome) -> i32 {
        makespan_of(self.decode(chromosome))
    }
}

/// Smallest `start >= earliest` such that `[start, start + duration)` does
/// not overlap any of the busy intervals, which are sorted by start.
fn earliest_fit(placed: &[PlacedOperation], earliest: i32, duration: i32) -> i32 {
    let mut candidate = earliest;
    for op in placed {
        if candidate + duration <= op.start {
            break;
        }
        candidate = candidate.max(op.end());
    }
    candidate
}

pub fn makespan_of(machines: &[Vec<PlacedOperation>]) -> i32 {
    machines
        .iter()
        .flat_map(|machine| machine.iter().map(PlacedOperation::end))
        .max()
        .unwrap_or(0)
}

/// Converts a decoded schedule into the export shape consumed by the Gantt
/// renderer and any downstream writer.
pub fn translate_decoded(machines: &[Vec<PlacedOperation>]) -> GanttData {
    machines
        .iter()
        .enumerate()
        .map(|(index, machine)| {
            let name = format!("Machine-{}", index + 1);
            let operations = machine
                .iter()
                .map(|op| (op.start, op.end(), op.label()))
                .collect();
            (name, operations)
        })
        .collect()
}
