// Reads and writes .fjs files as found in the Monaldo/Brandimarte FJSP
// datasets. One header line, then one line per job:
// <nbOps> ( <nbOptions> (<machineId> <time>){nbOptions} ){nbOps}
// Machine ids are 1-based in the file and 0-based in memory.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::Error;
use crate::instance::{Instance, Job, MachineOption, Operation};

pub fn parse_file(path: &Path) -> Result<Instance, Error> {
    let text = fs::read_to_string(path)?;
    parse(&text)
}

pub fn parse(input: &str) -> Result<Instance, Error> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let (header_line, header) = lines.next().ok_or_else(|| Error::Parse {
        line: 1,
        reason: "empty file".to_string(),
    })?;
    let mut tokens = header.split_whitespace();
    let jobs_count = field(&mut tokens, header_line, "number of jobs")?;
    let machine_count = field(&mut tokens, header_line, "number of machines")?;
    // The remainder of the header (average machines per operation) is ignored.

    let mut jobs = Vec::with_capacity(jobs_count);
    for _ in 0..jobs_count {
        let (line, text) = lines.next().ok_or_else(|| Error::Parse {
            line: header_line,
            reason: format!("expected {jobs_count} job lines, found {}", jobs.len()),
        })?;
        jobs.push(parse_job(text, line, machine_count)?);
    }

    Ok(Instance {
        machine_count,
        jobs,
    })
}

fn parse_job(text: &str, line: usize, machine_count: usize) -> Result<Job, Error> {
    let mut tokens = text.split_whitespace();
    let op_count = field(&mut tokens, line, "operation count")?;
    let mut operations = Vec::with_capacity(op_count);
    for _ in 0..op_count {
        let option_count = field(&mut tokens, line, "option count")?;
        let mut options = Vec::with_capacity(option_count);
        for _ in 0..option_count {
            let machine = field(&mut tokens, line, "machine id")?;
            if machine == 0 || machine > machine_count {
                return Err(Error::Parse {
                    line,
                    reason: format!("machine id {machine} out of range 1..={machine_count}"),
                });
            }
            let time = field(&mut tokens, line, "processing time")?;
            let processing_time = i32::try_from(time).map_err(|_| Error::Parse {
                line,
                reason: format!("processing time {time} too large"),
            })?;
            options.push(MachineOption {
                machine: machine - 1,
                processing_time,
            });
        }
        operations.push(Operation { options });
    }
    if let Some(extra) = tokens.next() {
        return Err(Error::Parse {
            line,
            reason: format!("trailing token {extra:?} after {op_count} operations"),
        });
    }
    Ok(Job { operations })
}

fn field<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
    what: &str,
) -> Result<usize, Error> {
    let token = tokens.next().ok_or_else(|| Error::Parse {
        line,
        reason: format!("missing {what}"),
    })?;
    token.parse().map_err(|_| Error::Parse {
        line,
        reason: format!("bad {what}: {token:?}"),
    })
}

/// Renders an instance back into the .fjs format. The header's third value is
/// the average number of machine options per operation.
pub fn format(instance: &Instance) -> String {
    let total_ops = instance.total_operations();
    let total_options: usize = instance
        .jobs
        .iter()
        .flat_map(|job| job.operations.iter())
        .map(|op| op.options.len())
        .sum();
    let avg_options = if total_ops == 0 {
        0.0
    } else {
        total_options as f64 / total_ops as f64
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} {avg_options:.1}",
        instance.jobs_count(),
        instance.machines_count()
    );
    for job in &instance.jobs {
        let _ = write!(out, "{}", job.operations.len());
        for op in &job.operations {
            let _ = write!(out, " {}", op.options.len());
            for option in &op.options {
                let _ = write!(out, " {} {}", option.machine + 1, option.processing_time);
            }
        }
        let _ = writeln!(out);
    }
    out
}

pub fn write_file(path: &Path, instance: &Instance) -> Result<(), Error> {
    fs::write(path, format(instance))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "2 2 1.3\n2 2 1 3 2 4 1 1 1\n1 1 2 6\n";

    #[test]
    fn parses_sample() {
        let instance = parse(SAMPLE).expect("sample parses");
        assert_eq!(instance.machines_count(), 2);
        assert_eq!(instance.jobs_count(), 2);
        assert_eq!(instance.total_operations(), 3);

        let first = instance.options_of(0, 0);
        assert_eq!(
            first,
            &[
                MachineOption {
                    machine: 0,
                    processing_time: 3
                },
                MachineOption {
                    machine: 1,
                    processing_time: 4
                },
            ]
        );
        assert_eq!(
            instance.options_of(1, 0),
            &[MachineOption {
                machine: 1,
                processing_time: 6
            }]
        );
    }

    #[test]
    fn header_extras_are_ignored() {
        let instance = parse("1 1 totally ignored\n1 1 1 5\n").expect("parses");
        assert_eq!(instance.jobs_count(), 1);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let instance = parse("\n2 2\n\n1 1 1 2\n\n1 1 2 3\n\n").expect("parses");
        assert_eq!(instance.jobs_count(), 2);
    }

    #[test]
    fn missing_job_line_is_reported() {
        let error = parse("2 2\n1 1 1 5\n").expect_err("one job line missing");
        assert!(matches!(error, Error::Parse { .. }));
    }

    #[test]
    fn bad_token_reports_line() {
        let error = parse("1 2\n1 1 x 5\n").expect_err("bad machine id");
        match error {
            Error::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn machine_id_out_of_range_is_rejected() {
        assert!(parse("1 2\n1 1 3 5\n").is_err());
        assert!(parse("1 2\n1 1 0 5\n").is_err());
    }

    #[test]
    fn negative_processing_time_is_rejected() {
        assert!(parse("1 2\n1 1 1 -5\n").is_err());
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        assert!(parse("1 1\n1 1 1 5 9\n").is_err());
    }

    #[test]
    fn roundtrips_through_format() {
        let instance = parse(SAMPLE).expect("sample parses");
        let reparsed = parse(&format(&instance)).expect("formatted text parses");
        assert_eq!(instance, reparsed);
    }
}
