// Generational loop of the self-learning genetic algorithm.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::agent::{improvement_reward, Action, Agent};
use crate::decoding::Decoder;
use crate::encoding::{initialize_population, Chromosome};
use crate::genetic;
use crate::instance::Instance;

/// Tunables of a run, passed explicitly instead of living in globals.
#[derive(Clone, Debug)]
pub struct SlgaConfig {
    pub pop_size: usize,
    pub max_gen: usize,
    /// Share of the population carried over unconditionally by elitism.
    pub elite_rate: f64,
    pub pc_range: (f64, f64),
    pub pm_range: (f64, f64),
    pub epsilon: f64,
    pub alpha: f64,
    pub gamma: f64,
    /// Consecutive generations with an unchanged best makespan before the
    /// run stops early.
    pub max_no_improvement: usize,
    /// SARSA drives the updates while `generation <= factor * pop_size`,
    /// Q-learning afterwards.
    pub phase_switch_factor: usize,
    /// Drawn from OS entropy and logged when absent.
    pub seed: Option<u64>,
}

impl Default for SlgaConfig {
    fn default() -> Self {
        Self {
            pop_size: 300,
            max_gen: 200,
            elite_rate: 0.2,
            pc_range: (0.4, 0.9),
            pm_range: (0.01, 0.21),
            epsilon: 0.1,
            alpha: 0.1,
            gamma: 0.9,
            max_no_improvement: 50,
            phase_switch_factor: 10,
            seed: None,
        }
    }
}

impl SlgaConfig {
    fn validate(&self) {
        assert!(self.pop_size >= 2, "population must hold at least two individuals");
        assert!(
            (self.elite_rate * self.pop_size as f64) as usize >= 1,
            "elitism must keep at least one individual"
        );
        assert!(self.max_gen >= 1, "at least one generation must run");
        assert!(self.pc_range.0 < self.pc_range.1, "empty crossover range");
        assert!(self.pm_range.0 < self.pm_range.1, "empty mutation range");
        assert!(
            (0.0..=1.0).contains(&self.epsilon),
            "epsilon must be a probability"
        );
    }
}

/// One row of the per-generation history.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRecord {
    pub generation: usize,
    pub best_time: i32,
    pub average_time: f64,
    pub pc: f64,
    pub pm: f64,
    pub reward: f64,
}

/// Result of a run: the best chromosome of the final population, the best of
/// the initial population (for the before/after schedule pair), the recorded
/// history and the learned Q-table.
pub struct RunOutcome {
    pub best: Chromosome,
    pub best_time: i32,
    pub initial_best: Chromosome,
    pub history: Vec<GenerationRecord>,
    pub generations: usize,
    pub q_table: Vec<[f64; 2]>,
    pub seed: u64,
}

fn evaluate(decoder: &mut Decoder<'_>, population: &[Chromosome], fitness: &mut Vec<i32>) {
    fitness.clear();
    fitness.extend(population.iter().map(|individual| decoder.makespan(individual)));
}

/// Index of the fittest individual; ties go to the first encountered.
fn best_index(fitness: &[i32]) -> usize {
    assert!(!fitness.is_empty(), "population is never empty");
    let mut winner = 0;
    for (index, &time) in fitness.iter().enumerate().skip(1) {
        if time < fitness[winner] {
            winner = index;
        }
    }
    winner
}

/// Runs the self-learning GA to completion. The stop flag is honored at
/// generation boundaries only.
pub fn run(instance: &Instance, config: &SlgaConfig, stop: &AtomicBool) -> RunOutcome {
    config.validate();

    let seed = config.seed.unwrap_or_else(|| {
        let drawn = rand::rng().random();
        info!("no seed given, drew {drawn}");
        drawn
    });
    let mut rng = StdRng::seed_from_u64(seed);

    let mut population = initialize_population(instance, config.pop_size, &mut rng);
    let mut agent = Agent::new(
        config.pop_size,
        config.epsilon,
        config.alpha,
        config.gamma,
        config.pc_range,
        config.pm_range,
    );
    let mut decoder = Decoder::new(instance);
    let mut fitness = Vec::with_capacity(config.pop_size);

    evaluate(&mut decoder, &population, &mut fitness);
    let initial_best = population[best_index(&fitness)].clone();

    let mut history = Vec::new();
    let mut previous_best = None;
    let mut no_improvement = 0;
    let mut generation = 1;

    while generation <= config.max_gen
        && no_improvement < config.max_no_improvement
        && !stop.load(Ordering::Relaxed)
    {
        debug_assert_eq!(population.len(), config.pop_size);

        let best_time = fitness[best_index(&fitness)];
        let average_time =
            fitness.iter().map(|&time| f64::from(time)).sum::<f64>() / fitness.len() as f64;
        if previous_best == Some(best_time) {
            no_improvement += 1;
        } else {
            no_improvement = 0;
        }
        previous_best = Some(best_time);

        // Both rates get a fresh baseline draw; the chosen action decides
        // which of the two is credited with this generation's reward.
        let state = generation % config.pop_size;
        let mut pc = agent.sample_pc(&mut rng);
        let mut pm = agent.sample_pm(&mut rng);
        let action = agent.select_action(state, &mut rng);
        match action {
            Action::Crossover => pc = agent.sample_pc(&mut rng),
            Action::Mutation => pm = agent.sample_pm(&mut rng),
        }

        population = genetic::selection(&population, &fitness, config.elite_rate, &mut rng);
        population = genetic::crossover(&population, instance.jobs_count(), pc, &mut rng);
        population = genetic::mutation(&population, instance, pm, &mut rng);

        let next_state = (generation + 1) % config.pop_size;
        let next_action = agent.select_action(next_state, &mut rng);

        evaluate(&mut decoder, &population, &mut fitness);
        let new_best_time = fitness[best_index(&fitness)];
        let reward = improvement_reward(best_time, new_best_time);

        if generation <= config.phase_switch_factor * config.pop_size {
            agent.update_sarsa(state, action, reward, next_state, next_action);
        } else {
            agent.update_q_learning(state, action, reward, next_state);
        }

        debug!(
            "generation {generation}: best {best_time}, average {average_time:.2}, \
             Pc {pc:.3}, Pm {pm:.3}, reward {reward:.4}"
        );
        history.push(GenerationRecord {
            generation,
            best_time,
            average_time,
            pc,
            pm,
            reward,
        });
        generation += 1;
    }

    let winner = best_index(&fitness);
    info!(
        "finished after {} generations with makespan {}",
        generation - 1,
        fitness[winner]
    );
    RunOutcome {
        best: population[winner].clone(),
        best_time: fitness[winner],
        initial_best,
        history,
        generations: generation - 1,
        q_table: agent.q_table().to_vec(),
        seed,
    }
}
