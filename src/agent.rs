// Self-learning controller that adapts the crossover and mutation rates.
// A tabular action-value function over `pop_size` states (the generation
// index modulo the population size) and two actions.

use rand::Rng;

/// Which of the two rates the controller resamples for a generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Resample the crossover probability from its range.
    Crossover = 0,
    /// Resample the mutation probability from its range.
    Mutation = 1,
}

/// Q-table plus the fixed learning and sampling parameters.
pub struct Agent {
    q: Vec<[f64; 2]>,
    epsilon: f64,
    alpha: f64,
    gamma: f64,
    pc_range: (f64, f64),
    pm_range: (f64, f64),
}

impl Agent {
    pub fn new(
        states: usize,
        epsilon: f64,
        alpha: f64,
        gamma: f64,
        pc_range: (f64, f64),
        pm_range: (f64, f64),
    ) -> Self {
        Self {
            q: vec![[0.0; 2]; states],
            epsilon,
            alpha,
            gamma,
            pc_range,
            pm_range,
        }
    }

    pub fn q_table(&self) -> &[[f64; 2]] {
        &self.q
    }

    pub fn sample_pc<R: Rng>(&self, rng: &mut R) -> f64 {
        rng.random_range(self.pc_range.0..self.pc_range.1)
    }

    pub fn sample_pm<R: Rng>(&self, rng: &mut R) -> f64 {
        rng.random_range(self.pm_range.0..self.pm_range.1)
    }

    /// ε-greedy: explore uniformly with probability ε, otherwise pick the
    /// action with the larger Q-value. Ties go to [`Action::Crossover`].
    pub fn select_action<R: Rng>(&self, state: usize, rng: &mut R) -> Action {
        if rng.random::<f64>() < self.epsilon {
            if rng.random_bool(0.5) {
                Action::Crossover
            } else {
                Action::Mutation
            }
        } else {
            self.greedy_action(state)
        }
    }

    fn greedy_action(&self, state: usize) -> Action {
        if self.q[state][1] > self.q[state][0] {
            Action::Mutation
        } else {
            Action::Crossover
        }
    }

    /// On-policy temporal-difference update.
    pub fn update_sarsa(
        &mut self,
        state: usize,
        action: Action,
        reward: f64,
        next_state: usize,
        next_action: Action,
    ) {
        let next = self.q[next_state][next_action as usize];
        self.update(state, action, reward, next);
    }

    /// Off-policy update against the best next action.
    pub fn update_q_learning(&mut self, state: usize, action: Action, reward: f64, next_state: usize) {
        let next = self.q[next_state][0].max(self.q[next_state][1]);
        self.update(state, action, reward, next);
    }

    fn update(&mut self, state: usize, action: Action, reward: f64, next: f64) {
        let cell = &mut self.q[state][action as usize];
        *cell = (1.0 - self.alpha) * *cell + self.alpha * (reward + self.gamma * next);
    }
}

/// Relative improvement of the best makespan, the controller's reward.
/// Positive on improvement, negative on regression, zero for an already
/// trivial best.
pub fn improvement_reward(before: i32, after: i32) -> f64 {
    if before == 0 {
        0.0
    } else {
        f64::from(before - after) / f64::from(before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn agent(states: usize, epsilon: f64) -> Agent {
        Agent::new(states, epsilon, 0.1, 0.9, (0.4, 0.9), (0.01, 0.21))
    }

    #[test]
    fn fresh_table_is_zeroed() {
        let agent = agent(5, 0.1);
        assert_eq!(agent.q_table().len(), 5);
        assert!(agent
            .q_table()
            .iter()
            .all(|row| row[0] == 0.0 && row[1] == 0.0));
    }

    #[test]
    fn sarsa_update_matches_hand_computation() {
        let mut agent = agent(3, 0.1);
        agent.update_sarsa(0, Action::Crossover, 1.0, 1, Action::Mutation);
        // (1 - 0.1) * 0 + 0.1 * (1 + 0.9 * 0)
        assert!((agent.q_table()[0][0] - 0.1).abs() < 1e-12);

        agent.update_sarsa(1, Action::Mutation, 0.5, 0, Action::Crossover);
        // next value is the freshly written q[0][0] = 0.1
        let expected = 0.1 * (0.5 + 0.9 * 0.1);
        assert!((agent.q_table()[1][1] - expected).abs() < 1e-12);
    }

    #[test]
    fn q_learning_takes_the_best_next_action() {
        let mut agent = agent(3, 0.1);
        agent.update_sarsa(1, Action::Mutation, 2.0, 2, Action::Crossover);
        assert!((agent.q_table()[1][1] - 0.2).abs() < 1e-12);

        agent.update_q_learning(0, Action::Crossover, 0.5, 1);
        // max over q[1] is 0.2 regardless of any sampled next action
        let expected = 0.1 * (0.5 + 0.9 * 0.2);
        assert!((agent.q_table()[0][0] - expected).abs() < 1e-12);
    }

    #[test]
    fn greedy_ties_pick_crossover() {
        let agent = agent(2, 0.0);
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..20 {
            assert_eq!(agent.select_action(0, &mut rng), Action::Crossover);
        }
    }

    #[test]
    fn greedy_prefers_the_larger_entry() {
        let mut agent = agent(2, 0.0);
        agent.update_sarsa(0, Action::Mutation, 1.0, 1, Action::Crossover);
        let mut rng = SmallRng::seed_from_u64(42);
        assert_eq!(agent.select_action(0, &mut rng), Action::Mutation);
    }

    #[test]
    fn exploration_reaches_both_actions() {
        let agent = agent(2, 1.0);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut seen = [false; 2];
        for _ in 0..100 {
            seen[agent.select_action(0, &mut rng) as usize] = true;
        }
        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn sampled_rates_stay_in_range() {
        let agent = agent(2, 0.1);
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..100 {
            let pc = agent.sample_pc(&mut rng);
            assert!((0.4..0.9).contains(&pc));
            let pm = agent.sample_pm(&mut rng);
            assert!((0.01..0.21).contains(&pm));
        }
    }

    #[test]
    fn reward_is_relative_improvement() {
        assert!((improvement_reward(10, 8) - 0.2).abs() < 1e-12);
        assert!((improvement_reward(10, 12) + 0.2).abs() < 1e-12);
        assert_eq!(improvement_reward(0, 0), 0.0);
        assert_eq!(improvement_reward(7, 7), 0.0);
    }
}
