//! Discrete hill climbing with incremental parameter unlocking
//!
//! Minimizes the objective of an [`OptimizationTarget`] by trying
//! `±step` on one parameter at a time. Parameters join the search one by
//! one: only `start_index` is searched at first, and the next parameter is
//! unlocked once every unlocked parameter's step has shrunk below its
//! final value.
//!
//! One call to [`advance`] performs one sweep:
//!
//! - every unlocked parameter whose step is still at or above its final
//!   value is perturbed by `-step` and `+step`; invalid candidates are
//!   skipped
//! - only the single best strictly improving perturbation of the sweep is
//!   remembered, and it is committed when the sweep ends
//! - a sweep without improvement multiplies the steps of the searched
//!   parameters by their reduction factors
//! - once no unlocked parameter is searchable, the next parameter is
//!   unlocked and all unlocked steps restart from their initial values;
//!   after `end_index` the search is done
//!
//! A parameter whose initial step is already below its final step stays
//! at its starting value.

use crate::{EstimateError, EstimateResult};

/// Default cap on the number of sweeps
pub const DEFAULT_MAX_SWEEPS: usize = 10_000;

/// A parameterized function the hill climber can minimize
pub trait OptimizationTarget {
    /// Data the objective is evaluated on
    type Data: ?Sized;

    /// Number of indexed parameters
    fn parameter_count(&self) -> usize;

    /// Parameter by index.
    ///
    /// Implementations panic if `index >= parameter_count()`.
    fn parameter(&self, index: usize) -> f64;

    /// Set a parameter by index.
    ///
    /// Implementations panic if `index >= parameter_count()`.
    fn set_parameter(&mut self, index: usize, value: f64);

    /// Whether the current parameters are admissible
    fn is_valid(&self) -> bool;

    /// Objective value; smaller is better
    fn evaluate(&self, data: &Self::Data) -> f64;
}

/// Step schedule and unlocking range of a hill climb
#[derive(Debug, Clone, PartialEq)]
pub struct HillClimbOptions {
    /// Step each parameter starts (and restarts) with
    pub initial_step: Vec<f64>,
    /// Factor applied to a step after a sweep without improvement, in (0, 1)
    pub step_reduction: Vec<f64>,
    /// A parameter is searched while its step is at or above this value
    pub final_step: Vec<f64>,
    /// First parameter searched
    pub start_index: usize,
    /// Last parameter to unlock
    pub end_index: usize,
    /// Hard cap on the number of sweeps
    pub max_sweeps: usize,
}

impl HillClimbOptions {
    /// Uniform schedule over `count` parameters
    pub fn uniform(count: usize, initial_step: f64, step_reduction: f64, final_step: f64) -> Self {
        Self {
            initial_step: vec![initial_step; count],
            step_reduction: vec![step_reduction; count],
            final_step: vec![final_step; count],
            start_index: 0,
            end_index: count.saturating_sub(1),
            max_sweeps: DEFAULT_MAX_SWEEPS,
        }
    }

    /// Check that the schedule fits `parameter_count` parameters and
    /// terminates.
    ///
    /// Only parameters in `start_index..=end_index` are checked. An initial
    /// step below the final step is allowed; that parameter is never
    /// searched.
    pub fn validate(&self, parameter_count: usize) -> EstimateResult<()> {
        let lengths = [
            self.initial_step.len(),
            self.step_reduction.len(),
            self.final_step.len(),
        ];
        if lengths.iter().any(|&n| n != parameter_count) {
            return Err(EstimateError::InvalidParameters(format!(
                "step schedules have lengths {:?}, expected {}",
                lengths, parameter_count
            )));
        }
        if self.start_index > self.end_index || self.end_index >= parameter_count {
            return Err(EstimateError::InvalidParameters(format!(
                "parameter range {}..={} invalid for {} parameters",
                self.start_index, self.end_index, parameter_count
            )));
        }
        for i in self.start_index..=self.end_index {
            let (step, reduction, last) = (
                self.initial_step[i],
                self.step_reduction[i],
                self.final_step[i],
            );
            if !(step.is_finite() && step >= 0.0) {
                return Err(EstimateError::InvalidParameters(format!(
                    "initial step {} of parameter {} must be non-negative",
                    step, i
                )));
            }
            if !(reduction > 0.0 && reduction < 1.0) {
                return Err(EstimateError::InvalidParameters(format!(
                    "step reduction {} of parameter {} must be in (0, 1)",
                    reduction, i
                )));
            }
            if !(last.is_finite() && last > 0.0) {
                return Err(EstimateError::InvalidParameters(format!(
                    "final step {} of parameter {} must be positive",
                    last, i
                )));
            }
        }
        if self.max_sweeps == 0 {
            return Err(EstimateError::InvalidParameters(
                "max_sweeps must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Hill climb state, threaded through [`advance`]
#[derive(Debug, Clone, PartialEq)]
pub struct HillClimbState<T> {
    /// Function being optimized, at the best point found so far
    pub target: T,
    /// Current step per parameter
    pub steps: Vec<f64>,
    /// Highest unlocked parameter index
    pub max_unlocked: usize,
    /// Objective at the current point
    pub best_value: f64,
    /// Whether the last sweep committed a move
    pub improved: bool,
    /// Move committed by the last sweep, as `(index, value)`
    pub update: Option<(usize, f64)>,
    /// Sweeps performed so far
    pub sweeps: usize,
    /// Whether the search has finished
    pub done: bool,
    options: HillClimbOptions,
}

impl<T: OptimizationTarget> HillClimbState<T> {
    /// Start a hill climb from `target`
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::InvalidParameters`] if the options do not
    /// fit the target.
    pub fn new(target: T, options: HillClimbOptions, data: &T::Data) -> EstimateResult<Self> {
        options.validate(target.parameter_count())?;
        let best_value = target.evaluate(data);
        Ok(HillClimbState {
            steps: options.initial_step.clone(),
            max_unlocked: options.start_index,
            best_value,
            improved: false,
            update: None,
            sweeps: 0,
            done: false,
            target,
            options,
        })
    }

    /// Options the climb was started with
    pub fn options(&self) -> &HillClimbOptions {
        &self.options
    }

    fn searchable(&self, index: usize) -> bool {
        self.steps[index] >= self.options.final_step[index]
    }
}

/// Perform one sweep. Returns the new state and whether the search is done.
pub fn advance<T: OptimizationTarget>(
    mut state: HillClimbState<T>,
    data: &T::Data,
) -> (HillClimbState<T>, bool) {
    if state.done {
        return (state, true);
    }
    if state.sweeps >= state.options.max_sweeps {
        tracing::warn!(
            sweeps = state.sweeps,
            best = state.best_value,
            "hill climb stopped at sweep cap"
        );
        state.done = true;
        return (state, true);
    }
    state.sweeps += 1;

    let start = state.options.start_index;
    let active: Vec<usize> = (start..=state.max_unlocked)
        .filter(|&i| state.searchable(i))
        .collect();

    let mut best = state.best_value;
    let mut update = None;
    for &i in &active {
        let original = state.target.parameter(i);
        for sign in [-1.0, 1.0] {
            let candidate = original + sign * state.steps[i];
            state.target.set_parameter(i, candidate);
            if state.target.is_valid() {
                let value = state.target.evaluate(data);
                if value < best {
                    best = value;
                    update = Some((i, candidate));
                }
            }
        }
        state.target.set_parameter(i, original);
    }

    state.update = update;
    state.improved = update.is_some();
    if let Some((i, value)) = update {
        state.target.set_parameter(i, value);
        state.best_value = best;
        tracing::debug!(
            sweep = state.sweeps,
            parameter = i,
            value,
            best,
            "hill climb move"
        );
        return (state, false);
    }

    for &i in &active {
        state.steps[i] *= state.options.step_reduction[i];
    }
    if (start..=state.max_unlocked).any(|i| state.searchable(i)) {
        return (state, false);
    }

    if state.max_unlocked >= state.options.end_index {
        state.done = true;
        return (state, true);
    }

    state.max_unlocked += 1;
    for i in start..=state.max_unlocked {
        state.steps[i] = state.options.initial_step[i];
    }
    tracing::debug!(
        sweep = state.sweeps,
        unlocked = state.max_unlocked,
        best = state.best_value,
        "hill climb unlocked parameter"
    );
    (state, false)
}

/// Advance until done and return the final state
pub fn run<T: OptimizationTarget>(
    mut state: HillClimbState<T>,
    data: &T::Data,
) -> HillClimbState<T> {
    let mut done = state.done;
    while !done {
        (state, done) = advance(state, data);
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Separable quadratic with its minimum at `center`
    #[derive(Debug, Clone, PartialEq)]
    struct Bowl {
        params: Vec<f64>,
        center: Vec<f64>,
        bound: f64,
    }

    impl OptimizationTarget for Bowl {
        type Data = ();

        fn parameter_count(&self) -> usize {
            self.params.len()
        }

        fn parameter(&self, index: usize) -> f64 {
            self.params[index]
        }

        fn set_parameter(&mut self, index: usize, value: f64) {
            self.params[index] = value;
        }

        fn is_valid(&self) -> bool {
            self.params.iter().all(|p| p.abs() <= self.bound)
        }

        fn evaluate(&self, _: &()) -> f64 {
            self.params
                .iter()
                .zip(&self.center)
                .map(|(p, c)| (p - c) * (p - c))
                .sum()
        }
    }

    fn bowl(center: Vec<f64>) -> Bowl {
        Bowl {
            params: vec![0.0; center.len()],
            center,
            bound: 100.0,
        }
    }

    #[test]
    fn test_converges_on_separable_quadratic() {
        let options = HillClimbOptions::uniform(3, 4.0, 0.5, 1.0 / 64.0);
        let state = HillClimbState::new(bowl(vec![1.3, -2.7, 0.4]), options, &()).unwrap();
        let state = run(state, &());
        assert!(state.done);
        for (p, c) in state.target.params.iter().zip([1.3, -2.7, 0.4]) {
            assert!((p - c).abs() <= 1.0 / 64.0, "{} vs {}", p, c);
        }
    }

    #[test]
    fn test_best_value_never_increases() {
        let options = HillClimbOptions::uniform(2, 5.0, 0.5, 0.01);
        let mut state = HillClimbState::new(bowl(vec![3.0, -1.0]), options, &()).unwrap();
        let mut done = false;
        while !done {
            let before = state.best_value;
            (state, done) = advance(state, &());
            assert!(state.best_value <= before);
            assert_eq!(state.best_value, state.target.evaluate(&()));
        }
    }

    #[test]
    fn test_one_move_per_sweep() {
        let options = HillClimbOptions {
            start_index: 0,
            end_index: 1,
            ..HillClimbOptions::uniform(2, 1.0, 0.5, 0.5)
        };
        let mut state = HillClimbState::new(bowl(vec![5.0, 5.0]), options, &()).unwrap();
        // Parameter 1 starts locked
        (state, _) = advance(state, &());
        assert_eq!(state.target.params, vec![1.0, 0.0]);
        assert_eq!(state.update, Some((0, 1.0)));
        assert!(state.improved);
    }

    #[test]
    fn test_invalid_candidates_skipped() {
        let mut target = bowl(vec![10.0]);
        target.bound = 0.5;
        let options = HillClimbOptions::uniform(1, 1.0, 0.5, 0.1);
        let state = run(HillClimbState::new(target, options, &()).unwrap(), &());
        assert!(state.target.is_valid());
        assert!((state.target.params[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sweep_cap() {
        let options = HillClimbOptions {
            max_sweeps: 3,
            ..HillClimbOptions::uniform(1, 1e-3, 0.5, 1e-9)
        };
        let state = run(HillClimbState::new(bowl(vec![1000.0]), options, &()).unwrap(), &());
        assert!(state.done);
        assert_eq!(state.sweeps, 3);
    }

    #[test]
    fn test_rejects_bad_schedules() {
        let target = bowl(vec![0.0, 0.0]);
        let mut options = HillClimbOptions::uniform(2, 1.0, 0.5, 0.1);
        options.step_reduction[1] = 1.0;
        assert!(HillClimbState::new(target.clone(), options, &()).is_err());

        let options = HillClimbOptions::uniform(3, 1.0, 0.5, 0.1);
        assert!(HillClimbState::new(target.clone(), options, &()).is_err());

        let mut options = HillClimbOptions::uniform(2, 1.0, 0.5, 0.1);
        options.end_index = 2;
        assert!(HillClimbState::new(target, options, &()).is_err());
    }

    #[test]
    fn test_zero_initial_step_is_never_searched() {
        let mut options = HillClimbOptions::uniform(2, 1.0, 0.5, 1.0 / 64.0);
        options.initial_step[1] = 0.0;
        let state = HillClimbState::new(bowl(vec![3.0, 4.0]), options, &()).unwrap();
        let state = run(state, &());
        assert!(state.done);
        assert_eq!(state.max_unlocked, 1);
        assert_eq!(state.target.params, vec![3.0, 0.0]);
    }

    #[test]
    fn test_parameters_outside_range_not_validated() {
        let mut options = HillClimbOptions::uniform(3, 1.0, 0.5, 0.1);
        options.end_index = 1;
        options.initial_step[2] = f64::NAN;
        options.step_reduction[2] = 0.0;
        assert!(HillClimbState::new(bowl(vec![0.0; 3]), options, &()).is_ok());

        let mut options = HillClimbOptions::uniform(2, 1.0, 0.5, 0.1);
        options.initial_step[0] = -1.0;
        assert!(HillClimbState::new(bowl(vec![0.0; 2]), options, &()).is_err());
    }
}
