//! Ordered adjustment steps and the calculator contract.
//!
//! Every jurisdiction describes its rules as a static list of named
//! [`Step`]s. A [`Pipeline`] runs them in order against a result record that
//! starts from its `Default`, so each step only reads the calculator, the
//! input and what earlier steps already filled in.

use tracing::{debug, trace};

use crate::models::{ValidationError, ValidationErrors};

/// Signature of one adjustment step.
pub type StepFn<C, I, S> = fn(&C, &I, &mut S);

/// A named, pure adjustment applied to the running result.
pub struct Step<C, I, S> {
    name: &'static str,
    apply: StepFn<C, I, S>,
}

impl<C, I, S> Step<C, I, S> {
    pub const fn new(
        name: &'static str,
        apply: StepFn<C, I, S>,
    ) -> Self {
        Self { name, apply }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Runs a fixed sequence of [`Step`]s.
pub struct Pipeline<'a, C, I, S> {
    steps: &'a [Step<C, I, S>],
}

impl<'a, C, I, S> Pipeline<'a, C, I, S>
where
    S: Default + std::fmt::Debug,
{
    pub const fn new(steps: &'a [Step<C, I, S>]) -> Self {
        Self { steps }
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(Step::name).collect()
    }

    /// Applies every step in order and returns the finished record.
    pub fn run(
        &self,
        calculator: &C,
        input: &I,
    ) -> S {
        let mut state = S::default();
        for step in self.steps {
            (step.apply)(calculator, input, &mut state);
            trace!(step = step.name, ?state, "applied adjustment step");
        }
        state
    }
}

/// A jurisdiction calculator: validate first, then compute.
///
/// `compute` is total over validated input and never fails; callers normally
/// go through [`Calculator::calculate`], which refuses to compute while any
/// validation error exists.
pub trait Calculator {
    type Input;
    type Output;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Collects every problem with `input`.
    fn validate(
        &self,
        input: &Self::Input,
    ) -> Vec<ValidationError>;

    /// Computes the result for an input that passed validation.
    fn compute(
        &self,
        input: &Self::Input,
    ) -> Self::Output;

    /// Step names of the underlying pipeline.
    fn steps(&self) -> Vec<&'static str>;

    fn calculate(
        &self,
        input: &Self::Input,
    ) -> Result<Self::Output, ValidationErrors> {
        let errors = self.validate(input);
        if !errors.is_empty() {
            debug!(
                calculator = self.name(),
                count = errors.len(),
                "input rejected; calculation skipped"
            );
            return Err(ValidationErrors(errors));
        }
        Ok(self.compute(input))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Debug, Default)]
    struct Tally {
        value: i64,
        visited: Vec<&'static str>,
    }

    struct Doubler;

    fn seed(
        _: &Doubler,
        input: &i64,
        state: &mut Tally,
    ) {
        state.value = *input;
        state.visited.push("seed");
    }

    fn double(
        _: &Doubler,
        _: &i64,
        state: &mut Tally,
    ) {
        state.value *= 2;
        state.visited.push("double");
    }

    const STEPS: &[Step<Doubler, i64, Tally>] =
        &[Step::new("seed", seed), Step::new("double", double)];

    impl Calculator for Doubler {
        type Input = i64;
        type Output = Tally;

        fn name(&self) -> &'static str {
            "doubler"
        }

        fn validate(
            &self,
            input: &i64,
        ) -> Vec<ValidationError> {
            if *input < 0 {
                vec![ValidationError::new("input", "must not be negative")]
            } else {
                Vec::new()
            }
        }

        fn compute(
            &self,
            input: &i64,
        ) -> Tally {
            Pipeline::new(STEPS).run(self, input)
        }

        fn steps(&self) -> Vec<&'static str> {
            Pipeline::new(STEPS).step_names()
        }
    }

    #[test]
    fn run_applies_steps_in_order() {
        let result = Doubler.calculate(&21).unwrap();

        assert_eq!(result.value, 42);
        assert_eq!(result.visited, vec!["seed", "double"]);
    }

    #[test]
    fn calculate_skips_compute_on_validation_error() {
        let result = Doubler.calculate(&-1);

        assert_eq!(
            result.unwrap_err().errors(),
            &[ValidationError::new("input", "must not be negative")]
        );
    }

    #[test]
    fn step_names_follow_declaration_order() {
        assert_eq!(Doubler.steps(), vec!["seed", "double"]);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let first = Doubler.calculate(&7).unwrap();
        let second = Doubler.calculate(&7).unwrap();

        assert_eq!(first.value, second.value);
        assert_eq!(first.visited, second.visited);
    }
}
