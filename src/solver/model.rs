// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Model building blocks and their translation to a mixed integer program.

use good_lp::constraint::{self, Constraint};
use good_lp::solvers::microlp::microlp;
use good_lp::{
    variable, Expression, ProblemVariables, ResolutionError, Solution as _, SolverModel, Variable,
};
use tracing::debug;

use crate::error::{CantusError, Result};

/// Handle to a decision variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(usize);

/// Handle to an absolute-deviation term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviationId(usize);

/// Integer decision variable with an explicit finite domain
#[derive(Debug, Clone)]
struct IntVar {
    name: String,
    /// Sorted ascending, no duplicates
    domain: Vec<i64>,
}

/// `diff = x_to - x_from - target`, `abs = |diff|`
#[derive(Debug, Clone, Copy)]
struct Deviation {
    from: usize,
    to: usize,
    target: i64,
}

impl Deviation {
    fn diff(&self, from: i64, to: i64) -> i64 {
        to - from - self.target
    }

    /// Smallest and largest `diff` over both (non-empty, sorted) domains
    fn range(&self, from: &[i64], to: &[i64]) -> (i64, i64) {
        let first = |d: &[i64]| d.first().copied().unwrap_or(0);
        let last = |d: &[i64]| d.last().copied().unwrap_or(0);
        (
            self.diff(last(from), first(to)),
            self.diff(first(from), last(to)),
        )
    }
}

/// A minimization model over absolute deviations
#[derive(Debug, Clone, Default)]
pub struct Model {
    vars: Vec<IntVar>,
    deviations: Vec<Deviation>,
}

impl Model {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a decision variable ranging over the given values
    pub fn new_int_var<I: IntoIterator<Item = i64>>(&mut self, domain: I, name: &str) -> VarId {
        let mut domain: Vec<i64> = domain.into_iter().collect();
        domain.sort_unstable();
        domain.dedup();
        self.vars.push(IntVar {
            name: name.to_string(),
            domain,
        });
        VarId(self.vars.len() - 1)
    }

    /// Add the term `|to - from - target|` to the objective
    pub fn add_abs_deviation(&mut self, from: VarId, to: VarId, target: i64) -> DeviationId {
        self.deviations.push(Deviation {
            from: from.0,
            to: to.0,
            target,
        });
        DeviationId(self.deviations.len() - 1)
    }

    /// Number of decision variables
    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    /// Number of deviation terms
    pub fn num_deviations(&self) -> usize {
        self.deviations.len()
    }

    /// Domain of a variable, ascending
    pub fn domain(&self, var: VarId) -> &[i64] {
        &self.vars[var.0].domain
    }

    /// Name given to a variable
    pub fn name(&self, var: VarId) -> &str {
        &self.vars[var.0].name
    }

    /// Solve the model to optimality.
    ///
    /// Every variable becomes a one-hot block of binaries over its domain.
    /// Each term gets an integer `diff`, an `abs` bounded below by `diff` and
    /// `-diff`, and pair weights whose marginals match both one-hot blocks.
    /// With the pair weights the relaxation of a chain-shaped model is
    /// already integral.
    pub fn solve(&self) -> Result<Solution> {
        if let Some(var) = self.vars.iter().find(|v| v.domain.is_empty()) {
            debug!(var = %var.name, "variable has an empty domain");
            return Err(CantusError::ModelInfeasible);
        }
        if self.vars.is_empty() {
            return Ok(Solution {
                values: Vec::new(),
                diffs: Vec::new(),
                objective: 0,
            });
        }

        let mut problem = ProblemVariables::new();
        let picks: Vec<Vec<Variable>> = self
            .vars
            .iter()
            .map(|var| {
                var.domain
                    .iter()
                    .map(|value| {
                        problem.add(variable().binary().name(format!("{}={}", var.name, value)))
                    })
                    .collect()
            })
            .collect();

        let mut constraints: Vec<Constraint> = picks
            .iter()
            .map(|block| constraint::eq(total(block), 1.0))
            .collect();
        let mut abs_terms = Vec::with_capacity(self.deviations.len());

        for dev in &self.deviations {
            let (from, to) = (&self.vars[dev.from], &self.vars[dev.to]);
            let (lowest, highest) = dev.range(&from.domain, &to.domain);
            let diff = problem.add(
                variable()
                    .integer()
                    .min(lowest as f64)
                    .max(highest as f64),
            );
            let abs = problem.add(variable().min(0.0));
            constraints.push(constraint::eq(
                diff,
                self.value_of(dev.to, &picks[dev.to]) - self.value_of(dev.from, &picks[dev.from])
                    - dev.target as f64,
            ));
            constraints.push(constraint::geq(abs, diff));
            constraints.push(constraint::geq(abs, -1.0 * diff));

            let pairs: Vec<Vec<Variable>> = from
                .domain
                .iter()
                .map(|_| {
                    to.domain
                        .iter()
                        .map(|_| problem.add(variable().min(0.0).max(1.0)))
                        .collect()
                })
                .collect();
            for (row, &pick) in pairs.iter().zip(&picks[dev.from]) {
                constraints.push(constraint::eq(total(row), pick));
            }
            for (column, &pick) in picks[dev.to].iter().enumerate() {
                constraints.push(constraint::eq(total(pairs.iter().map(|row| &row[column])), pick));
            }
            let pair_cost: Expression = pairs
                .iter()
                .zip(&from.domain)
                .flat_map(|(row, &a)| {
                    row.iter()
                        .zip(&to.domain)
                        .map(move |(&weight, &b)| dev.diff(a, b).abs() as f64 * weight)
                })
                .sum();
            constraints.push(constraint::geq(abs, pair_cost));
            abs_terms.push(abs);
        }

        let objective = total(&abs_terms);
        let lp = constraints
            .into_iter()
            .fold(problem.minimise(objective).using(microlp), |lp, c| lp.with(c));
        let solved = match lp.solve() {
            Ok(solved) => solved,
            Err(ResolutionError::Infeasible) => return Err(CantusError::ModelInfeasible),
            Err(e) => return Err(CantusError::SolverFailure(e.to_string())),
        };

        // binaries come back as floats within solver tolerance
        let values = self
            .vars
            .iter()
            .zip(&picks)
            .map(|(var, block)| {
                block
                    .iter()
                    .zip(&var.domain)
                    .max_by(|(a, _), (b, _)| solved.value(**a).total_cmp(&solved.value(**b)))
                    .map(|(_, &value)| value)
                    .ok_or(CantusError::ModelInfeasible)
            })
            .collect::<Result<Vec<i64>>>()?;

        let diffs: Vec<i64> = self
            .deviations
            .iter()
            .map(|dev| dev.diff(values[dev.from], values[dev.to]))
            .collect();
        let objective = diffs.iter().map(|d| d.abs()).sum();
        debug!(
            vars = self.vars.len(),
            deviations = self.deviations.len(),
            objective,
            "solved model"
        );
        Ok(Solution {
            values,
            diffs,
            objective,
        })
    }

    fn value_of(&self, var: usize, block: &[Variable]) -> Expression {
        block
            .iter()
            .zip(&self.vars[var].domain)
            .map(|(&pick, &value)| value as f64 * pick)
            .sum()
    }
}

fn total<'a, I: IntoIterator<Item = &'a Variable>>(vars: I) -> Expression {
    vars.into_iter().map(|&v| Expression::from(v)).sum()
}

/// Optimal assignment returned by the solver
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    values: Vec<i64>,
    diffs: Vec<i64>,
    objective: i64,
}

impl Solution {
    /// Value assigned to a variable
    pub fn value(&self, var: VarId) -> i64 {
        self.values[var.0]
    }

    /// All values in variable order
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Signed deviation `to - from - target`
    pub fn deviation(&self, id: DeviationId) -> i64 {
        self.diffs[id.0]
    }

    /// Absolute deviation of a term
    pub fn abs_deviation(&self, id: DeviationId) -> i64 {
        self.diffs[id.0].abs()
    }

    /// Sum of absolute deviations
    pub fn objective(&self) -> i64 {
        self.objective
    }
}
