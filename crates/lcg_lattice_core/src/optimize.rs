//! Bounded linear programs over exact rationals
//!
//! A [`LinearProgram`] is an append-only conjunction of linear constraints
//! over free (sign-unrestricted) variables. Adding a constraint returns a new
//! model, so sibling queries in a search tree never observe each other's
//! temporary restrictions.
//!
//! Solving uses a dense two-phase simplex with Bland's pivoting rule. All
//! arithmetic is exact, so Bland's rule guarantees termination and the
//! optimum is attained at a vertex that satisfies every constraint exactly.

use crate::error::{expect_dim, LatticeError, Result};
use crate::rational::Rational;
use crate::vector::Vector;
use std::fmt;

/// Comparison between `coefficients · x` and `bound`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessEq,
    GreaterEq,
    Equal,
}

impl Relation {
    fn flipped(self) -> Self {
        match self {
            Relation::LessEq => Relation::GreaterEq,
            Relation::GreaterEq => Relation::LessEq,
            Relation::Equal => Relation::Equal,
        }
    }
}

/// One linear constraint `coefficients · x (≤ | ≥ | =) bound`
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub coefficients: Vector<Rational>,
    pub relation: Relation,
    pub bound: Rational,
}

impl Constraint {
    pub fn new(coefficients: Vector<Rational>, relation: Relation, bound: Rational) -> Self {
        Self {
            coefficients,
            relation,
            bound,
        }
    }

    pub fn less_eq(coefficients: Vector<Rational>, bound: Rational) -> Self {
        Self::new(coefficients, Relation::LessEq, bound)
    }

    pub fn greater_eq(coefficients: Vector<Rational>, bound: Rational) -> Self {
        Self::new(coefficients, Relation::GreaterEq, bound)
    }

    pub fn equal(coefficients: Vector<Rational>, bound: Rational) -> Self {
        Self::new(coefficients, Relation::Equal, bound)
    }

    pub fn dimension(&self) -> usize {
        self.coefficients.len()
    }

    /// Exact membership test for a point
    pub fn is_satisfied_by(&self, point: &Vector<Rational>) -> Result<bool> {
        let lhs = self.coefficients.dot(point)?;
        Ok(match self.relation {
            Relation::LessEq => lhs <= self.bound,
            Relation::GreaterEq => lhs >= self.bound,
            Relation::Equal => lhs == self.bound,
        })
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.relation {
            Relation::LessEq => "<=",
            Relation::GreaterEq => ">=",
            Relation::Equal => "==",
        };
        write!(f, "{} · x {} {}", self.coefficients, op, self.bound)
    }
}

/// Optimal value and a vertex attaining it
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub value: Rational,
    pub point: Vector<Rational>,
}

/// Conjunction of linear constraints in a fixed number of free variables
#[derive(Debug, Clone)]
pub struct LinearProgram {
    dimension: usize,
    constraints: Vec<Constraint>,
}

impl LinearProgram {
    /// Unconstrained model over `dimension` variables
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            constraints: Vec::new(),
        }
    }

    pub fn from_constraints(dimension: usize, constraints: Vec<Constraint>) -> Result<Self> {
        for c in &constraints {
            expect_dim(dimension, c.dimension())?;
        }
        Ok(Self {
            dimension,
            constraints,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Copy of this model with one more constraint
    pub fn with_constraint(&self, constraint: Constraint) -> Result<Self> {
        expect_dim(self.dimension, constraint.dimension())?;
        let mut next = self.clone();
        next.constraints.push(constraint);
        Ok(next)
    }

    /// Minimum of `objective · x`; `Infeasible` or `Unbounded` otherwise
    pub fn minimize(&self, objective: &Vector<Rational>) -> Result<Rational> {
        Ok(self.solve(objective, false)?.value)
    }

    /// Maximum of `objective · x`; `Infeasible` or `Unbounded` otherwise
    pub fn maximize(&self, objective: &Vector<Rational>) -> Result<Rational> {
        Ok(self.solve(objective, true)?.value)
    }

    /// Minimum and maximum of `objective · x`
    pub fn bounds(&self, objective: &Vector<Rational>) -> Result<(Rational, Rational)> {
        Ok((self.minimize(objective)?, self.maximize(objective)?))
    }

    /// Any point satisfying every constraint
    pub fn feasible_point(&self) -> Result<Vector<Rational>> {
        Ok(self.solve(&Vector::zeros(self.dimension), false)?.point)
    }

    /// Optimize `objective · x`, returning the value and an optimal vertex
    pub fn solve(&self, objective: &Vector<Rational>, maximize: bool) -> Result<Solution> {
        expect_dim(self.dimension, objective.len())?;
        let mut tableau = Tableau::build(self);

        tableau.phase_one()?;

        let n = self.dimension;
        let mut cost = vec![Rational::zero(); tableau.width];
        for (j, c) in objective.iter().enumerate() {
            let c = if maximize { -c } else { c.clone() };
            cost[n + j] = -&c;
            cost[j] = c;
        }
        tableau.run(&cost, tableau.artificial_start)?;

        let value = tableau.objective_value(&cost);
        let point = Vector::new(
            (0..n)
                .map(|j| &tableau.column_value(j) - &tableau.column_value(n + j))
                .collect(),
        );

        Ok(Solution {
            value: if maximize { -value } else { value },
            point,
        })
    }
}

/// Dense simplex tableau in equality form, all columns non-negative
///
/// Column layout: x⁺ (n), x⁻ (n), slack/surplus, artificial. The last entry
/// of every row is its right-hand side.
struct Tableau {
    rows: Vec<Vec<Rational>>,
    basis: Vec<usize>,
    width: usize,
    artificial_start: usize,
}

impl Tableau {
    fn build(lp: &LinearProgram) -> Self {
        let n = lp.dimension;

        // Non-negative right-hand sides
        let normalized: Vec<(Vector<Rational>, Relation, Rational)> = lp
            .constraints
            .iter()
            .map(|c| {
                if c.bound.is_negative() {
                    (
                        c.coefficients.scale(&Rational::from(-1)),
                        c.relation.flipped(),
                        -&c.bound,
                    )
                } else {
                    (c.coefficients.clone(), c.relation, c.bound.clone())
                }
            })
            .collect();

        let slack_count = normalized
            .iter()
            .filter(|(_, rel, _)| *rel != Relation::Equal)
            .count();
        let artificial_count = normalized
            .iter()
            .filter(|(_, rel, _)| *rel != Relation::LessEq)
            .count();
        let artificial_start = 2 * n + slack_count;
        let width = artificial_start + artificial_count;

        let mut rows = Vec::with_capacity(normalized.len());
        let mut basis = Vec::with_capacity(normalized.len());
        let mut next_slack = 2 * n;
        let mut next_artificial = artificial_start;

        for (coefficients, relation, bound) in normalized {
            let mut row = vec![Rational::zero(); width + 1];
            for (j, a) in coefficients.iter().enumerate() {
                row[j] = a.clone();
                row[n + j] = -a;
            }
            row[width] = bound;

            match relation {
                Relation::LessEq => {
                    row[next_slack] = Rational::one();
                    basis.push(next_slack);
                    next_slack += 1;
                }
                Relation::GreaterEq => {
                    row[next_slack] = Rational::from(-1);
                    next_slack += 1;
                    row[next_artificial] = Rational::one();
                    basis.push(next_artificial);
                    next_artificial += 1;
                }
                Relation::Equal => {
                    row[next_artificial] = Rational::one();
                    basis.push(next_artificial);
                    next_artificial += 1;
                }
            }
            rows.push(row);
        }

        Self {
            rows,
            basis,
            width,
            artificial_start,
        }
    }

    /// Find a feasible basis and drop the artificial columns from it
    fn phase_one(&mut self) -> Result<()> {
        if self.artificial_start == self.width {
            return Ok(());
        }

        let mut cost = vec![Rational::zero(); self.width];
        for c in cost.iter_mut().skip(self.artificial_start) {
            *c = Rational::one();
        }
        self.run(&cost, self.width)
            .map_err(|_| LatticeError::Infeasible)?;

        if self.objective_value(&cost).is_positive() {
            return Err(LatticeError::Infeasible);
        }

        // Pivot remaining (zero-valued) artificials out; rows with no
        // structural entry left are redundant
        let mut redundant = Vec::new();
        for i in 0..self.rows.len() {
            if self.basis[i] < self.artificial_start {
                continue;
            }
            match (0..self.artificial_start).find(|&j| !self.rows[i][j].is_zero()) {
                Some(j) => self.pivot(i, j),
                None => redundant.push(i),
            }
        }
        for i in redundant.into_iter().rev() {
            self.rows.remove(i);
            self.basis.remove(i);
        }

        Ok(())
    }

    /// Minimize `cost · z` using columns `< limit` as entering candidates
    fn run(&mut self, cost: &[Rational], limit: usize) -> Result<()> {
        loop {
            // Bland: lowest-index column with negative reduced cost
            let entering = (0..limit).find(|&j| self.reduced_cost(cost, j).is_negative());
            let Some(e) = entering else {
                return Ok(());
            };

            let mut leaving: Option<(usize, Rational)> = None;
            for (i, row) in self.rows.iter().enumerate() {
                if !row[e].is_positive() {
                    continue;
                }
                let ratio = row[self.width].checked_div(&row[e])?;
                let better = match &leaving {
                    None => true,
                    Some((best, best_ratio)) => {
                        ratio < *best_ratio
                            || (ratio == *best_ratio && self.basis[i] < self.basis[*best])
                    }
                };
                if better {
                    leaving = Some((i, ratio));
                }
            }

            match leaving {
                Some((r, _)) => self.pivot(r, e),
                None => return Err(LatticeError::Unbounded),
            }
        }
    }

    fn reduced_cost(&self, cost: &[Rational], j: usize) -> Rational {
        self.rows
            .iter()
            .zip(&self.basis)
            .filter(|&(row, &b)| !row[j].is_zero() && !cost[b].is_zero())
            .fold(cost[j].clone(), |acc, (row, &b)| acc - &cost[b] * &row[j])
    }

    fn pivot(&mut self, r: usize, e: usize) {
        let pivot = self.rows[r][e].clone();
        if let Ok(inv) = pivot.recip() {
            for x in self.rows[r].iter_mut() {
                if !x.is_zero() {
                    *x = &*x * &inv;
                }
            }
        }

        let pivot_row = self.rows[r].clone();
        for (i, row) in self.rows.iter_mut().enumerate() {
            if i == r || row[e].is_zero() {
                continue;
            }
            let factor = row[e].clone();
            for (x, p) in row.iter_mut().zip(&pivot_row) {
                if !p.is_zero() {
                    *x = &*x - &(&factor * p);
                }
            }
        }
        self.basis[r] = e;
    }

    fn objective_value(&self, cost: &[Rational]) -> Rational {
        self.rows
            .iter()
            .zip(&self.basis)
            .fold(Rational::zero(), |acc, (row, &b)| acc + &cost[b] * &row[self.width])
    }

    fn column_value(&self, j: usize) -> Rational {
        self.basis
            .iter()
            .position(|&b| b == j)
            .map(|i| self.rows[i][self.width].clone())
            .unwrap_or_default()
    }
}
