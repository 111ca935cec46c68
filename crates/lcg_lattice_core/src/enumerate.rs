//! LP-bounded branch-and-bound enumeration of lattice points in a region
//!
//! Given basis rows b_j, an origin o and linear constraints over the ambient
//! space, [`Enumeration`] lazily yields every point `o + Σ c_j b_j` (c_j ∈ Z)
//! that satisfies all constraints, exactly once.
//!
//! # Search
//!
//! Constraints are rewritten into coefficient space (`g·p ≤ β` becomes
//! `Σ c_j (g·b_j) ≤ β - g·o`). At each search node every still-free
//! coefficient gets an integer interval from two LP solves; the coefficient
//! with the narrowest interval is branched on next, with values handed out
//! from the midpoint outward. Fixing a value adds one equality to a copy of
//! the node's model.
//!
//! The traversal state is an explicit deque of pending branches (oldest,
//! shallowest first). [`Enumeration::try_split`] hands part of that deque,
//! or half of a branch's remaining values, to a new independent sequence.
//!
//! An optional node budget stops the search early; [`Enumeration::is_truncated`]
//! reports whether it did. An arithmetic error inside the search ends the
//! sequence and is kept for [`Enumeration::take_error`].

use crate::error::{expect_dim, LatticeError, Result};
use crate::matrix::Matrix;
use crate::optimize::{Constraint, LinearProgram};
use crate::rational::Rational;
use crate::vector::Vector;
use num_bigint::BigInt;
use num_integer::Integer;
use rayon::iter::plumbing::{bridge_unindexed, Folder, UnindexedConsumer, UnindexedProducer};
use rayon::iter::ParallelIterator;
use std::collections::VecDeque;
use std::sync::Arc;

/// A lattice point together with its integer coordinates in the basis
#[derive(Debug, Clone, PartialEq)]
pub struct LatticePoint {
    pub coefficients: Vec<BigInt>,
    pub point: Vector<Rational>,
}

/// Read-only problem data shared by every split of one enumeration
#[derive(Debug)]
struct Region {
    basis: Matrix<Rational>,
    origin: Vector<Rational>,
    constraints: Vec<Constraint>,
}

impl Region {
    fn point(&self, coefficients: Vec<BigInt>) -> Result<LatticePoint> {
        let coeffs: Vec<Rational> = coefficients.iter().cloned().map(Rational::from).collect();
        let offset = if self.basis.rows() == 0 {
            Vector::zeros(self.origin.len())
        } else {
            self.basis.combine_rows(&coeffs)?
        };
        Ok(LatticePoint {
            coefficients,
            point: self.origin.add(&offset)?,
        })
    }

    fn contains(&self, p: &Vector<Rational>) -> Result<bool> {
        for c in &self.constraints {
            if !c.is_satisfied_by(p)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Partially fixed coefficient vector and the model restricted to it
#[derive(Debug, Clone)]
struct SearchNode {
    fixed: Vec<Option<BigInt>>,
    model: LinearProgram,
}

impl SearchNode {
    fn free_dims(&self) -> impl Iterator<Item = usize> + '_ {
        self.fixed
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_none())
            .map(|(j, _)| j)
    }

    fn is_last_free(&self) -> bool {
        self.free_dims().nth(1).is_none()
    }

    fn fixed_coefficients(&self) -> Vec<BigInt> {
        self.fixed.iter().map(|v| v.clone().unwrap_or_default()).collect()
    }

    fn fix(&self, dim: usize, value: BigInt) -> Result<Self> {
        let k = self.fixed.len();
        let model = self.model.with_constraint(Constraint::equal(
            Vector::unit(k, dim),
            Rational::from(value.clone()),
        ))?;
        let mut fixed = self.fixed.clone();
        fixed[dim] = Some(value);
        Ok(Self { fixed, model })
    }
}

/// Inclusive integer range, never empty
#[derive(Debug, Clone)]
struct Interval {
    lo: BigInt,
    hi: BigInt,
}

impl Interval {
    fn midpoint(&self) -> BigInt {
        (&self.lo + &self.hi).div_floor(&BigInt::from(2))
    }
}

/// Values still to try for one coefficient at one node
///
/// Values at or above the midpoint come out ascending, values below it
/// descending, alternating between the two sides.
#[derive(Debug, Clone)]
struct Branch {
    node: SearchNode,
    dim: usize,
    below: Option<Interval>,
    above: Option<Interval>,
    take_below: bool,
}

impl Branch {
    fn new(node: SearchNode, dim: usize, lo: BigInt, hi: BigInt) -> Self {
        let centre = Interval { lo: lo.clone(), hi: hi.clone() }.midpoint();
        let below = (lo < centre).then(|| Interval {
            lo,
            hi: &centre - 1,
        });
        Self {
            node,
            dim,
            below,
            above: Some(Interval { lo: centre, hi }),
            take_below: false,
        }
    }

    fn is_exhausted(&self) -> bool {
        self.below.is_none() && self.above.is_none()
    }

    fn remaining_is_single(&self) -> bool {
        match (&self.below, &self.above) {
            (Some(iv), None) | (None, Some(iv)) => iv.lo == iv.hi,
            _ => false,
        }
    }

    fn next_value(&mut self) -> Option<BigInt> {
        for _ in 0..2 {
            if self.take_below {
                self.take_below = false;
                if let Some(iv) = self.below.as_mut() {
                    let v = iv.hi.clone();
                    if iv.lo == iv.hi {
                        self.below = None;
                    } else {
                        iv.hi -= 1;
                    }
                    return Some(v);
                }
            } else {
                self.take_below = true;
                if let Some(iv) = self.above.as_mut() {
                    let v = iv.lo.clone();
                    if iv.lo == iv.hi {
                        self.above = None;
                    } else {
                        iv.lo += 1;
                    }
                    return Some(v);
                }
            }
        }
        None
    }

    /// Hand a disjoint part of the remaining values to a new branch
    fn split(&mut self) -> Option<Branch> {
        if self.below.is_some() && self.above.is_some() {
            self.take_below = false;
            return Some(Branch {
                node: self.node.clone(),
                dim: self.dim,
                below: self.below.take(),
                above: None,
                take_below: true,
            });
        }

        if let Some(iv) = self.above.as_mut() {
            if iv.lo == iv.hi {
                return None;
            }
            let mid = iv.midpoint();
            let upper = Interval {
                lo: &mid + 1,
                hi: iv.hi.clone(),
            };
            iv.hi = mid;
            return Some(Branch {
                node: self.node.clone(),
                dim: self.dim,
                below: None,
                above: Some(upper),
                take_below: false,
            });
        }

        if let Some(iv) = self.below.as_mut() {
            if iv.lo == iv.hi {
                return None;
            }
            let mid = iv.midpoint();
            let lower = Interval {
                lo: iv.lo.clone(),
                hi: mid.clone(),
            };
            iv.lo = mid + 1;
            return Some(Branch {
                node: self.node.clone(),
                dim: self.dim,
                below: Some(lower),
                above: None,
                take_below: true,
            });
        }

        None
    }
}

#[derive(Debug, Clone)]
enum Frame {
    Branch(Branch),
    Point(LatticePoint),
}

/// Lazy, splittable sequence of lattice points inside a constraint region
#[derive(Debug)]
pub struct Enumeration {
    region: Arc<Region>,
    frontier: VecDeque<Frame>,
    nodes_expanded: u64,
    node_limit: Option<u64>,
    truncated: bool,
    error: Option<LatticeError>,
}

impl Enumeration {
    /// Start enumerating `origin + L(basis)` inside `constraints`
    ///
    /// Fails with `InfeasibleRegion` when no real point satisfies the
    /// constraints and with `UnboundedRegion` when some coefficient is
    /// unbounded. A feasible region without lattice points yields an empty
    /// sequence.
    pub fn new(
        basis: &Matrix<Rational>,
        origin: &Vector<Rational>,
        constraints: &[Constraint],
    ) -> Result<Self> {
        let m = basis.cols().max(origin.len());
        expect_dim(m, origin.len())?;
        if basis.rows() > 0 {
            expect_dim(m, basis.cols())?;
        }
        for c in constraints {
            expect_dim(m, c.dimension())?;
        }

        let k = basis.rows();
        let mut lifted = Vec::with_capacity(constraints.len());
        for c in constraints {
            let coefficients = Vector::new(
                basis
                    .iter_rows()
                    .map(|row| c.coefficients.dot(row))
                    .collect::<Result<Vec<_>>>()?,
            );
            let bound = &c.bound - &c.coefficients.dot(origin)?;
            lifted.push(Constraint::new(coefficients, c.relation, bound));
        }
        let model = LinearProgram::from_constraints(k, lifted)?;

        let region = Arc::new(Region {
            basis: basis.clone(),
            origin: origin.clone(),
            constraints: constraints.to_vec(),
        });
        let mut enumeration = Self {
            region,
            frontier: VecDeque::new(),
            nodes_expanded: 0,
            node_limit: None,
            truncated: false,
            error: None,
        };

        let root = SearchNode {
            fixed: vec![None; k],
            model,
        };

        if k == 0 {
            let p = enumeration.region.point(Vec::new())?;
            if !enumeration.region.contains(&p.point)? {
                return Err(LatticeError::InfeasibleRegion);
            }
            enumeration.frontier.push_back(Frame::Point(p));
            return Ok(enumeration);
        }

        match enumeration.expand(root) {
            Ok(Some(branch)) => enumeration.frontier.push_back(Frame::Branch(branch)),
            Ok(None) => log::debug!("Region is feasible but holds no lattice point"),
            Err(LatticeError::Infeasible) => return Err(LatticeError::InfeasibleRegion),
            Err(e) => return Err(e),
        }

        Ok(enumeration)
    }

    /// Number of search nodes whose bounds were computed by this sequence
    pub fn nodes_expanded(&self) -> u64 {
        self.nodes_expanded
    }

    /// Stop once `limit` search nodes have been expanded
    ///
    /// Pending branches are abandoned. Parts split off later get their own
    /// budget.
    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }

    /// Whether the node budget cut the search short
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Error that ended the sequence early, if any
    pub fn take_error(&mut self) -> Option<LatticeError> {
        self.error.take()
    }

    /// Split off an independent sequence covering a disjoint part of the
    /// remaining search space
    pub fn try_split(&mut self) -> Option<Self> {
        loop {
            if self.frontier.len() >= 2 {
                let frame = self.frontier.pop_front()?;
                return Some(self.fork(frame));
            }

            let single_value = match self.frontier.front_mut()? {
                Frame::Point(_) => return None,
                Frame::Branch(branch) => {
                    if let Some(other) = branch.split() {
                        return Some(self.fork(Frame::Branch(other)));
                    }
                    branch.remaining_is_single()
                }
            };

            // One value left at the top: descend into it without emitting
            if !single_value || !self.descend() {
                return None;
            }
        }
    }

    /// Consume the sequence in parallel on the rayon pool
    pub fn par_points(self) -> ParEnumeration {
        ParEnumeration(self)
    }

    fn fork(&self, frame: Frame) -> Self {
        Self {
            region: Arc::clone(&self.region),
            frontier: VecDeque::from(vec![frame]),
            nodes_expanded: 0,
            node_limit: self.node_limit,
            truncated: false,
            error: None,
        }
    }

    fn budget_spent(&self) -> bool {
        self.node_limit
            .is_some_and(|limit| self.nodes_expanded >= limit)
    }

    /// Abandon the search after an error
    fn fail(&mut self, e: LatticeError) {
        log::error!("Enumeration stopped: {}", e);
        self.frontier.clear();
        self.error = Some(e);
    }

    /// Replace a single-valued top branch by its child
    fn descend(&mut self) -> bool {
        let Some(Frame::Branch(mut branch)) = self.frontier.pop_front() else {
            return false;
        };
        let Some(value) = branch.next_value() else {
            return false;
        };
        match self.child(&branch, value) {
            Ok(Some(frame)) => self.frontier.push_back(frame),
            Ok(None) => {}
            Err(e) => {
                self.fail(e);
                return false;
            }
        }
        !self.frontier.is_empty()
    }

    /// Compute integer bounds for every free coefficient and branch on the
    /// narrowest; `None` when some interval holds no integer
    fn expand(&mut self, node: SearchNode) -> Result<Option<Branch>> {
        self.nodes_expanded += 1;
        let k = node.fixed.len();
        let mut best: Option<(usize, BigInt, BigInt)> = None;

        for j in node.free_dims() {
            let axis = Vector::unit(k, j);
            let (min, max) = match node.model.bounds(&axis) {
                Ok(b) => b,
                Err(LatticeError::Unbounded) => return Err(LatticeError::UnboundedRegion(j)),
                Err(e) => return Err(e),
            };
            let (lo, hi) = (min.ceil(), max.floor());
            if lo > hi {
                return Ok(None);
            }
            let narrower = match &best {
                None => true,
                Some((_, blo, bhi)) => &hi - &lo < bhi - blo,
            };
            if narrower {
                best = Some((j, lo, hi));
            }
        }

        Ok(best.map(|(dim, lo, hi)| Branch::new(node, dim, lo, hi)))
    }

    /// Frame for fixing `branch.dim = value`, or `None` when pruned
    fn child(&mut self, branch: &Branch, value: BigInt) -> Result<Option<Frame>> {
        if branch.node.is_last_free() {
            let mut coefficients = branch.node.fixed_coefficients();
            coefficients[branch.dim] = value;
            let p = self.region.point(coefficients)?;
            if !self.region.contains(&p.point)? {
                log::debug!("Dropping point outside region: {}", p.point);
                return Ok(None);
            }
            return Ok(Some(Frame::Point(p)));
        }

        let node = branch.node.fix(branch.dim, value)?;
        match self.expand(node) {
            Ok(next) => Ok(next.map(Frame::Branch)),
            Err(LatticeError::Infeasible) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Iterator for Enumeration {
    type Item = LatticePoint;

    fn next(&mut self) -> Option<LatticePoint> {
        loop {
            if self.budget_spent() && matches!(self.frontier.back(), Some(Frame::Branch(_))) {
                log::debug!("Node budget spent after {} nodes", self.nodes_expanded);
                self.truncated = true;
                self.frontier.clear();
                return None;
            }
            match self.frontier.pop_back()? {
                Frame::Point(p) => return Some(p),
                Frame::Branch(mut branch) => {
                    let Some(value) = branch.next_value() else {
                        continue;
                    };
                    let child = self.child(&branch, value);
                    if !branch.is_exhausted() {
                        self.frontier.push_back(Frame::Branch(branch));
                    }
                    match child {
                        Ok(Some(Frame::Point(p))) => return Some(p),
                        Ok(Some(frame)) => self.frontier.push_back(frame),
                        Ok(None) => {}
                        Err(e) => {
                            self.fail(e);
                            return None;
                        }
                    }
                }
            }
        }
    }
}

impl UnindexedProducer for Enumeration {
    type Item = LatticePoint;

    fn split(mut self) -> (Self, Option<Self>) {
        let other = self.try_split();
        (self, other)
    }

    fn fold_with<F>(self, folder: F) -> F
    where
        F: Folder<Self::Item>,
    {
        folder.consume_iter(self)
    }
}

/// Parallel view of an [`Enumeration`], split on demand by rayon
pub struct ParEnumeration(Enumeration);

impl ParallelIterator for ParEnumeration {
    type Item = LatticePoint;

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>,
    {
        bridge_unindexed(self.0, consumer)
    }
}

/// Enumerate every point of `origin + L(basis)` satisfying `constraints`
pub fn enumerate(
    basis: &Matrix<Rational>,
    origin: &Vector<Rational>,
    constraints: &[Constraint],
) -> Result<Enumeration> {
    Enumeration::new(basis, origin, constraints)
}

/// Box constraints `lo_i ≤ x_i ≤ hi_i`
pub fn box_constraints(lo: &[Rational], hi: &[Rational]) -> Result<Vec<Constraint>> {
    expect_dim(lo.len(), hi.len())?;
    let m = lo.len();
    let mut out = Vec::with_capacity(2 * m);
    for i in 0..m {
        out.push(Constraint::greater_eq(Vector::unit(m, i), lo[i].clone()));
        out.push(Constraint::less_eq(Vector::unit(m, i), hi[i].clone()));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn r(n: i64) -> Rational {
        Rational::from(n)
    }

    fn cube(m: usize, lo: i64, hi: i64) -> Vec<Constraint> {
        box_constraints(&vec![r(lo); m], &vec![r(hi); m]).unwrap()
    }

    fn as_ints(p: &LatticePoint) -> Vec<i64> {
        p.point
            .iter()
            .map(|x| i64::try_from(x.to_integer().unwrap()).unwrap())
            .collect()
    }

    fn sorted(points: impl Iterator<Item = LatticePoint>) -> Vec<Vec<i64>> {
        let mut all: Vec<Vec<i64>> = points.map(|p| as_ints(&p)).collect();
        all.sort();
        all
    }

    /// Points of origin + L(basis) in [lo, hi]^m by exhaustive scan
    fn brute_force(basis: &Matrix<Rational>, origin: &[i64], lo: i64, hi: i64) -> Vec<Vec<i64>> {
        let inverse = basis.inverse().unwrap();
        let m = origin.len();
        let mut out = Vec::new();
        let mut p = vec![lo; m];
        loop {
            let diff: Vec<i64> = p.iter().zip(origin).map(|(a, b)| a - b).collect();
            let c = inverse.combine_rows(&Vector::<Rational>::from_i64(&diff).into_inner());
            if c.unwrap().iter().all(|x| x.is_integer()) {
                out.push(p.clone());
            }
            let mut i = 0;
            loop {
                if i == m {
                    out.sort();
                    return out;
                }
                if p[i] < hi {
                    p[i] += 1;
                    break;
                }
                p[i] = lo;
                i += 1;
            }
        }
    }

    #[test]
    fn test_identity_box() {
        let basis = Matrix::identity(2);
        let points = enumerate(&basis, &Vector::zeros(2), &cube(2, -1, 1)).unwrap();
        let all = sorted(points);

        assert_eq!(all.len(), 9);
        assert_eq!(all.iter().collect::<HashSet<_>>().len(), 9);
    }

    #[test]
    fn test_midpoint_outward_order() {
        let basis = Matrix::identity(1);
        let points = enumerate(&basis, &Vector::zeros(1), &cube(1, 0, 4)).unwrap();
        let order: Vec<i64> = points.map(|p| as_ints(&p)[0]).collect();

        assert_eq!(order, vec![2, 1, 3, 0, 4]);
    }

    #[test]
    fn test_skewed_basis_with_origin() {
        // x + y even, shifted by (1, 0): x + y odd
        let basis = Matrix::from_i64_rows(&[vec![1, 1], vec![1, -1]]).unwrap();
        let origin = Vector::from_i64(&[1, 0]);
        let points = enumerate(&basis, &origin, &cube(2, 0, 3)).unwrap();
        let all = sorted(points);

        assert_eq!(all, brute_force(&basis, &[1, 0], 0, 3));
        assert!(all.iter().all(|p| (p[0] + p[1]) % 2 == 1));
        assert_eq!(all.len(), 8);
    }

    #[test]
    fn test_coefficients_reproduce_point() {
        let basis = Matrix::from_i64_rows(&[vec![3, 1], vec![1, 2]]).unwrap();
        for p in enumerate(&basis, &Vector::zeros(2), &cube(2, -5, 5)).unwrap() {
            let coeffs: Vec<Rational> =
                p.coefficients.iter().cloned().map(Rational::from).collect();
            assert_eq!(basis.combine_rows(&coeffs).unwrap(), p.point);
        }
    }

    #[test]
    fn test_infeasible_region() {
        let basis = Matrix::identity(2);
        let mut constraints = cube(2, 0, 5);
        constraints.push(Constraint::greater_eq(Vector::from_i64(&[1, 1]), r(20)));

        let err = enumerate(&basis, &Vector::zeros(2), &constraints).unwrap_err();
        assert_eq!(err, LatticeError::InfeasibleRegion);
    }

    #[test]
    fn test_unbounded_region() {
        let basis = Matrix::identity(2);
        let constraints = vec![Constraint::less_eq(Vector::from_i64(&[1, 0]), r(3))];

        let err = enumerate(&basis, &Vector::zeros(2), &constraints).unwrap_err();
        assert!(matches!(err, LatticeError::UnboundedRegion(_)));
    }

    #[test]
    fn test_feasible_region_without_lattice_points() {
        let basis = Matrix::from_i64_rows(&[vec![2]]).unwrap();
        let constraints = cube(1, 1, 1);
        let mut points = enumerate(&basis, &Vector::zeros(1), &constraints).unwrap();

        assert!(points.next().is_none());
    }

    #[test]
    fn test_split_matches_unsplit() {
        let basis = Matrix::from_i64_rows(&[vec![2, 1, 0], vec![0, 3, 1], vec![1, 0, 2]]).unwrap();
        let constraints = cube(3, -6, 6);
        let origin = Vector::zeros(3);

        let whole = sorted(enumerate(&basis, &origin, &constraints).unwrap());

        // Split repeatedly, interleaving consumption with splitting
        let mut first = enumerate(&basis, &origin, &constraints).unwrap();
        let mut parts = Vec::new();
        let mut collected = Vec::new();
        collected.extend(first.next());
        while let Some(other) = first.try_split() {
            parts.push(other);
            collected.extend(first.next());
        }
        parts.push(first);
        while let Some(mut part) = parts.pop() {
            if let Some(extra) = part.try_split() {
                parts.push(extra);
            }
            collected.extend(part);
        }

        assert_eq!(sorted(collected.into_iter()), whole);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let basis = Matrix::from_i64_rows(&[vec![1, 2], vec![3, -1]]).unwrap();
        let constraints = cube(2, -20, 20);
        let origin = Vector::from_i64(&[1, 1]);

        let serial = sorted(enumerate(&basis, &origin, &constraints).unwrap());
        let parallel: Vec<LatticePoint> = enumerate(&basis, &origin, &constraints)
            .unwrap()
            .par_points()
            .collect();

        assert_eq!(sorted(parallel.into_iter()), serial);
        assert_eq!(serial, brute_force(&basis, &[1, 1], -20, 20));
    }

    #[test]
    fn test_zero_dimensional_basis() {
        let basis: Matrix<Rational> = Matrix::zeros(0, 2);
        let origin = Vector::from_i64(&[1, 1]);

        let points: Vec<_> = enumerate(&basis, &origin, &cube(2, 0, 2)).unwrap().collect();
        assert_eq!(points.len(), 1);
        assert_eq!(
            enumerate(&basis, &origin, &cube(2, 2, 3)).unwrap_err(),
            LatticeError::InfeasibleRegion
        );
    }

    #[test]
    fn test_node_limit_truncates() {
        let basis = Matrix::identity(3);
        let points = enumerate(&basis, &Vector::zeros(3), &cube(3, -5, 5)).unwrap();
        let mut limited = points.with_node_limit(3);

        let found = limited.by_ref().count();

        assert!(limited.is_truncated());
        assert_eq!(limited.nodes_expanded(), 3);
        assert!(found < 11 * 11 * 11);
        assert!(limited.take_error().is_none());
    }

    #[test]
    fn test_unlimited_search_is_not_truncated() {
        let basis = Matrix::identity(2);
        let mut points = enumerate(&basis, &Vector::zeros(2), &cube(2, -2, 2)).unwrap();

        assert_eq!(points.by_ref().count(), 25);
        assert!(!points.is_truncated());
    }

    #[test]
    fn test_search_error_ends_sequence() {
        let basis = Matrix::identity(1);
        let mut points = enumerate(&basis, &Vector::zeros(1), &cube(1, 0, 4)).unwrap();
        // Constraints over the wrong ambient dimension fail the region check
        points.region = Arc::new(Region {
            basis: basis.clone(),
            origin: Vector::zeros(1),
            constraints: cube(2, 0, 4),
        });

        assert!(points.next().is_none());
        assert!(matches!(
            points.take_error(),
            Some(LatticeError::DimensionMismatch { .. })
        ));
        assert!(points.next().is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_enumeration_is_exact(
            entries in proptest::collection::vec(-4i64..5, 4),
            origin in proptest::collection::vec(-3i64..4, 2),
        ) {
            let basis: Matrix<Rational> =
                Matrix::from_i64_rows(&[entries[0..2].to_vec(), entries[2..4].to_vec()]).unwrap();
            prop_assume!(!basis.determinant().unwrap().is_zero());

            let constraints = cube(2, -6, 6);
            let origin_vec = Vector::from_i64(&origin);
            let found = sorted(enumerate(&basis, &origin_vec, &constraints).unwrap());
            prop_assert_eq!(found, brute_force(&basis, &origin, -6, 6));
        }

        #[test]
        fn prop_split_schedule_preserves_points(
            entries in proptest::collection::vec(-5i64..6, 9),
            schedule in proptest::collection::vec((any::<bool>(), 0usize..8), 0..12),
        ) {
            let rows: Vec<Vec<i64>> = entries.chunks(3).map(<[i64]>::to_vec).collect();
            let basis: Matrix<Rational> = Matrix::from_i64_rows(&rows).unwrap();
            prop_assume!(!basis.determinant().unwrap().is_zero());

            let constraints = cube(3, -5, 5);
            let origin = Vector::zeros(3);
            let whole = sorted(enumerate(&basis, &origin, &constraints).unwrap());

            let mut parts = vec![enumerate(&basis, &origin, &constraints).unwrap()];
            let mut collected = Vec::new();
            for (split, pick) in schedule {
                let i = pick % parts.len();
                if split {
                    if let Some(other) = parts[i].try_split() {
                        parts.push(other);
                    }
                } else {
                    collected.extend(parts[i].next());
                }
            }
            for part in parts {
                collected.extend(part);
            }

            prop_assert_eq!(sorted(collected.into_iter()), whole);
        }
    }
}
