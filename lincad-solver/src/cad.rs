//! Sign-invariant partition construction: projection cascade and lifting.
//!
//! The decomposition proceeds in two phases. Projection repeatedly applies
//! [`Context::project_away`] so that level `k` holds a set of expressions
//! over variables `0..=k` whose sign pattern controls the root structure of
//! the level above. Lifting then rebuilds sample points bottom-up: at each
//! level it substitutes the partial test point, extracts the roots of the
//! now-univariate expressions, and samples one point per root plus one point
//! per open interval between, below, and above the roots. Each leaf of the
//! resulting cell tree carries a full assignment and represents one cell of
//! the decomposition.
//!
//! Cells live in an arena owned by the partition and are referenced by
//! [`CellId`]; the lift walks an explicit work stack, so recursion depth does
//! not grow with the number of variables.

use lincad_math::{LincadError, Result, Var};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::context::{Context, ExprId};

/// Handle to a cell in a partition's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId(u32);

impl CellId {
    /// The root cell of every partition.
    pub const ROOT: CellId = CellId(0);

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node of the cell tree.
///
/// A cell at depth `d` assigns variables `0..d`; a cell is a leaf iff it has
/// no children, and a leaf assigns every variable in the context.
#[derive(Debug, Clone)]
pub struct Cell {
    point: FxHashMap<Var, BigRational>,
    children: Vec<CellId>,
}

impl Cell {
    /// The (possibly partial) test point carried by this cell.
    #[inline]
    pub fn test_point(&self) -> &FxHashMap<Var, BigRational> {
        &self.point
    }

    /// Child cells in generation order.
    #[inline]
    pub fn children(&self) -> &[CellId] {
        &self.children
    }

    /// True iff this cell has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Counters collected while building a partition.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartitionStats {
    /// Total cells created, including the root.
    pub cells: usize,
    /// Leaf cells (one per decomposition cell).
    pub leaves: usize,
    /// Distinct roots found, summed over all lift steps.
    pub roots: usize,
    /// Sample points generated, summed over all lift steps.
    pub samples: usize,
}

/// A sign-invariant partition of assignment space: the cell tree produced by
/// lifting, read-only after construction.
#[derive(Debug, Clone)]
pub struct SignInvariantPartition {
    cells: Vec<Cell>,
    stats: PartitionStats,
}

impl SignInvariantPartition {
    /// Look up a cell by id.
    #[inline]
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.index()]
    }

    /// Number of leaves (cells of the decomposition).
    #[inline]
    pub fn leaf_count(&self) -> usize {
        self.stats.leaves
    }

    /// Build statistics.
    #[inline]
    pub fn stats(&self) -> &PartitionStats {
        &self.stats
    }

    /// Leaf cells in depth-first order, children visited in generation
    /// order.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            cells: &self.cells,
            stack: vec![CellId::ROOT],
        }
    }

    /// Leaf test points in the same order as [`leaves`](Self::leaves).
    pub fn leaf_points(&self) -> impl Iterator<Item = &FxHashMap<Var, BigRational>> {
        self.leaves().map(move |id| self.cell(id).test_point())
    }
}

/// Depth-first iterator over the leaves of a partition.
pub struct Leaves<'a> {
    cells: &'a [Cell],
    stack: Vec<CellId>,
}

impl Iterator for Leaves<'_> {
    type Item = CellId;

    fn next(&mut self) -> Option<CellId> {
        while let Some(id) = self.stack.pop() {
            let cell = &self.cells[id.index()];
            if cell.is_leaf() {
                return Some(id);
            }
            // Reversed so generation order comes off the stack first.
            self.stack.extend(cell.children.iter().rev().copied());
        }
        None
    }
}

/// Substitute `point` into every expression of a projection set and collect
/// the roots along `var`, sorted ascending and deduplicated.
///
/// Residuals with no remaining coefficients (the zero expression, or an
/// expression whose variables are all ancestors) contribute no root.
/// Anything left with more than one coefficient means projection leveling
/// broke down and is reported as [`LincadError::NotUnivariate`].
fn collect_roots(
    ctx: &Context,
    set: &[ExprId],
    point: &FxHashMap<Var, BigRational>,
    var: Var,
) -> Result<Vec<BigRational>> {
    let mut roots = Vec::new();
    for &id in set {
        let residual = ctx.expr(id).evaluate_at(point);
        if residual.is_constant() {
            continue;
        }
        debug_assert!(residual.num_terms() > 1 || residual.depends_on(var));
        roots.push(residual.root()?);
    }
    roots.sort();
    roots.dedup();
    Ok(roots)
}

/// The CAD sample policy for a sorted, duplicate-free root list: one point
/// strictly below the minimum root, each root itself, the midpoint of each
/// consecutive pair, and one point strictly above the maximum root. With no
/// roots the whole line is one cell, sampled at 0.
fn sample_points(roots: &[BigRational]) -> Vec<BigRational> {
    if roots.is_empty() {
        return vec![BigRational::zero()];
    }

    let one = BigRational::one();
    let two = BigRational::from_integer(BigInt::from(2));
    let mut points = Vec::with_capacity(2 * roots.len() + 1);

    points.push(&roots[0] - &one);
    for (i, root) in roots.iter().enumerate() {
        points.push(root.clone());
        if let Some(next) = roots.get(i + 1) {
            points.push((root + next) / &two);
        }
    }
    points.push(&roots[roots.len() - 1] + &one);

    points
}

/// Full-assignment invariant: every context variable must be assigned by a
/// leaf test point. Enforced both when the lift bottoms out and before the
/// solver substitutes a leaf point into constraint expressions.
pub(crate) fn ensure_assigns_all(
    point: &FxHashMap<Var, BigRational>,
    num_vars: usize,
) -> Result<()> {
    for var in 0..num_vars as Var {
        if !point.contains_key(&var) {
            return Err(LincadError::IncompleteTestPoint { var });
        }
    }
    Ok(())
}

impl Context {
    /// Build a sign-invariant partition for a set of expressions.
    ///
    /// The variable order is creation order: projection eliminates the most
    /// recently created variable first, and the lift samples variable 0
    /// first. The input set is deduplicated up front; zero expressions are
    /// tolerated throughout (they carry no root information).
    pub fn build_sign_invariant_partition(
        &mut self,
        exprs: &[ExprId],
    ) -> Result<SignInvariantPartition> {
        let num_vars = self.num_vars();

        let mut seen = FxHashSet::default();
        let mut base: Vec<ExprId> = Vec::new();
        for &id in exprs {
            if seen.insert(id) {
                base.push(id);
            }
        }

        // proj_sets[k] holds expressions over variables 0..=k; the lift at
        // depth k substitutes variables 0..k and solves variable k.
        let mut proj_sets: Vec<Vec<ExprId>> = vec![Vec::new(); num_vars];
        if num_vars > 0 {
            proj_sets[num_vars - 1] = base;
            for level in (0..num_vars - 1).rev() {
                proj_sets[level] =
                    self.project_away(&proj_sets[level + 1], (level + 1) as Var);
            }
        }

        let mut cells = vec![Cell {
            point: FxHashMap::default(),
            children: Vec::new(),
        }];
        let mut stats = PartitionStats {
            cells: 1,
            ..PartitionStats::default()
        };

        let mut stack: Vec<(CellId, usize)> = vec![(CellId::ROOT, 0)];
        while let Some((cell, depth)) = stack.pop() {
            if depth == num_vars {
                ensure_assigns_all(&cells[cell.index()].point, num_vars)?;
                stats.leaves += 1;
                continue;
            }

            let var = depth as Var;
            let point = cells[cell.index()].point.clone();
            let roots = collect_roots(self, &proj_sets[depth], &point, var)?;
            let samples = sample_points(&roots);
            trace!(
                depth,
                roots = roots.len(),
                samples = samples.len(),
                "lifting level"
            );
            stats.roots += roots.len();
            stats.samples += samples.len();

            for value in samples {
                let mut child_point = point.clone();
                child_point.insert(var, value);
                let child = CellId(cells.len() as u32);
                cells.push(Cell {
                    point: child_point,
                    children: Vec::new(),
                });
                cells[cell.index()].children.push(child);
                stats.cells += 1;
                stack.push((child, depth + 1));
            }
        }

        debug!(
            cells = stats.cells,
            leaves = stats.leaves,
            "built sign-invariant partition"
        );
        Ok(SignInvariantPartition { cells, stats })
    }
}
