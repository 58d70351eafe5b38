//! Dense quadratic programming via the Goldfarb-Idnani dual active-set method.
//!
//! Solves `min 0.5 x^T G x + g0^T x` subject to `CE^T x + ce0 = 0` and
//! `CI^T x + ci0 >= 0`. Constraint matrices store one constraint per
//! column, following the usual Goldfarb-Idnani formulation.
//!
//! The problems posed by the placement solver are tiny (at most 8
//! unknowns, 4 equalities and 2 inequalities) but one is solved per edge
//! per loop iteration, so the implementation sticks to plain index loops
//! over small dense matrices and never recurses.
//!
//! Infeasibility is a normal outcome here, not a fault: the caller maps it
//! to an infinite collapse cost.

// Algorithm uses the standard mathematical variable names
#![allow(clippy::many_single_char_names)]

use nalgebra::{Cholesky, DMatrix, DVector};

/// Fail-safe bound on active-set iterations. Numerical corner cases only;
/// well-posed problems of this size converge in a handful of steps.
const MAX_ITERATIONS: usize = 1000;

/// Outcome of a QP solve.
#[derive(Debug, Clone)]
pub struct QpSolution {
    /// The minimizer, empty when the problem is infeasible.
    pub x: DVector<f64>,
    /// Objective value at `x`; `+inf` when infeasible.
    pub cost: f64,
}

impl QpSolution {
    fn infeasible() -> Self {
        Self {
            x: DVector::zeros(0),
            cost: f64::INFINITY,
        }
    }

    /// Whether the solver found a feasible minimizer.
    #[must_use]
    pub fn is_feasible(&self) -> bool {
        self.cost.is_finite()
    }
}

/// Solve `min 0.5 x^T G x + g0^T x` s.t. `CE^T x + ce0 = 0`, `CI^T x + ci0 >= 0`.
///
/// `g` must be symmetric positive definite (callers add a diagonal
/// regularizer to guarantee this). Linearly dependent equality
/// constraints and infeasible constraint sets yield an infeasible
/// solution rather than an error.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn solve_quadprog(
    g: DMatrix<f64>,
    g0: &DVector<f64>,
    ce: &DMatrix<f64>,
    ce0: &DVector<f64>,
    ci: &DMatrix<f64>,
    ci0: &DVector<f64>,
) -> QpSolution {
    let n = g.nrows();
    let p = ce.ncols();
    let m = ci.ncols();
    debug_assert_eq!(g.ncols(), n);
    debug_assert_eq!(g0.len(), n);
    debug_assert_eq!(ce.nrows().max(n), n);
    debug_assert_eq!(ce0.len(), p);
    debug_assert_eq!(ci0.len(), m);

    if p > n {
        return QpSolution::infeasible();
    }

    let eps = f64::EPSILON;
    let c1 = g.trace();

    let Some(chol) = Cholesky::new(g) else {
        return QpSolution::infeasible();
    };

    // J = L^-T spans the unconstrained null space; rotated as constraints
    // enter the active set.
    let Some(l_inv) = chol
        .l()
        .solve_lower_triangular(&DMatrix::identity(n, n))
    else {
        return QpSolution::infeasible();
    };
    let mut j = l_inv.transpose();
    let c2 = j.trace();

    // Unconstrained minimizer x = -G^-1 g0.
    let mut x = -chol.solve(g0);
    let mut f_value = 0.5 * g0.dot(&x);

    let mut r_mat = DMatrix::<f64>::zeros(n, n);
    let mut r_norm = 1.0_f64;

    let mut d = DVector::<f64>::zeros(n);
    let mut z = DVector::<f64>::zeros(n);
    let mut r = DVector::<f64>::zeros(m + p);
    let mut u = DVector::<f64>::zeros(m + p);
    let mut s = DVector::<f64>::zeros(m);
    let mut np = DVector::<f64>::zeros(n);

    // Active set: equalities first (stored negated), then inequalities.
    let mut a_set: Vec<isize> = vec![0; m + p];
    let mut iq = 0usize;

    // Fold in the equality constraints one by one.
    for i in 0..p {
        for k in 0..n {
            np[k] = ce[(k, i)];
        }
        compute_d(&mut d, &j, &np);
        update_z(&mut z, &j, &d, iq);
        update_r(&r_mat, &mut r, &d, iq);

        // Full step length onto the constraint plane; zero when the
        // constraint is in the span of the active set.
        let z_dot_np = z.dot(&np);
        let t2 = if z.norm() > eps {
            (-np.dot(&x) - ce0[i]) / z_dot_np
        } else {
            0.0
        };

        x.axpy(t2, &z, 1.0);
        u[iq] = t2;
        for k in 0..iq {
            u[k] -= t2 * r[k];
        }
        f_value += 0.5 * t2 * t2 * z_dot_np;
        a_set[i] = -(isize::try_from(i).unwrap_or(0)) - 1;

        if !add_constraint(&mut r_mat, &mut j, &mut d, &mut iq, &mut r_norm) {
            // Equality constraints are linearly dependent.
            return QpSolution::infeasible();
        }
    }

    // -1 marks an active inequality, its own index an inactive one.
    let mut iai: Vec<isize> = (0..m).map(|i| i as isize).collect();
    let mut iaexcl = vec![true; m];

    let mut iter = 0usize;
    let mut x_old = x.clone();
    let mut u_old = u.clone();
    let mut a_old = a_set.clone();

    'l1: loop {
        iter += 1;
        if iter > MAX_ITERATIONS {
            return QpSolution::infeasible();
        }

        for i in p..iq {
            let ai = a_set[i];
            if ai >= 0 {
                iai[ai as usize] = -1;
            }
        }

        // Slack of every inequality at the current iterate.
        let mut psi = 0.0_f64;
        for i in 0..m {
            iaexcl[i] = true;
            let mut sum = ci0[i];
            for k in 0..n {
                sum += ci[(k, i)] * x[k];
            }
            s[i] = sum;
            psi += sum.min(0.0);
        }

        #[allow(clippy::cast_precision_loss)]
        if psi.abs() <= (m as f64) * eps * c1 * c2 * 100.0 {
            // Numerically feasible: done.
            return QpSolution { x, cost: f_value };
        }

        x_old.copy_from(&x);
        u_old.copy_from(&u);
        a_old.copy_from_slice(&a_set);

        'l2: loop {
            // Most violated inactive inequality becomes the candidate.
            let mut ss = 0.0_f64;
            let mut ip = 0usize;
            for i in 0..m {
                if s[i] < ss && iai[i] != -1 && iaexcl[i] {
                    ss = s[i];
                    ip = i;
                }
            }
            if ss >= 0.0 {
                return QpSolution { x, cost: f_value };
            }

            for k in 0..n {
                np[k] = ci[(k, ip)];
            }
            u[iq] = 0.0;
            a_set[iq] = ip as isize;

            'l2a: loop {
                compute_d(&mut d, &j, &np);
                update_z(&mut z, &j, &d, iq);
                update_r(&r_mat, &mut r, &d, iq);

                // Maximum dual step before an active constraint's
                // multiplier hits zero.
                let mut t1 = f64::INFINITY;
                let mut l = 0usize;
                for k in p..iq {
                    if r[k] > 0.0 {
                        let tmp = u[k] / r[k];
                        if tmp < t1 {
                            t1 = tmp;
                            l = a_set[k] as usize;
                        }
                    }
                }

                // Primal step to make constraint ip feasible.
                let z_dot_np = z.dot(&np);
                let t2 = if z.dot(&z).abs() > eps {
                    -s[ip] / z_dot_np
                } else {
                    f64::INFINITY
                };

                let t = t1.min(t2);
                if t >= f64::INFINITY {
                    // Both steps unbounded: the problem is infeasible.
                    return QpSolution::infeasible();
                }

                if t2 >= f64::INFINITY {
                    // Dual-only step: drop the blocking constraint.
                    for k in 0..iq {
                        u[k] -= t * r[k];
                    }
                    u[iq] += t;
                    iai[l] = l as isize;
                    delete_constraint(&mut r_mat, &mut j, &mut a_set, &mut u, p, &mut iq, l);
                    continue 'l2a;
                }

                x.axpy(t, &z, 1.0);
                f_value += t * z_dot_np * (0.5 * t + u[iq]);
                for k in 0..iq {
                    u[k] -= t * r[k];
                }
                u[iq] += t;

                if (t - t2).abs() < eps {
                    // Full step: constraint ip enters the active set.
                    if add_constraint(&mut r_mat, &mut j, &mut d, &mut iq, &mut r_norm) {
                        iai[ip] = -1;
                        continue 'l1;
                    }
                    // Degenerate constraint: back out and exclude it.
                    iaexcl[ip] = false;
                    delete_constraint(&mut r_mat, &mut j, &mut a_set, &mut u, p, &mut iq, ip);
                    for (i, slot) in iai.iter_mut().enumerate() {
                        *slot = i as isize;
                    }
                    for i in 0..iq {
                        a_set[i] = a_old[i];
                        u[i] = u_old[i];
                        if i >= p && a_set[i] >= 0 {
                            iai[a_set[i] as usize] = -1;
                        }
                    }
                    x.copy_from(&x_old);
                    continue 'l2;
                }

                // Partial step: drop constraint l and retry.
                iai[l] = l as isize;
                delete_constraint(&mut r_mat, &mut j, &mut a_set, &mut u, p, &mut iq, l);
                let mut sum = ci0[ip];
                for k in 0..n {
                    sum += ci[(k, ip)] * x[k];
                }
                s[ip] = sum;
                continue 'l2a;
            }
        }
    }
}

/// `d = J^T np`.
fn compute_d(d: &mut DVector<f64>, j: &DMatrix<f64>, np: &DVector<f64>) {
    let n = d.len();
    for i in 0..n {
        let mut sum = 0.0;
        for k in 0..n {
            sum += j[(k, i)] * np[k];
        }
        d[i] = sum;
    }
}

/// `z = J_2 d_2`: the step direction in the null space of the active set.
fn update_z(z: &mut DVector<f64>, j: &DMatrix<f64>, d: &DVector<f64>, iq: usize) {
    let n = z.len();
    for k in 0..n {
        let mut sum = 0.0;
        for i in iq..n {
            sum += j[(k, i)] * d[i];
        }
        z[k] = sum;
    }
}

/// `r = R^-1 d_1` by back substitution over the active-set triangle.
fn update_r(r_mat: &DMatrix<f64>, r: &mut DVector<f64>, d: &DVector<f64>, iq: usize) {
    for i in (0..iq).rev() {
        let mut sum = d[i];
        for k in i + 1..iq {
            sum -= r_mat[(i, k)] * r[k];
        }
        r[i] = sum / r_mat[(i, i)];
    }
}

/// Givens-rotate the factorization so constraint direction `d` joins the
/// active set. Returns `false` when `d` is linearly dependent on it.
fn add_constraint(
    r_mat: &mut DMatrix<f64>,
    j: &mut DMatrix<f64>,
    d: &mut DVector<f64>,
    iq: &mut usize,
    r_norm: &mut f64,
) -> bool {
    let n = d.len();

    for k in (*iq + 1..n).rev() {
        let cc = d[k - 1];
        let ss = d[k];
        let h = hypot(cc, ss);
        if h == 0.0 {
            continue;
        }
        d[k] = 0.0;
        let mut cc = cc / h;
        let mut ss = ss / h;
        if cc < 0.0 {
            cc = -cc;
            ss = -ss;
            d[k - 1] = -h;
        } else {
            d[k - 1] = h;
        }
        let xny = ss / (1.0 + cc);
        for row in 0..n {
            let t1 = j[(row, k - 1)];
            let t2 = j[(row, k)];
            j[(row, k - 1)] = t1 * cc + t2 * ss;
            j[(row, k)] = xny * (t1 + j[(row, k - 1)]) - t2;
        }
    }

    *iq += 1;
    for i in 0..*iq {
        r_mat[(i, *iq - 1)] = d[i];
    }

    if d[*iq - 1].abs() <= f64::EPSILON * *r_norm {
        return false;
    }
    *r_norm = r_norm.max(d[*iq - 1].abs());
    true
}

/// Remove inequality constraint `l` from the active set and restore the
/// triangular structure of `R`.
fn delete_constraint(
    r_mat: &mut DMatrix<f64>,
    j: &mut DMatrix<f64>,
    a_set: &mut [isize],
    u: &mut DVector<f64>,
    p: usize,
    iq: &mut usize,
    l: usize,
) {
    let n = j.nrows();
    let mut qq = *iq;
    for i in p..*iq {
        if a_set[i] == l as isize {
            qq = i;
            break;
        }
    }
    if qq == *iq {
        // Not active; nothing to do.
        return;
    }

    for i in qq..*iq - 1 {
        a_set[i] = a_set[i + 1];
        u[i] = u[i + 1];
        for row in 0..n {
            r_mat[(row, i)] = r_mat[(row, i + 1)];
        }
    }
    a_set[*iq - 1] = a_set[*iq];
    u[*iq - 1] = u[*iq];
    a_set[*iq] = 0;
    u[*iq] = 0.0;
    for row in 0..*iq {
        r_mat[(row, *iq - 1)] = 0.0;
    }
    *iq -= 1;

    if *iq == 0 {
        return;
    }

    for k in qq..*iq {
        let cc = r_mat[(k, k)];
        let ss = r_mat[(k + 1, k)];
        let h = hypot(cc, ss);
        if h == 0.0 {
            continue;
        }
        let mut cc = cc / h;
        let mut ss = ss / h;
        r_mat[(k + 1, k)] = 0.0;
        if cc < 0.0 {
            r_mat[(k, k)] = -h;
            cc = -cc;
            ss = -ss;
        } else {
            r_mat[(k, k)] = h;
        }
        let xny = ss / (1.0 + cc);
        for col in k + 1..*iq {
            let t1 = r_mat[(k, col)];
            let t2 = r_mat[(k + 1, col)];
            r_mat[(k, col)] = t1 * cc + t2 * ss;
            r_mat[(k + 1, col)] = xny * (t1 + r_mat[(k, col)]) - t2;
        }
        for row in 0..n {
            let t1 = j[(row, k)];
            let t2 = j[(row, k + 1)];
            j[(row, k)] = t1 * cc + t2 * ss;
            j[(row, k + 1)] = xny * (j[(row, k)] + t1) - t2;
        }
    }
}

/// `sqrt(a^2 + b^2)` without intermediate overflow.
fn hypot(a: f64, b: f64) -> f64 {
    let a = a.abs();
    let b = b.abs();
    if a > b {
        let t = b / a;
        a * t.mul_add(t, 1.0).sqrt()
    } else if b > 0.0 {
        let t = a / b;
        b * t.mul_add(t, 1.0).sqrt()
    } else {
        0.0
    }
}
