use nalgebra::{DMatrix, DVector};
use tracing::debug;

use covsteer_solver::{svec_len, ConeModel, PsdBlock};
use covsteer_types::{Result, SteeringProblem};

use crate::layout::VarLayout;

const SQRT2: f64 = std::f64::consts::SQRT_2;

/// Builder for the covariance steering SDP
pub struct SdpBuilder;

impl SdpBuilder {
    /// Build the conic program for a steering problem.
    ///
    /// Decision variables are the covariance sequence Sigma_0..Sigma_N,
    /// the cross terms P_0..P_{N-1} and the input second moments
    /// M_0..M_{N-1}. Sigma_0 and Sigma_N are pinned by equalities, the
    /// second-moment recursion is an equality per step, and each step
    /// carries the joint PSD block [[Sigma_k, P_k], [P_k^T, M_k]].
    /// The block is the Schur-complement form of M_k >= K Sigma_k K^T
    /// and is what makes the problem convex; it must not be collapsed
    /// into a product of the factors.
    pub fn build(problem: &SteeringProblem) -> Result<ConeModel> {
        problem.validate()?;

        let sys = &problem.system;
        let n = sys.state_dim();
        let m = sys.input_dim();
        let horizon = sys.horizon;
        let layout = VarLayout::new(n, m, horizon);
        let n_vars = layout.num_vars();
        let sn = svec_len(n);

        // Objective: minimize sum_k trace(M_k)
        let mut q = DVector::zeros(n_vars);
        for k in 0..horizon {
            for r in 0..m {
                q[layout.input_moment(k, r, r)] = 1.0;
            }
        }

        // Equalities: boundary pins plus one recursion row per upper
        // triangle entry per step
        let n_eq = 2 * sn + horizon * sn;
        let mut a_eq = DMatrix::zeros(n_eq, n_vars);
        let mut b_eq = DVector::zeros(n_eq);
        let mut row_idx = 0;

        for col in 0..n {
            for row in 0..=col {
                a_eq[(row_idx, layout.sigma(0, row, col))] = 1.0;
                b_eq[row_idx] = problem.sigma_initial[(row, col)];
                row_idx += 1;
            }
        }
        for col in 0..n {
            for row in 0..=col {
                a_eq[(row_idx, layout.sigma(horizon, row, col))] = 1.0;
                b_eq[row_idx] = problem.sigma_terminal[(row, col)];
                row_idx += 1;
            }
        }

        // Recursion: Sigma_{k+1} = A Sigma_k A^T + A P_k B^T
        //            + B P_k^T A^T + B M_k B^T + W
        for k in 0..horizon {
            for j in 0..n {
                for i in 0..=j {
                    a_eq[(row_idx, layout.sigma(k + 1, i, j))] += 1.0;

                    // -(A Sigma_k A^T)[i, j]; accumulation over (p, q)
                    // and (q, p) folds the symmetric variable correctly
                    for p in 0..n {
                        for qq in 0..n {
                            a_eq[(row_idx, layout.sigma(k, p, qq))] -=
                                sys.a[(i, p)] * sys.a[(j, qq)];
                        }
                    }

                    // -(A P_k B^T + B P_k^T A^T)[i, j]
                    for p in 0..n {
                        for r in 0..m {
                            a_eq[(row_idx, layout.cross(k, p, r))] -=
                                sys.a[(i, p)] * sys.b[(j, r)] + sys.b[(i, r)] * sys.a[(j, p)];
                        }
                    }

                    // -(B M_k B^T)[i, j]
                    for r in 0..m {
                        for s in 0..m {
                            a_eq[(row_idx, layout.input_moment(k, r, s))] -=
                                sys.b[(i, r)] * sys.b[(j, s)];
                        }
                    }

                    b_eq[row_idx] = sys.w[(i, j)];
                    row_idx += 1;
                }
            }
        }

        // Optional scalar path bound on one intermediate covariance entry
        let (a_ub, b_ub) = match &problem.path_bound {
            Some(bound) => {
                let mut a_ub = DMatrix::zeros(1, n_vars);
                a_ub[(0, layout.sigma(bound.step, bound.row, bound.col))] = 1.0;
                (a_ub, DVector::from_vec(vec![bound.limit]))
            }
            None => (DMatrix::zeros(0, n_vars), DVector::zeros(0)),
        };

        // Joint PSD block per step, in scaled triangle order
        let dim = n + m;
        let mut psd_blocks = Vec::with_capacity(horizon);
        for k in 0..horizon {
            let rows = svec_len(dim);
            let mut a = DMatrix::zeros(rows, n_vars);
            let mut svec_row = 0;
            for col in 0..dim {
                for row in 0..=col {
                    let scale = if row < col { SQRT2 } else { 1.0 };
                    let var = if col < n {
                        layout.sigma(k, row, col)
                    } else if row < n {
                        layout.cross(k, row, col - n)
                    } else {
                        layout.input_moment(k, row - n, col - n)
                    };
                    a[(svec_row, var)] = scale;
                    svec_row += 1;
                }
            }
            psd_blocks.push(PsdBlock {
                dim,
                a,
                c: DVector::zeros(rows),
            });
        }

        debug!(
            n,
            m,
            horizon,
            vars = n_vars,
            equalities = n_eq,
            path_bound = problem.path_bound.is_some(),
            "built steering SDP"
        );

        Ok(ConeModel {
            q,
            a_eq,
            b_eq,
            a_ub,
            b_ub,
            psd_blocks,
            var_meta: layout.var_meta(),
        })
    }
}
