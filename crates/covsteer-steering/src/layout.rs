use covsteer_solver::{svec_len, VarMeta};

/// Flat variable layout for the steering SDP.
///
/// Order: Sigma_0..Sigma_N (upper triangles), then P_0..P_{N-1}
/// (column-major), then M_0..M_{N-1} (upper triangles). Symmetric
/// matrices store one variable per unordered entry pair.
#[derive(Debug, Clone, Copy)]
pub struct VarLayout {
    n: usize,
    m: usize,
    horizon: usize,
}

/// Column-major upper-triangle offset of entry (row, col), row <= col
fn tri_index(row: usize, col: usize) -> usize {
    let (lo, hi) = if row <= col { (row, col) } else { (col, row) };
    hi * (hi + 1) / 2 + lo
}

impl VarLayout {
    pub fn new(n: usize, m: usize, horizon: usize) -> Self {
        VarLayout { n, m, horizon }
    }

    pub fn num_vars(&self) -> usize {
        (self.horizon + 1) * svec_len(self.n)
            + self.horizon * self.n * self.m
            + self.horizon * svec_len(self.m)
    }

    /// Variable index of Sigma_k[row, col], k = 0..=N
    pub fn sigma(&self, k: usize, row: usize, col: usize) -> usize {
        debug_assert!(k <= self.horizon);
        k * svec_len(self.n) + tri_index(row, col)
    }

    /// Variable index of P_k[row, col], k = 0..N
    pub fn cross(&self, k: usize, row: usize, col: usize) -> usize {
        debug_assert!(k < self.horizon);
        (self.horizon + 1) * svec_len(self.n) + k * self.n * self.m + col * self.n + row
    }

    /// Variable index of M_k[row, col], k = 0..N
    pub fn input_moment(&self, k: usize, row: usize, col: usize) -> usize {
        debug_assert!(k < self.horizon);
        (self.horizon + 1) * svec_len(self.n)
            + self.horizon * self.n * self.m
            + k * svec_len(self.m)
            + tri_index(row, col)
    }

    /// Metadata for every variable, in layout order
    pub fn var_meta(&self) -> Vec<VarMeta> {
        let mut meta = Vec::with_capacity(self.num_vars());
        for step in 0..=self.horizon {
            for col in 0..self.n {
                for row in 0..=col {
                    meta.push(VarMeta::StateCov { step, row, col });
                }
            }
        }
        for step in 0..self.horizon {
            for col in 0..self.m {
                for row in 0..self.n {
                    meta.push(VarMeta::CrossTerm { step, row, col });
                }
            }
        }
        for step in 0..self.horizon {
            for col in 0..self.m {
                for row in 0..=col {
                    meta.push(VarMeta::InputMoment { step, row, col });
                }
            }
        }
        meta
    }
}
