// Cyclic Jacobi eigen-decomposition for small dense symmetric matrices.
// Deterministic (fixed sweep order, no random starts), which keeps expanded
// steering directions reproducible run to run.

const MAX_SWEEPS: usize = 100;

/// Eigenpairs sorted by eigenvalue, largest first.
#[derive(Debug, Clone)]
pub(crate) struct SymmetricEigen {
    pub values: Vec<f64>,
    /// `vectors[j]` is the unit eigenvector for `values[j]`.
    pub vectors: Vec<Vec<f64>>,
}

/// Decompose a symmetric `n x n` matrix given as rows.
pub(crate) fn symmetric_eigen(mut a: Vec<Vec<f64>>) -> SymmetricEigen {
    let n = a.len();
    debug_assert!(a.iter().all(|row| row.len() == n));

    let mut v = vec![vec![0.0f64; n]; n];
    for (i, row) in v.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    let scale: f64 = a.iter().flatten().map(|x| x * x).sum::<f64>().sqrt();
    let threshold = (scale * 1e-15).max(f64::MIN_POSITIVE);

    for _ in 0..MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|p| ((p + 1)..n).map(move |q| (p, q)))
            .map(|(p, q)| a[p][q] * a[p][q])
            .sum::<f64>()
            .sqrt();
        if off <= threshold {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[p][q];
                if apq.abs() <= threshold * 1e-3 {
                    continue;
                }

                let app = a[p][p];
                let aqq = a[q][q];
                let theta = (aqq - app) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let t = if theta == 0.0 { 1.0 } else { t };
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                a[p][p] = app - t * apq;
                a[q][q] = aqq + t * apq;
                a[p][q] = 0.0;
                a[q][p] = 0.0;

                for k in 0..n {
                    if k == p || k == q {
                        continue;
                    }
                    let akp = a[k][p];
                    let akq = a[k][q];
                    a[k][p] = c * akp - s * akq;
                    a[p][k] = a[k][p];
                    a[k][q] = s * akp + c * akq;
                    a[q][k] = a[k][q];
                }

                for row in v.iter_mut() {
                    let vkp = row[p];
                    let vkq = row[q];
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[j][j].total_cmp(&a[i][i]).then(i.cmp(&j)));

    SymmetricEigen {
        values: order.iter().map(|&j| a[j][j]).collect(),
        vectors: order
            .iter()
            .map(|&j| v.iter().map(|row| row[j]).collect())
            .collect(),
    }
}
