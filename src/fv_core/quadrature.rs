extern crate nalgebra as na;

use crate::fv_core::physics::State;
use na::SymmetricEigen;

/// Gauss-Legendre nodes and weights on `[-1, 1]`: the nodes are the
/// eigenvalues of the symmetric tridiagonal Jacobi matrix of the Legendre
/// recurrence, the weights twice the squared first eigenvector components.
pub fn golub_welsch(n: usize) -> (na::DVector<f64>, na::DVector<f64>) {
    let beta = |k: usize| k as f64 / ((4 * k * k - 1) as f64).sqrt();
    let jacobi = na::DMatrix::from_fn(n, n, |i, j| {
        if i.abs_diff(j) == 1 {
            beta(i.max(j))
        } else {
            0.0
        }
    });
    let SymmetricEigen {
        eigenvalues,
        eigenvectors,
    } = SymmetricEigen::new(jacobi);
    let weights = eigenvectors.row(0).transpose().map(|v| 2.0 * v * v);
    (eigenvalues, weights)
}

/// Tensor-product rule for the average of `integrand` over `[x0, x1] x [y0, y1]`.
pub fn cell_average<F, const D: usize>(
    (x0, x1): (f64, f64),
    (y0, y1): (f64, f64),
    n: usize,
    integrand: F,
) -> State<D>
where
    F: Fn(f64, f64) -> State<D>,
{
    let (nodes, weights) = golub_welsch(n);
    let mut sum = State::<D>::zeros();
    for (xi, wi) in nodes.iter().zip(weights.iter()) {
        let x = 0.5 * (x0 + x1) + 0.5 * (x1 - x0) * xi;
        for (yj, wj) in nodes.iter().zip(weights.iter()) {
            let y = 0.5 * (y0 + y1) + 0.5 * (y1 - y0) * yj;
            sum += integrand(x, y) * (wi * wj);
        }
    }
    // weights sum to 2 per axis
    sum * 0.25
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_point_rule() {
        let (nodes, weights) = golub_welsch(2);
        let mut n: Vec<f64> = nodes.iter().copied().collect();
        n.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((n[1] - 1.0 / 3f64.sqrt()).abs() < 1e-12);
        assert!((n[0] + 1.0 / 3f64.sqrt()).abs() < 1e-12);
        assert!((weights.sum() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn averages_bilinear_exactly() {
        let avg = cell_average::<_, 1>((0.0, 1.0), (0.0, 2.0), 2, |x, y| {
            State::<1>::new(x * y + 3.0)
        });
        // mean of x*y over [0,1]x[0,2] is 0.5
        assert!((avg[0] - 3.5).abs() < 1e-12);
    }
}
