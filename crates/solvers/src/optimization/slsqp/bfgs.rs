/// Dense inverse-Hessian approximation maintained by BFGS updates.
#[derive(Debug, Clone)]
pub(super) struct InverseHessian {
    n: usize,
    h: Vec<f64>,
}

impl InverseHessian {
    pub(super) fn identity(n: usize) -> Self {
        let mut hessian = Self {
            n,
            h: vec![0.0; n * n],
        };
        hessian.reset();
        hessian
    }

    pub(super) fn reset(&mut self) {
        self.h.fill(0.0);
        for i in 0..self.n {
            self.h[i * self.n + i] = 1.0;
        }
    }

    fn at(&self, i: usize, j: usize) -> f64 {
        self.h[i * self.n + j]
    }

    /// Returns `-H g` restricted to the free variables.
    pub(super) fn direction(&self, grad: &[f64], free: &[bool]) -> Vec<f64> {
        (0..self.n)
            .map(|i| {
                if !free[i] {
                    return 0.0;
                }
                -(0..self.n)
                    .filter(|&j| free[j])
                    .map(|j| self.at(i, j) * grad[j])
                    .sum::<f64>()
            })
            .collect()
    }

    /// Applies the BFGS update for step `s` and gradient change `y`.
    ///
    /// Returns `false` and leaves the approximation unchanged when the
    /// curvature condition `s·y > 0` does not hold with margin.
    pub(super) fn update(&mut self, s: &[f64], y: &[f64]) -> bool {
        let sy = dot(s, y);
        if sy <= f64::EPSILON * norm(s) * norm(y) {
            return false;
        }

        let n = self.n;
        let rho = 1.0 / sy;
        let hy: Vec<f64> = (0..n)
            .map(|i| (0..n).map(|j| self.at(i, j) * y[j]).sum())
            .collect();
        let yhy = dot(y, &hy);
        let ss_scale = rho * rho * yhy + rho;

        for i in 0..n {
            for j in 0..n {
                self.h[i * n + j] += -rho * (hy[i] * s[j] + s[i] * hy[j]) + ss_scale * s[i] * s[j];
            }
        }
        true
    }
}

pub(super) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn identity_gives_steepest_descent() {
        let h = InverseHessian::identity(2);
        assert_eq!(h.direction(&[2.0, -1.0], &[true, true]), vec![-2.0, 1.0]);
        assert_eq!(h.direction(&[2.0, -1.0], &[false, true]), vec![0.0, 1.0]);
    }

    #[test]
    fn update_satisfies_secant_condition() {
        let mut h = InverseHessian::identity(2);
        let s = [4.0, -3.0];
        let y = [5.0, -10.0];
        assert!(h.update(&s, &y));

        // H y = s after the update.
        let d = h.direction(&y, &[true, true]);
        assert_relative_eq!(-d[0], s[0], epsilon = 1e-12);
        assert_relative_eq!(-d[1], s[1], epsilon = 1e-12);
    }

    #[test]
    fn skips_update_without_positive_curvature() {
        let mut h = InverseHessian::identity(2);
        assert!(!h.update(&[1.0, 0.0], &[-1.0, 0.0]));
        assert_eq!(h.direction(&[1.0, 1.0], &[true, true]), vec![-1.0, -1.0]);
    }
}
