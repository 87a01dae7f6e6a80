use mdao_core::Bounds;

/// Relative perturbation used to build the initial simplex.
const INITIAL_STEP: f64 = 0.05;

/// Smallest absolute perturbation, used for coordinates at or near zero.
const MIN_STEP: f64 = 0.000_25;

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Vertex {
    pub(super) x: Vec<f64>,
    pub(super) f: f64,
}

/// A simplex of `n + 1` vertices, kept sorted best-first after [`Simplex::sort`].
#[derive(Debug, Clone)]
pub(super) struct Simplex {
    vertices: Vec<Vertex>,
}

impl Simplex {
    pub(super) fn new(vertices: Vec<Vertex>) -> Self {
        let mut simplex = Self { vertices };
        simplex.sort();
        simplex
    }

    /// Sorts vertices by objective, keeping insertion order among ties.
    pub(super) fn sort(&mut self) {
        self.vertices.sort_by(|a, b| a.f.total_cmp(&b.f));
    }

    pub(super) fn best(&self) -> &Vertex {
        &self.vertices[0]
    }

    pub(super) fn worst(&self) -> &Vertex {
        &self.vertices[self.vertices.len() - 1]
    }

    /// Returns the second-worst vertex.
    pub(super) fn runner_up(&self) -> &Vertex {
        &self.vertices[self.vertices.len().saturating_sub(2)]
    }

    pub(super) fn replace_worst(&mut self, vertex: Vertex) {
        let last = self.vertices.len() - 1;
        self.vertices[last] = vertex;
        self.sort();
    }

    /// Centroid of every vertex except the worst.
    pub(super) fn centroid(&self) -> Vec<f64> {
        let keep = &self.vertices[..self.vertices.len() - 1];
        let n = keep.len() as f64;
        let dim = self.best().x.len();

        (0..dim)
            .map(|j| keep.iter().map(|v| v.x[j]).sum::<f64>() / n)
            .collect()
    }

    /// Largest objective difference from the best vertex.
    pub(super) fn f_spread(&self) -> f64 {
        let best = self.best().f;
        self.vertices
            .iter()
            .fold(0.0, |acc, v| acc.max((v.f - best).abs()))
    }

    /// Largest coordinate distance from the best vertex.
    pub(super) fn x_spread(&self) -> f64 {
        let best = &self.best().x;
        self.vertices
            .iter()
            .flat_map(|v| v.x.iter().zip(best).map(|(a, b)| (a - b).abs()))
            .fold(0.0, f64::max)
    }

    /// Points halfway between the best vertex and each of the others.
    pub(super) fn shrink_points(&self) -> Vec<Vec<f64>> {
        let best = &self.best().x;
        self.vertices[1..]
            .iter()
            .map(|v| along(best, &v.x, 0.5))
            .collect()
    }

    /// Replaces every vertex but the best.
    pub(super) fn replace_others(&mut self, others: Vec<Vertex>) {
        self.vertices.truncate(1);
        self.vertices.extend(others);
        self.sort();
    }
}

/// Builds the starting points: `x0` followed by one perturbed point per coordinate.
pub(super) fn initial_points(x0: &[f64], bounds: &[Bounds]) -> Vec<Vec<f64>> {
    let mut points = vec![x0.to_vec()];

    for (i, b) in bounds.iter().enumerate() {
        let step = (INITIAL_STEP * x0[i].abs()).max(MIN_STEP);
        let mut point = x0.to_vec();
        point[i] = if x0[i] + step <= b.upper() {
            x0[i] + step
        } else {
            b.clamp(x0[i] - step)
        };
        points.push(point);
    }

    points
}

/// Returns `from + t * (to - from)`.
pub(super) fn along(from: &[f64], to: &[f64], t: f64) -> Vec<f64> {
    from.iter().zip(to).map(|(a, b)| a + t * (b - a)).collect()
}

pub(super) fn project(point: Vec<f64>, bounds: &[Bounds]) -> Vec<f64> {
    point
        .into_iter()
        .zip(bounds)
        .map(|(v, b)| b.clamp(v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: &[f64], f: f64) -> Vertex {
        Vertex { x: x.to_vec(), f }
    }

    #[test]
    fn initial_points_step_inward_at_upper_bound() {
        let bounds = [Bounds::new(0.0, 10.0).unwrap(), Bounds::new(-1.0, 1.0).unwrap()];
        let points = initial_points(&[10.0, 0.0], &bounds);

        assert_eq!(points.len(), 3);
        assert_eq!(points[1], vec![9.5, 0.0]);
        assert_eq!(points[2], vec![10.0, MIN_STEP]);
    }

    #[test]
    fn tiny_starting_values_get_a_usable_step() {
        let bounds = [Bounds::new(-50.0, 50.0).unwrap(); 2];
        let points = initial_points(&[1e-7, -1e-7], &bounds);

        assert_eq!(points[1], vec![1e-7 + MIN_STEP, -1e-7]);
        assert_eq!(points[2], vec![1e-7, -1e-7 + MIN_STEP]);
    }

    #[test]
    fn sorts_and_measures_spread() {
        let simplex = Simplex::new(vec![
            vertex(&[1.0, 1.0], 3.0),
            vertex(&[0.0, 0.0], 1.0),
            vertex(&[0.5, 2.0], 2.0),
        ]);

        assert_eq!(simplex.best().f, 1.0);
        assert_eq!(simplex.worst().f, 3.0);
        assert_eq!(simplex.runner_up().f, 2.0);
        assert_eq!(simplex.f_spread(), 2.0);
        assert_eq!(simplex.x_spread(), 2.0);
        assert_eq!(simplex.centroid(), vec![0.25, 1.0]);
    }

    #[test]
    fn projection_clamps_each_coordinate() {
        let bounds = [Bounds::new(0.0, 1.0).unwrap(), Bounds::new(0.0, 1.0).unwrap()];
        assert_eq!(project(vec![-0.5, 1.5], &bounds), vec![0.0, 1.0]);
    }
}
