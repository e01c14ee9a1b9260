use nalgebra::Vector3;

/// A real-valued function of position that can be tabulated on a grid.
///
/// Grid-based DFT needs the value of every atomic orbital at each quadrature
/// point, and for gradient-corrected functionals its first derivatives too.
pub trait Basis {
    fn evaluate(&self, r: &Vector3<f64>) -> f64;

    /// Cartesian gradient (∂x, ∂y, ∂z) at `r`.
    fn gradient(&self, r: &Vector3<f64>) -> Vector3<f64>;

    /// Value and gradient in one pass; override when the two share work.
    fn evaluate_with_gradient(&self, r: &Vector3<f64>) -> (f64, Vector3<f64>) {
        (self.evaluate(r), self.gradient(r))
    }

    fn center(&self) -> Vector3<f64>;
}
