//! Classical fourth-order Runge-Kutta with a fixed step.
//!
//! Fixed steps keep results bit-reproducible: the sequence of derivative
//! evaluations depends only on the grid.

/// Scratch space for one state dimension, reused across steps.
pub struct Rk4 {
    k1: Vec<f64>,
    k2: Vec<f64>,
    k3: Vec<f64>,
    k4: Vec<f64>,
    probe: Vec<f64>,
}

impl Rk4 {
    pub fn new(dimension: usize) -> Self {
        Self {
            k1: vec![0.0; dimension],
            k2: vec![0.0; dimension],
            k3: vec![0.0; dimension],
            k4: vec![0.0; dimension],
            probe: vec![0.0; dimension],
        }
    }

    /// Advances `state` from `t` by `h` in place.
    ///
    /// `derivative(t, state, out)` writes the rate of change of `state` at `t`
    /// into `out`; its first error aborts the step with `state` untouched.
    pub fn step<F, E>(&mut self, t: f64, h: f64, state: &mut [f64], mut derivative: F) -> Result<(), E>
    where
        F: FnMut(f64, &[f64], &mut [f64]) -> Result<(), E>,
    {
        let half = 0.5 * h;

        derivative(t, state, &mut self.k1)?;

        axpy(&mut self.probe, state, half, &self.k1);
        derivative(t + half, &self.probe, &mut self.k2)?;

        axpy(&mut self.probe, state, half, &self.k2);
        derivative(t + half, &self.probe, &mut self.k3)?;

        axpy(&mut self.probe, state, h, &self.k3);
        derivative(t + h, &self.probe, &mut self.k4)?;

        let sixth = h / 6.0;
        for i in 0..state.len() {
            state[i] += sixth * (self.k1[i] + 2.0 * self.k2[i] + 2.0 * self.k3[i] + self.k4[i]);
        }
        Ok(())
    }
}

/// `out = base + scale * k`
#[inline(always)]
fn axpy(out: &mut [f64], base: &[f64], scale: f64, k: &[f64]) {
    for ((o, &b), &d) in out.iter_mut().zip(base).zip(k) {
        *o = b + scale * d;
    }
}
