//! Cubic Bézier timing curves and the solver that inverts them.
//!
//! The curve is anchored at (0,0) and (1,1); `p1`/`p2` are the inner control
//! points. Solving maps a linear time fraction `x` to an eased progress `y`
//! by finding the curve parameter `t` with `sample_curve_x(t) == x`.

use serde::{Deserialize, Serialize};

/// Inner control point of a timing curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub x: f64,
    pub y: f64,
}

impl ControlPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Serializable description of an easing curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimingCurve {
    pub p1: ControlPoint,
    pub p2: ControlPoint,
}

impl TimingCurve {
    pub const LINEAR: TimingCurve = TimingCurve::new(0.0, 0.0, 1.0, 1.0);
    pub const EASE_IN: TimingCurve = TimingCurve::new(0.42, 0.0, 1.0, 1.0);
    pub const EASE_OUT: TimingCurve = TimingCurve::new(0.0, 0.0, 0.58, 1.0);
    pub const EASE_IN_OUT: TimingCurve = TimingCurve::new(0.42, 0.0, 0.58, 1.0);

    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            p1: ControlPoint::new(x1, y1),
            p2: ControlPoint::new(x2, y2),
        }
    }

    pub fn solver(&self) -> UnitBezier {
        UnitBezier::new(self.p1, self.p2)
    }
}

impl Default for TimingCurve {
    fn default() -> Self {
        Self::EASE_IN_OUT
    }
}

/// Polynomial form of a timing curve, ready for repeated solving.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitBezier {
    ax: f64,
    bx: f64,
    cx: f64,
    ay: f64,
    by: f64,
    cy: f64,
}

const NEWTON_ITERATIONS: usize = 8;
const MIN_DERIVATIVE: f64 = 1e-6;

impl UnitBezier {
    pub fn new(p1: ControlPoint, p2: ControlPoint) -> Self {
        let cx = 3.0 * p1.x;
        let bx = 3.0 * (p2.x - p1.x) - cx;
        let ax = 1.0 - cx - bx;
        let cy = 3.0 * p1.y;
        let by = 3.0 * (p2.y - p1.y) - cy;
        let ay = 1.0 - cy - by;
        Self {
            ax,
            bx,
            cx,
            ay,
            by,
            cy,
        }
    }

    #[inline]
    pub fn sample_curve_x(&self, t: f64) -> f64 {
        ((self.ax * t + self.bx) * t + self.cx) * t
    }

    #[inline]
    pub fn sample_curve_y(&self, t: f64) -> f64 {
        ((self.ay * t + self.by) * t + self.cy) * t
    }

    #[inline]
    pub fn sample_curve_derivative_x(&self, t: f64) -> f64 {
        (3.0 * self.ax * t + 2.0 * self.bx) * t + self.cx
    }

    /// The x and y polynomials coincide, so the curve is the identity.
    #[inline]
    fn is_identity(&self) -> bool {
        self.ax == self.ay && self.bx == self.by && self.cx == self.cy
    }

    /// Curve parameter `t` with `sample_curve_x(t)` within `epsilon` of `x`.
    pub fn solve_curve_x(&self, x: f64, epsilon: f64) -> f64 {
        // Newton first; it converges in a handful of steps on well-formed curves.
        let mut t = x;
        for _ in 0..NEWTON_ITERATIONS {
            let x2 = self.sample_curve_x(t) - x;
            if x2.abs() < epsilon {
                return t;
            }
            let d2 = self.sample_curve_derivative_x(t);
            if d2.abs() < MIN_DERIVATIVE {
                break;
            }
            t -= x2 / d2;
        }

        let mut lo = 0.0;
        let mut hi = 1.0;
        t = x;
        if t < lo {
            return lo;
        }
        if t > hi {
            return hi;
        }
        while lo < hi {
            let x2 = self.sample_curve_x(t);
            if (x2 - x).abs() < epsilon {
                return t;
            }
            if x > x2 {
                lo = t;
            } else {
                hi = t;
            }
            let mid = (hi - lo) * 0.5 + lo;
            if mid == t {
                break;
            }
            t = mid;
        }
        t
    }

    /// Eased progress for the linear fraction `x`.
    pub fn solve(&self, x: f64, epsilon: f64) -> f64 {
        if self.is_identity() {
            return x;
        }
        self.sample_curve_y(self.solve_curve_x(x, epsilon))
    }
}

impl From<TimingCurve> for UnitBezier {
    fn from(curve: TimingCurve) -> Self {
        curve.solver()
    }
}
