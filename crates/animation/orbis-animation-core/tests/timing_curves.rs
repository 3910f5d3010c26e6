use orbis_animation_core::interp::{interpolate_direction, interpolate_longitude};
use orbis_animation_core::TimingCurve;

#[test]
fn linear_curve_is_identity() {
    let s = TimingCurve::LINEAR.solver();
    for i in 0..=256 {
        let x = i as f64 / 256.0;
        assert_eq!(s.solve(x, 1e-6), x);
    }
}

#[test]
fn solved_parameter_reproduces_x() {
    let curves = [
        TimingCurve::EASE_IN,
        TimingCurve::EASE_OUT,
        TimingCurve::EASE_IN_OUT,
        TimingCurve::new(0.25, 0.1, 0.25, 1.0),
        TimingCurve::new(0.68, -0.55, 0.265, 1.55),
    ];
    for curve in curves {
        let s = curve.solver();
        for i in 0..=200 {
            let x = i as f64 / 200.0;
            let t = s.solve_curve_x(x, 1e-6);
            assert!((s.sample_curve_x(t) - x).abs() < 1e-6, "{curve:?} x={x}");
        }
    }
}

#[test]
fn eased_output_is_monotonic_for_standard_presets() {
    for curve in [TimingCurve::EASE_IN, TimingCurve::EASE_OUT, TimingCurve::EASE_IN_OUT] {
        let s = curve.solver();
        let mut last = 0.0;
        for i in 0..=100 {
            let y = s.solve(i as f64 / 100.0, 1e-6);
            assert!(y >= last - 1e-9);
            last = y;
        }
    }
}

#[test]
fn heading_and_longitude_wrap() {
    for i in 1..50 {
        let t = i as f64 / 50.0;
        let b = interpolate_direction(350.0, 10.0, t);
        assert!((350.0..360.0).contains(&b) || (0.0..10.0).contains(&b));
        let lon = interpolate_longitude(179.0, -179.0, t);
        assert!(lon >= 179.0 || lon <= -179.0);
    }
}
