//! Per-cell flow dynamics.
//!
//! A heading cell drives the velocity toward a compass target with the
//! linear feedback law `v' = A (v - v_d)`; goal and forbidden cells freeze
//! every variable.

use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_4;

use navgen_core::{Expression, ExpressionInterval, ExpressionParser, Interval};

use crate::error::GeneratorResult;
use crate::params::{GridParameters, VelocitySelector};

/// Horizontal position.
pub const X: &str = "x";
/// Vertical position.
pub const Y: &str = "y";
/// Horizontal velocity.
pub const XVEL: &str = "xvel";
/// Vertical velocity.
pub const YVEL: &str = "yvel";

/// Continuous state variables in declaration order.
pub const STATE_VARIABLES: [&str; 4] = [X, Y, XVEL, YVEL];

/// Desired velocity `(sin(n*pi/4), cos(n*pi/4))` for heading `n`.
///
/// Heading 0 points up (+y), 2 right (+x), 4 down, 6 left; 8 wraps to up.
pub fn target_velocity(heading: u8) -> (f64, f64) {
    let angle = f64::from(heading) * FRAC_PI_4;
    (angle.sin(), angle.cos())
}

/// Formula text for `xvel'` and `yvel'` under the feedback law.
pub fn velocity_formulas(params: &GridParameters, heading: u8) -> [String; 2] {
    let (tx, ty) = target_velocity(heading);
    let row = |r: usize| {
        let [a, b] = params.matrix().row(r);
        format!("{} * ({} - {}) + {} * ({} - {})", a, XVEL, tx, b, YVEL, ty)
    };
    [row(0), row(1)]
}

/// Build the flow map of one cell.
pub fn assign_derivatives<P: ExpressionParser>(
    selector: VelocitySelector,
    params: &GridParameters,
    parser: &P,
) -> GeneratorResult<BTreeMap<String, ExpressionInterval>> {
    let mut flows = BTreeMap::new();

    let Some(heading) = selector.heading() else {
        for var in STATE_VARIABLES {
            flows.insert(var.to_string(), ExpressionInterval::new(Expression::constant(0.0)));
        }
        return Ok(flows);
    };

    flows.insert(X.to_string(), ExpressionInterval::new(Expression::var(XVEL)));
    flows.insert(Y.to_string(), ExpressionInterval::new(Expression::var(YVEL)));

    let uncertainty = if params.noise() > 0.0 {
        Some(Interval::symmetric(params.noise())?)
    } else {
        None
    };

    let [xvel_text, yvel_text] = velocity_formulas(params, heading);
    let xvel_der = parser.parse_value(&xvel_text)?;
    let yvel_der = parser.parse_value(&yvel_text)?;

    flows.insert(
        XVEL.to_string(),
        ExpressionInterval::with_interval(xvel_der, uncertainty),
    );
    flows.insert(
        YVEL.to_string(),
        ExpressionInterval::with_interval(yvel_der, uncertainty),
    );

    Ok(flows)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use navgen_core::{InfixParser, Operator};

    use super::*;
    use crate::config::NavigationConfig;

    fn params(matrix: [f64; 4], noise: f64) -> GridParameters {
        GridParameters::validate(&NavigationConfig::new(matrix, &["0"], 1).with_noise(noise))
            .unwrap()
    }

    #[test]
    fn test_target_velocity_compass() {
        let close = |a: (f64, f64), b: (f64, f64)| {
            (a.0 - b.0).abs() < 1e-12 && (a.1 - b.1).abs() < 1e-12
        };
        let h = std::f64::consts::FRAC_1_SQRT_2;
        assert!(close(target_velocity(0), (0.0, 1.0)));
        assert!(close(target_velocity(1), (h, h)));
        assert!(close(target_velocity(2), (1.0, 0.0)));
        assert!(close(target_velocity(4), (0.0, -1.0)));
        assert!(close(target_velocity(6), (-1.0, 0.0)));
        assert!(close(target_velocity(8), (0.0, 1.0)));
    }

    #[test]
    fn test_static_cells_are_zero() {
        let p = params([-1.0, 0.0, 0.0, -1.0], 0.5);
        for selector in [VelocitySelector::Goal, VelocitySelector::Forbidden] {
            let flows = assign_derivatives(selector, &p, &InfixParser).unwrap();
            assert_eq!(flows.len(), 4);
            assert!(flows.values().all(|f| f.is_zero()));
        }
    }

    #[test]
    fn test_heading_dynamics_structure() {
        let p = params([-1.2, 0.1, 0.2, -0.8], 0.0);
        let flows = assign_derivatives(VelocitySelector::Heading(2), &p, &InfixParser).unwrap();

        assert_eq!(flows[X].expression, Expression::var(XVEL));
        assert_eq!(flows[Y].expression, Expression::var(YVEL));

        let (tx, ty) = target_velocity(2);
        let law = |a: f64, b: f64| {
            Expression::binary(
                Operator::Add,
                Expression::binary(
                    Operator::Multiply,
                    Expression::constant(a),
                    Expression::binary(Operator::Subtract, Expression::var(XVEL), Expression::constant(tx)),
                ),
                Expression::binary(
                    Operator::Multiply,
                    Expression::constant(b),
                    Expression::binary(Operator::Subtract, Expression::var(YVEL), Expression::constant(ty)),
                ),
            )
        };
        assert_eq!(flows[XVEL].expression, law(-1.2, 0.1));
        assert_eq!(flows[YVEL].expression, law(0.2, -0.8));
        assert_eq!(flows[XVEL].interval, None);
    }

    #[test]
    fn test_heading_dynamics_values() {
        let p = params([-0.8, -0.2, -0.1, -0.8], 0.0);
        for heading in 0..=8 {
            let flows =
                assign_derivatives(VelocitySelector::Heading(heading), &p, &InfixParser).unwrap();
            let (tx, ty) = target_velocity(heading);
            let env: HashMap<String, f64> =
                [("xvel".to_string(), 0.3), ("yvel".to_string(), -0.4)].into();

            let xd = flows[XVEL].expression.evaluate(&env).unwrap().as_real().unwrap();
            let yd = flows[YVEL].expression.evaluate(&env).unwrap().as_real().unwrap();
            assert!((xd - (-0.8 * (0.3 - tx) + -0.2 * (-0.4 - ty))).abs() < 1e-12);
            assert!((yd - (-0.1 * (0.3 - tx) + -0.8 * (-0.4 - ty))).abs() < 1e-12);
        }
    }

    #[test]
    fn test_noise_interval() {
        let p = params([-1.0, 0.0, 0.0, -1.0], 0.25);
        let flows = assign_derivatives(VelocitySelector::Heading(5), &p, &InfixParser).unwrap();
        let expected = Some(Interval::new(-0.25, 0.25).unwrap());
        assert_eq!(flows[XVEL].interval, expected);
        assert_eq!(flows[YVEL].interval, expected);
        assert_eq!(flows[X].interval, None);
        assert_eq!(flows[Y].interval, None);
    }
}
