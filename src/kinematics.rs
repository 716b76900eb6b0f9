use std::f64::consts::PI;

/// Anything with a direction in the (η, φ) plane and a transverse momentum.
pub trait Momentum {
    fn pt(&self) -> f64;
    fn eta(&self) -> f64;
    fn phi(&self) -> f64;
}

/// Azimuthal difference folded into `[-π, π]`.
///
/// Arguments
/// ---------
/// * `phi1`, `phi2`: azimuthal angles in radians, any range
///
/// Return
/// ------
/// * `phi1 - phi2` wrapped into `[-π, π]`
pub fn delta_phi(phi1: f64, phi2: f64) -> f64 {
    let mut dphi = (phi1 - phi2) % (2. * PI);
    if dphi > PI {
        dphi -= 2. * PI;
    } else if dphi < -PI {
        dphi += 2. * PI;
    }
    dphi
}

/// Squared angular separation ΔR² = Δη² + Δφ².
pub fn delta_r2<A: Momentum + ?Sized, B: Momentum + ?Sized>(a: &A, b: &B) -> f64 {
    let deta = a.eta() - b.eta();
    let dphi = delta_phi(a.phi(), b.phi());
    deta * deta + dphi * dphi
}

#[cfg(test)]
mod test_kinematics {
    use super::*;
    use approx::assert_relative_eq;

    struct Dir(f64, f64);

    impl Momentum for Dir {
        fn pt(&self) -> f64 {
            1.
        }
        fn eta(&self) -> f64 {
            self.0
        }
        fn phi(&self) -> f64 {
            self.1
        }
    }

    #[test]
    fn test_delta_phi_wraps() {
        assert_relative_eq!(delta_phi(0.5, 0.2), 0.3, epsilon = 1e-12);
        assert_relative_eq!(delta_phi(PI - 0.1, -PI + 0.1), -0.2, epsilon = 1e-12);
        assert_relative_eq!(delta_phi(-PI + 0.1, PI - 0.1), 0.2, epsilon = 1e-12);
        assert_relative_eq!(delta_phi(4. * PI + 0.3, 0.), 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_delta_r2() {
        let a = Dir(1.0, 0.1);
        let b = Dir(1.3, 0.5);
        assert_relative_eq!(delta_r2(&a, &b), 0.25, epsilon = 1e-12);

        let c = Dir(0.0, PI - 0.05);
        let d = Dir(0.0, -PI + 0.05);
        assert_relative_eq!(delta_r2(&c, &d), 0.01, epsilon = 1e-12);
    }
}
