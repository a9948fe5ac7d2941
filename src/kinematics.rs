//! Four-momentum and angular-distance helpers used by the producers.

use std::ops::Add;

/// Sentinel component value for "object absent" four-vectors and quantities.
pub const DEFAULT_FLOAT: f64 = -10.0;

/// PDG charged-kaon mass in GeV.
///
/// PF candidates are stored with the pion mass by default; kaon candidates get
/// this mass reassigned at four-vector construction time.
pub const KAON_MASS: f64 = 0.493677;

/// A four-momentum in (pt, eta, phi, mass) representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtEtaPhiM {
    /// Transverse momentum.
    pub pt: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Azimuthal angle.
    pub phi: f64,
    /// Invariant mass.
    pub mass: f64,
}

impl PtEtaPhiM {
    /// Create a four-momentum from its (pt, eta, phi, mass) components.
    pub fn new(pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        Self { pt, eta, phi, mass }
    }

    /// The dummy vector returned when an object index is out of range.
    ///
    /// Every component is [`DEFAULT_FLOAT`], so downstream quantity extraction
    /// propagates the sentinel instead of a physical value.
    pub fn dummy() -> Self {
        Self::new(DEFAULT_FLOAT, DEFAULT_FLOAT, DEFAULT_FLOAT, DEFAULT_FLOAT)
    }

    /// Whether this is the [`Self::dummy`] sentinel vector.
    pub fn is_dummy(&self) -> bool {
        *self == Self::dummy()
    }

    /// x component of the momentum.
    pub fn px(&self) -> f64 {
        self.pt * self.phi.cos()
    }

    /// y component of the momentum.
    pub fn py(&self) -> f64 {
        self.pt * self.phi.sin()
    }

    /// z component of the momentum.
    pub fn pz(&self) -> f64 {
        self.pt * self.eta.sinh()
    }

    /// Total energy, assuming the on-shell mass stored in `self.mass`.
    pub fn energy(&self) -> f64 {
        let p2 = self.px().powi(2) + self.py().powi(2) + self.pz().powi(2);
        (p2 + self.mass.powi(2)).sqrt()
    }

    /// Rebuild a four-momentum from cartesian components.
    ///
    /// The mass is `sqrt(E^2 - p^2)` clamped at zero so that rounding noise on
    /// massless systems cannot produce a NaN.
    pub fn from_cartesian(px: f64, py: f64, pz: f64, e: f64) -> Self {
        let pt = (px * px + py * py).sqrt();
        let phi = py.atan2(px);
        let eta = if pt > 0.0 || pz != 0.0 {
            (pz / pt).asinh()
        } else {
            0.0
        };
        let m2 = e * e - (px * px + py * py + pz * pz);
        Self::new(pt, eta, phi, m2.max(0.0).sqrt())
    }
}

impl Add for PtEtaPhiM {
    type Output = PtEtaPhiM;

    fn add(self, other: PtEtaPhiM) -> PtEtaPhiM {
        PtEtaPhiM::from_cartesian(
            self.px() + other.px(),
            self.py() + other.py(),
            self.pz() + other.pz(),
            self.energy() + other.energy(),
        )
    }
}

/// Angular distance in eta-phi space: `sqrt(d_eta^2 + d_phi^2)`.
///
/// The azimuthal difference is the plain subtraction; it is NOT wrapped into
/// (-pi, pi]. Objects on opposite sides of the phi = +-pi seam therefore get a
/// large distance even when they are physically close.
pub fn delta_r(eta1: f64, phi1: f64, eta2: f64, phi2: f64) -> f64 {
    let d_eta = eta1 - eta2;
    let d_phi = phi1 - phi2;
    (d_eta * d_eta + d_phi * d_phi).sqrt()
}

#[cfg(test)]
mod tests {
    use super::{delta_r, PtEtaPhiM, DEFAULT_FLOAT, KAON_MASS};

    #[test]
    fn delta_r_is_euclidean_in_eta_phi() {
        assert_eq!(delta_r(0.0, 0.0, 0.0, 0.0), 0.0);
        assert!((delta_r(0.0, 0.0, 3.0, 4.0) - 5.0).abs() < 1e-12);
        // Symmetric in its arguments.
        assert_eq!(delta_r(1.0, 2.0, 0.5, -0.5), delta_r(0.5, -0.5, 1.0, 2.0));
    }

    #[test]
    fn delta_r_does_not_wrap_phi() {
        let pi = std::f64::consts::PI;
        // Physically ~0.2 apart across the seam, but the unwrapped distance is ~2*pi.
        let d = delta_r(0.0, pi - 0.1, 0.0, -pi + 0.1);
        assert!(d > 6.0);
    }

    #[test]
    fn cartesian_round_trip_preserves_components() {
        let p = PtEtaPhiM::new(40.0, 1.2, 0.7, KAON_MASS);
        let q = PtEtaPhiM::from_cartesian(p.px(), p.py(), p.pz(), p.energy());
        assert!((q.pt - p.pt).abs() < 1e-9);
        assert!((q.eta - p.eta).abs() < 1e-9);
        assert!((q.phi - p.phi).abs() < 1e-9);
        assert!((q.mass - p.mass).abs() < 1e-6);
    }

    #[test]
    fn addition_of_back_to_back_momenta_is_at_rest() {
        let a = PtEtaPhiM::new(30.0, 0.0, 0.0, 0.0);
        let b = PtEtaPhiM::new(30.0, 0.0, std::f64::consts::PI, 0.0);
        let sum = a + b;
        assert!(sum.pt < 1e-9);
        // Invariant mass of two massless back-to-back particles is 2E.
        assert!((sum.mass - 60.0).abs() < 1e-9);
    }

    #[test]
    fn dummy_vector_is_all_sentinel() {
        let d = PtEtaPhiM::dummy();
        assert!(d.is_dummy());
        assert_eq!(d.pt, DEFAULT_FLOAT);
        assert_eq!(d.mass, DEFAULT_FLOAT);
        assert!(!PtEtaPhiM::new(1.0, 0.0, 0.0, 0.0).is_dummy());
    }
}
