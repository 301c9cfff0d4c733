// pn-core/src/units.rs

use uom::si::f64::{MassRate as UomMassRate, Ratio as UomRatio};

// Public canonical unit types (SI, f64)
pub type MassRate = UomMassRate;
pub type Ratio = UomRatio;

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

/// Mass flow in kg/s as a plain number.
#[inline]
pub fn as_kgps(v: MassRate) -> f64 {
    use uom::si::mass_rate::kilogram_per_second;
    v.get::<kilogram_per_second>()
}

/// Ratio as a plain fraction.
#[inline]
pub fn as_fraction(v: Ratio) -> f64 {
    use uom::si::ratio::ratio;
    v.get::<ratio>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let mdot = kgps(1.2);
        let r = unitless(0.5);
        assert_eq!(as_kgps(mdot), 1.2);
        assert_eq!(as_fraction(r), 0.5);
    }

    #[test]
    fn ratio_scales_mass_rate() {
        let share = kgps(2.0) * as_fraction(unitless(0.25));
        assert!((as_kgps(share) - 0.5).abs() < 1e-12);
    }
}
