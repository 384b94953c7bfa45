// rc-core/src/units.rs

use uom::si::f64::{
    Area as UomArea, Length as UomLength, MassDensity as UomMassDensity,
    MassRate as UomMassRate, Power as UomPower, Pressure as UomPressure, Ratio as UomRatio,
    ThermodynamicTemperature as UomThermodynamicTemperature, VolumeRate as UomVolumeRate,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Length = UomLength;
pub type Density = UomMassDensity;
/// Mass concentration of solute; 1 g/L is 1 kg/m³.
pub type Concentration = UomMassDensity;
pub type MassRate = UomMassRate;
pub type Power = UomPower;
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type Temperature = UomThermodynamicTemperature;
pub type VolumeRate = UomVolumeRate;

const MINUTES_PER_DAY: f64 = 1_440.0;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

/// Absolute pressure from a psia reading.
#[inline]
pub fn psi(v: f64) -> Pressure {
    use uom::si::pressure::pound_force_per_square_inch;
    Pressure::new::<pound_force_per_square_inch>(v)
}

/// Absolute pressure from a psig reading.
#[inline]
pub fn psig(v: f64) -> Pressure {
    psi(v) + pa(constants::ATM_PA)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn m3ps(v: f64) -> VolumeRate {
    use uom::si::volume_rate::cubic_meter_per_second;
    VolumeRate::new::<cubic_meter_per_second>(v)
}

/// US gallons per minute.
#[inline]
pub fn gpm(v: f64) -> VolumeRate {
    m3ps(v * constants::M3_PER_GALLON / 60.0)
}

/// Million US gallons per day.
#[inline]
pub fn mgd(v: f64) -> VolumeRate {
    gpm(v * 1.0e6 / MINUTES_PER_DAY)
}

#[inline]
pub fn g_per_l(v: f64) -> Concentration {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Concentration::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn watts(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn kw(v: f64) -> Power {
    use uom::si::power::kilowatt;
    Power::new::<kilowatt>(v)
}

#[inline]
pub fn m2(v: f64) -> Area {
    use uom::si::area::square_meter;
    Area::new::<square_meter>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

/// Readers back into plant units.
pub mod read {
    use super::*;

    pub fn to_pa(p: Pressure) -> f64 {
        p.get::<uom::si::pressure::pascal>()
    }

    pub fn to_psi(p: Pressure) -> f64 {
        p.get::<uom::si::pressure::pound_force_per_square_inch>()
    }

    pub fn to_m3ps(q: VolumeRate) -> f64 {
        q.get::<uom::si::volume_rate::cubic_meter_per_second>()
    }

    pub fn to_gpm(q: VolumeRate) -> f64 {
        to_m3ps(q) * 60.0 / constants::M3_PER_GALLON
    }

    pub fn to_mgd(q: VolumeRate) -> f64 {
        to_gpm(q) * MINUTES_PER_DAY / 1.0e6
    }

    pub fn to_g_per_l(c: Concentration) -> f64 {
        c.get::<uom::si::mass_density::kilogram_per_cubic_meter>()
    }

    pub fn to_kelvin(t: Temperature) -> f64 {
        t.get::<uom::si::thermodynamic_temperature::kelvin>()
    }

    pub fn to_watts(p: Power) -> f64 {
        p.get::<uom::si::power::watt>()
    }

    pub fn to_kw(p: Power) -> f64 {
        p.get::<uom::si::power::kilowatt>()
    }

    pub fn to_kgps(m: MassRate) -> f64 {
        m.get::<uom::si::mass_rate::kilogram_per_second>()
    }

    pub fn to_m2(a: Area) -> f64 {
        a.get::<uom::si::area::square_meter>()
    }
}

pub mod constants {
    pub const G0_MPS2: f64 = 9.806_65;
    pub const ATM_PA: f64 = 101_325.0;
    /// Julian year.
    pub const SECONDS_PER_YEAR: f64 = 31_557_600.0;
    pub const HOURS_PER_YEAR: f64 = 8_766.0;
    pub const M3_PER_GALLON: f64 = 3.785_411_784e-3;
}
