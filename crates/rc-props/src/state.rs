use rc_core::units::read::{to_g_per_l, to_kelvin, to_m3ps, to_pa};
use rc_core::units::{Concentration, Pressure, Temperature, VolumeRate, g_per_l, m3ps};

use crate::error::{PropsError, PropsResult};
use crate::nacl::NaClParams;

/// Plain SI values of one port state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateValues {
    /// [kg/s]
    pub flow_mass_h2o: f64,
    /// [kg/s]
    pub flow_mass_nacl: f64,
    /// [K]
    pub temperature: f64,
    /// [Pa]
    pub pressure: f64,
}

impl StateValues {
    /// Mass flows from a volumetric flow and mass concentration.
    pub fn from_flow_and_conc(
        flow: VolumeRate,
        conc: Concentration,
        temperature: Temperature,
        pressure: Pressure,
    ) -> PropsResult<Self> {
        Self::from_flow_and_conc_with(&NaClParams::default(), flow, conc, temperature, pressure)
    }

    pub fn from_flow_and_conc_with(
        params: &NaClParams,
        flow: VolumeRate,
        conc: Concentration,
        temperature: Temperature,
        pressure: Pressure,
    ) -> PropsResult<Self> {
        let q = non_negative("flow_vol", to_m3ps(flow))?;
        let c = non_negative("conc_mass", to_g_per_l(conc))?;
        let t = positive("temperature", to_kelvin(temperature))?;
        let p = positive("pressure", to_pa(pressure))?;
        let (m_h2o, m_nacl) = params.mass_flows(q, c);
        Ok(Self {
            flow_mass_h2o: m_h2o,
            flow_mass_nacl: m_nacl,
            temperature: t,
            pressure: p,
        })
    }

    pub fn flow_vol(&self, params: &NaClParams) -> VolumeRate {
        m3ps(params.flow_vol(self.flow_mass_h2o, self.flow_mass_nacl))
    }

    pub fn conc_mass(&self, params: &NaClParams) -> Concentration {
        g_per_l(params.conc_mass(self.flow_mass_h2o, self.flow_mass_nacl))
    }

    pub fn as_array(&self) -> [f64; 4] {
        [
            self.flow_mass_h2o,
            self.flow_mass_nacl,
            self.temperature,
            self.pressure,
        ]
    }
}

fn non_negative(what: &'static str, value: f64) -> PropsResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(PropsError::NonPhysical { what, value })
    }
}

fn positive(what: &'static str, value: f64) -> PropsResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PropsError::NonPhysical { what, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_core::units::read::to_gpm;
    use rc_core::units::{gpm, k, pa};

    #[test]
    fn plant_units_round_trip() {
        let s = StateValues::from_flow_and_conc(gpm(2637.0), g_per_l(0.5), k(298.0), pa(101_325.0))
            .unwrap();
        let params = NaClParams::default();
        assert!((to_gpm(s.flow_vol(&params)) - 2637.0).abs() < 1e-9);
        assert!((to_g_per_l(s.conc_mass(&params)) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn negative_flow_is_rejected() {
        let err = StateValues::from_flow_and_conc(gpm(-1.0), g_per_l(0.5), k(298.0), pa(101_325.0))
            .unwrap_err();
        assert!(matches!(err, PropsError::NonPhysical { what: "flow_vol", .. }));
    }
}
