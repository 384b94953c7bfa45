//! Operating conditions in plant units.

use rc_core::units::read::{to_g_per_l, to_gpm, to_kelvin, to_pa};
use rc_core::units::{Concentration, Pressure, Temperature, VolumeRate, g_per_l, gpm, k, pa, psig};
use rc_props::{NaClParams, PropsResult, StateValues};

/// Feed state as the plant reports it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedConditions {
    pub flow: VolumeRate,
    pub conc: Concentration,
    pub temperature: Temperature,
    pub pressure: Pressure,
}

impl FeedConditions {
    /// Flow [gal/min], concentration [g/L], temperature [K], pressure [Pa].
    pub fn plant(qin_gpm: f64, cin_g_per_l: f64, tin_k: f64, pin_pa: f64) -> Self {
        Self {
            flow: gpm(qin_gpm),
            conc: g_per_l(cin_g_per_l),
            temperature: k(tin_k),
            pressure: pa(pin_pa),
        }
    }

    /// Historical readings carry gauge pressure [psi].
    pub fn plant_gauge(qin_gpm: f64, cin_g_per_l: f64, tin_k: f64, pin_psig: f64) -> Self {
        Self {
            pressure: psig(pin_psig),
            ..Self::plant(qin_gpm, cin_g_per_l, tin_k, 0.0)
        }
    }

    pub fn with_flow(self, flow: VolumeRate) -> Self {
        Self { flow, ..self }
    }

    /// Mass-flow state of the feed.
    pub fn state(&self, params: &NaClParams) -> PropsResult<StateValues> {
        StateValues::from_flow_and_conc_with(params, self.flow, self.conc, self.temperature, self.pressure)
    }
}

impl std::fmt::Display for FeedConditions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.1} gpm, {:.3} g/L, {:.2} K, {:.0} Pa",
            to_gpm(self.flow),
            to_g_per_l(self.conc),
            to_kelvin(self.temperature),
            to_pa(self.pressure)
        )
    }
}
