//! Correlations for dilute NaCl solutions.
//!
//! Mass flows are in kg/s, concentrations in kg/m³, pressures in Pa.

/// Fixed parameters of the NaCl–water package.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NaClParams {
    /// Density of pure water in the linear correlation [kg/m³]
    pub dens_water: f64,
    /// Density slope with NaCl mass fraction [kg/m³]
    pub dens_slope: f64,
    /// NaCl molar mass [kg/mol]
    pub mw_nacl: f64,
    /// Osmotic coefficient
    pub osm_coeff: f64,
    /// Van 't Hoff factor
    pub ions: f64,
    /// Universal gas constant [J/(mol·K)]
    pub gas_constant: f64,
    /// Reference water density used by membrane flux [kg/m³]
    pub dens_solvent: f64,
}

impl Default for NaClParams {
    fn default() -> Self {
        Self {
            dens_water: 995.0,
            dens_slope: 756.0,
            mw_nacl: 58.44e-3,
            osm_coeff: 0.93,
            ions: 2.0,
            gas_constant: 8.314_462_618,
            dens_solvent: 1000.0,
        }
    }
}

impl NaClParams {
    pub fn mass_frac(&self, m_h2o: f64, m_nacl: f64) -> f64 {
        m_nacl / (m_h2o + m_nacl)
    }

    pub fn dens_mass(&self, mass_frac: f64) -> f64 {
        self.dens_water + self.dens_slope * mass_frac
    }

    pub fn flow_vol(&self, m_h2o: f64, m_nacl: f64) -> f64 {
        let w = self.mass_frac(m_h2o, m_nacl);
        (m_h2o + m_nacl) / self.dens_mass(w)
    }

    pub fn conc_mass(&self, m_h2o: f64, m_nacl: f64) -> f64 {
        let w = self.mass_frac(m_h2o, m_nacl);
        w * self.dens_mass(w)
    }

    pub fn pressure_osm(&self, conc_mass: f64, temperature: f64) -> f64 {
        self.osm_coeff * self.ions * conc_mass / self.mw_nacl * self.gas_constant * temperature
    }

    /// Mass fraction giving a mass concentration, inverting `w·ρ(w) = C`.
    pub fn mass_frac_from_conc(&self, conc_mass: f64) -> f64 {
        let a = self.dens_slope;
        let b = self.dens_water;
        2.0 * conc_mass / (b + (b * b + 4.0 * a * conc_mass).sqrt())
    }

    /// Component mass flows for a volumetric flow and mass concentration.
    pub fn mass_flows(&self, flow_vol: f64, conc_mass: f64) -> (f64, f64) {
        let w = self.mass_frac_from_conc(conc_mass);
        let total = flow_vol * self.dens_mass(w);
        let m_nacl = w * total;
        (total - m_nacl, m_nacl)
    }
}
