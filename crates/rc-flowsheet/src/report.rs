//! Fixed-width console reports.

use std::collections::BTreeMap;
use std::fmt;

use rc_core::units::read::{to_g_per_l, to_gpm, to_kw, to_m3ps, to_mgd, to_psi};
use rc_core::units::{Concentration, Power, Pressure, VolumeRate};

use crate::flowsheet::{Flowsheet, Stage};

pub const COLUMN_WIDTH: usize = 40;

/// Parameter / value / units table under a centred title.
#[derive(Debug, Clone, Default)]
pub struct Report {
    title: String,
    rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub parameter: String,
    pub value: String,
    pub units: String,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    pub fn row(
        &mut self,
        parameter: impl Into<String>,
        value: impl Into<String>,
        units: impl Into<String>,
    ) -> &mut Self {
        self.rows.push(Row {
            parameter: parameter.into(),
            value: value.into(),
            units: units.into(),
        });
        self
    }

    /// Flow in MGD, m³/s and gpm.
    pub fn flow(&mut self, label: &str, q: VolumeRate) -> &mut Self {
        self.row(format!("{label} (MGD)"), format!("{:.3}", to_mgd(q)), "MGD");
        self.row(format!("{label} (m3/s)"), format!("{:.3e}", to_m3ps(q)), "m3/s");
        self.row(format!("{label} (gpm)"), format!("{:.3}", to_gpm(q)), "gpm")
    }

    pub fn power(&mut self, label: &str, p: Power) -> &mut Self {
        self.row(format!("{label} (kW)"), format!("{:.3}", to_kw(p)), "kW")
    }

    pub fn conc(&mut self, label: &str, c: Concentration) -> &mut Self {
        self.row(format!("{label} (g/L)"), format!("{:.4}", to_g_per_l(c)), "g/L")
    }

    pub fn pressure(&mut self, label: &str, p: Pressure) -> &mut Self {
        self.row(format!("{label} (psi)"), format!("{:.2}", to_psi(p)), "psi")
    }

    pub fn costing(&mut self, summary: &CostingSummary) -> &mut Self {
        self.row("Total capital cost", format!("{:.2}", summary.total_capital_cost), "$");
        self.row(
            "Total operating cost",
            format!("{:.2}", summary.total_operating_cost),
            "$/yr",
        );
        for (flow, cost) in &summary.flows {
            self.row(format!("Annual {flow} cost"), format!("{cost:.2}"), "$/yr");
        }
        if let Some(lcow) = summary.lcow {
            self.row("LCOW", format!("{lcow:.4}"), "$/m3");
        }
        self
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = COLUMN_WIDTH;
        let side = (3 * w).saturating_sub(self.title.len() + 2) / 2;
        writeln!(f, "{bar} {} {bar}", self.title, bar = "=".repeat(side))?;
        writeln!(f)?;
        writeln!(f, "{:<w$}{:<w$}{}", "Parameter", "Value", "Units")?;
        writeln!(f, "{}", "-".repeat(3 * w))?;
        for row in &self.rows {
            writeln!(f, "{:<w$}{:<w$}{}", row.parameter, row.value, row.units)?;
        }
        Ok(())
    }
}

/// Evaluated costing totals of a flowsheet.
#[derive(Debug, Clone, PartialEq)]
pub struct CostingSummary {
    pub total_capital_cost: f64,
    /// [$/yr]
    pub total_operating_cost: f64,
    /// Annual cost per registered flow [$/yr]
    pub flows: BTreeMap<String, f64>,
    /// [$/m³]
    pub lcow: Option<f64>,
}

impl CostingSummary {
    /// `None` until the flowsheet's ledger has been finalized.
    pub fn from_flowsheet<S: Stage>(fs: &Flowsheet<S>) -> Option<Self> {
        let ledger = fs.costing()?;
        let totals = ledger.totals()?;
        Some(Self {
            total_capital_cost: fs.value(totals.total_capital_cost),
            total_operating_cost: fs.value(totals.total_operating_cost),
            flows: totals
                .flows
                .iter()
                .map(|(name, t)| (name.clone(), fs.value(t.annual_cost)))
                .collect(),
            lcow: ledger.lcow().map(|v| fs.value(v)),
        })
    }
}
