//! Membrane permeabilities backed out of historical plant readings.
//!
//! The primary RO logger (`WRD_Data_PRO1.csv`) carries stages 1 and 2; the
//! tertiary logger (`WRD_Data_TSRO1.csv`) carries stage 3. Conductivities
//! are converted to salinity, each row is turned into a [`StageReading`]
//! and inverted independently.

use std::path::Path;

use rc_flowsheet::Driver;
use rc_flowsheet::recipes::ro_module::{self, StageReading};
use rc_project::{InputDocument, MembraneDef};
use rc_solver::Solver;
use serde::Serialize;

use crate::data::{DATETIME, Table, in_month};
use crate::error::{BatchError, BatchResult};

/// Salinity per unit conductivity [(g/L)/(µS/cm)].
pub const CONDUCTIVITY_TO_SALINITY: f64 = 0.0005;

pub mod columns {
    pub const FEED_COND_1: &str = "stage 1 feed conductivity (us/cm)";
    pub const PERM_COND_1: &str = "stage 1 permeate conductivity (us/cm)";
    pub const PERM_FLOW_1: &str = "stage 1 permeate flowrate (gpm)";
    pub const CONC_FLOW_1: &str = "stage 1 concentrate flowrate (gpm)";
    pub const FEED_PRES_1: &str = "stage 1 feed pressure (psi)";
    pub const CONC_PRES_1: &str = "stage 1 concentrate pressure (psi)";
    pub const PERM_COND_2: &str = "stage 2 permeate conductivity (us/cm)";
    pub const PERM_FLOW_2: &str = "stage 2 permeate flowrate (gpm)";
    pub const CONC_FLOW_2: &str = "stage 2 concentrate flowrate (gpm)";
    pub const FEED_PRES_2: &str = "stage 2 feed pressure (psi)";
    pub const CONC_PRES_2: &str = "stage 2 concentrate pressure (psi)";
    pub const PERM_COND_3: &str = "stage 3 permeate conductivity (us/cm)";
    pub const CONC_COND_3: &str = "stage 3 concentrate conductivity (us/cm)";
    pub const PERM_FLOW_3: &str = "stage 3 permeate flowrate (gpm)";
    pub const CONC_FLOW_3: &str = "stage 3 concentrate flowrate (gpm)";
    pub const FEED_PRES_3: &str = "stage 3 feed pressure (psi)";
    pub const CONC_PRES_3: &str = "stage 3 concentrate pressure (psi)";

    pub const FEED_SAL_1: &str = "stage 1 feed salinity (g/L)";
    pub const PERM_SAL_1: &str = "stage 1 permeate salinity (g/L)";
    pub const FEED_SAL_2: &str = "stage 2 feed salinity (g/L)";
    pub const PERM_SAL_2: &str = "stage 2 permeate salinity (g/L)";
    pub const PERM_SAL_3: &str = "stage 3 permeate salinity (g/L)";
    pub const CONC_SAL_3: &str = "stage 3 concentrate salinity (g/L)";
}

use columns::*;

/// Which rows are representative of steady operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowFilter {
    pub month: u32,
    pub year: i32,
    /// [gpm]
    pub min_permeate_flow: f64,
    /// [psig]
    pub min_feed_pressure: Option<f64>,
}

impl RowFilter {
    /// August 2021, stage 1 permeate at or above 1000 gpm.
    pub fn primary() -> Self {
        Self {
            month: 8,
            year: 2021,
            min_permeate_flow: 1000.0,
            min_feed_pressure: None,
        }
    }

    /// August 2021, permeate at or above 120 gpm and feed at or above 50 psig.
    pub fn tertiary() -> Self {
        Self {
            month: 8,
            year: 2021,
            min_permeate_flow: 120.0,
            min_feed_pressure: Some(50.0),
        }
    }

    fn keep(&self, timestamp: &str, permeate_flow: Option<f64>, feed_pressure: Option<f64>) -> bool {
        if !in_month(timestamp, self.month, self.year) {
            return false;
        }
        let flow_ok = permeate_flow.is_some_and(|q| q >= self.min_permeate_flow);
        let pressure_ok = match self.min_feed_pressure {
            Some(min) => feed_pressure.is_some_and(|p| p >= min),
            None => true,
        };
        flow_ok && pressure_ok
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropsRow {
    #[serde(rename = "DateTime")]
    pub timestamp: String,
    #[serde(rename = "A")]
    pub a_comp: f64,
    #[serde(rename = "B")]
    pub b_comp: f64,
}

/// Inverted properties of one stage, one row per usable reading.
#[derive(Debug, Clone, PartialEq)]
pub struct StageProps {
    pub stage: usize,
    pub rows: Vec<PropsRow>,
    /// Readings whose inversion did not converge
    pub failed: usize,
}

impl StageProps {
    /// Mean A and B; `None` without rows.
    pub fn average(&self) -> Option<(f64, f64)> {
        if self.rows.is_empty() {
            return None;
        }
        let n = self.rows.len() as f64;
        let a = self.rows.iter().map(|r| r.a_comp).sum::<f64>() / n;
        let b = self.rows.iter().map(|r| r.b_comp).sum::<f64>() / n;
        Some((a, b))
    }

    pub fn file_name(&self) -> String {
        format!("stage{}_membrane_props.csv", self.stage)
    }
}

/// Rows that survived cleaning, and how many rows passing the filter were
/// rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct Readings<T> {
    pub rows: Vec<T>,
    pub rejected: usize,
}

fn salinity(table: &Table, conductivity: &str) -> BatchResult<Vec<Option<f64>>> {
    Ok(table
        .column(conductivity)?
        .iter()
        .map(|c| c.map(|v| v * CONDUCTIVITY_TO_SALINITY))
        .collect())
}

fn required(table: &Table, row: usize, names: &[&str]) -> BatchResult<Option<Vec<f64>>> {
    let values = names
        .iter()
        .map(|name| table.value(row, name))
        .collect::<BatchResult<Vec<_>>>()?;
    Ok(values.into_iter().collect())
}

fn restrict(table: &Table, filter: &RowFilter, permeate_flow: &str, feed_pressure: &str) -> BatchResult<Table> {
    let flows = table.column(permeate_flow)?;
    let pressures = table.column(feed_pressure)?;
    let kept = table.filter(|r| filter.keep(&table.timestamps()[r], flows[r], pressures[r]));
    tracing::info!(read = table.len(), kept = kept.len(), "filtered plant readings");
    Ok(kept)
}

/// Stage 1 and stage 2 readings from the primary logger.
///
/// Stage 1 feed flow is permeate plus concentrate. Stage 2 is fed by the
/// stage 1 concentrate, whose salinity follows from the stage 1 salt balance.
///
/// Rows with a non-positive stage 1 concentrate flow have no stage 2 feed
/// and are rejected.
pub fn primary_readings(
    table: &Table,
    filter: &RowFilter,
) -> BatchResult<Readings<(String, StageReading, StageReading)>> {
    let mut data = restrict(table, filter, PERM_FLOW_1, FEED_PRES_1)?;
    data.set_column(FEED_SAL_1, salinity(&data, FEED_COND_1)?)?;
    data.set_column(PERM_SAL_1, salinity(&data, PERM_COND_1)?)?;
    data.set_column(PERM_SAL_2, salinity(&data, PERM_COND_2)?)?;

    let mut feed_sal_2 = Vec::with_capacity(data.len());
    for row in 0..data.len() {
        let v = required(&data, row, &[FEED_SAL_1, PERM_SAL_1, PERM_FLOW_1, CONC_FLOW_1])?.and_then(|v| {
            let (cf, cp, qp, qc) = (v[0], v[1], v[2], v[3]);
            (qc > 0.0).then(|| ((qp + qc) * cf - qp * cp) / qc)
        });
        feed_sal_2.push(v);
    }
    data.set_column(FEED_SAL_2, feed_sal_2)?;

    let names = [
        FEED_SAL_1, PERM_SAL_1, PERM_FLOW_1, CONC_FLOW_1, FEED_PRES_1, CONC_PRES_1, FEED_SAL_2, PERM_SAL_2,
        PERM_FLOW_2, CONC_FLOW_2, FEED_PRES_2, CONC_PRES_2,
    ];
    let mut readings = Vec::new();
    let mut rejected = 0;
    for row in 0..data.len() {
        let timestamp = &data.timestamps()[row];
        if let Some(qc) = data.value(row, CONC_FLOW_1)?
            && qc <= 0.0
        {
            tracing::warn!(%timestamp, concentrate_flow = qc, "dropped row with non-positive concentrate flow");
            rejected += 1;
            continue;
        }
        let Some(v) = required(&data, row, &names)? else {
            tracing::warn!(%timestamp, "dropped row with missing readings");
            rejected += 1;
            continue;
        };
        let stage1 = StageReading {
            feed_flow_gpm: v[2] + v[3],
            feed_conc_g_per_l: v[0],
            feed_pressure: v[4],
            concentrate_pressure: v[5],
            permeate_flow_gpm: v[2],
            permeate_conc_g_per_l: v[1],
        };
        let stage2 = StageReading {
            feed_flow_gpm: v[8] + v[9],
            feed_conc_g_per_l: v[6],
            feed_pressure: v[10],
            concentrate_pressure: v[11],
            permeate_flow_gpm: v[8],
            permeate_conc_g_per_l: v[7],
        };
        readings.push((timestamp.clone(), stage1, stage2));
    }
    Ok(Readings {
        rows: readings,
        rejected,
    })
}

/// Stage 3 readings from the tertiary logger. Feed salinity is the
/// flow-weighted mix of permeate and concentrate.
pub fn tertiary_readings(table: &Table, filter: &RowFilter) -> BatchResult<Readings<(String, StageReading)>> {
    let mut data = restrict(table, filter, PERM_FLOW_3, FEED_PRES_3)?;
    data.set_column(PERM_SAL_3, salinity(&data, PERM_COND_3)?)?;
    data.set_column(CONC_SAL_3, salinity(&data, CONC_COND_3)?)?;

    let names = [PERM_SAL_3, CONC_SAL_3, PERM_FLOW_3, CONC_FLOW_3, FEED_PRES_3, CONC_PRES_3];
    let mut readings = Vec::new();
    let mut rejected = 0;
    for row in 0..data.len() {
        let timestamp = &data.timestamps()[row];
        let Some(v) = required(&data, row, &names)? else {
            tracing::warn!(%timestamp, "dropped row with missing readings");
            rejected += 1;
            continue;
        };
        let (cp, cc, qp, qc) = (v[0], v[1], v[2], v[3]);
        let qf = qp + qc;
        readings.push((
            timestamp.clone(),
            StageReading {
                feed_flow_gpm: qf,
                feed_conc_g_per_l: (qp * cp + qc * cc) / qf,
                feed_pressure: v[4],
                concentrate_pressure: v[5],
                permeate_flow_gpm: qp,
                permeate_conc_g_per_l: cp,
            },
        ));
    }
    Ok(Readings {
        rows: readings,
        rejected,
    })
}

/// Invert every reading of one stage. Rows that fail to solve are logged
/// and counted, not fatal.
pub fn invert_stage<S: Solver>(
    driver: &Driver<S>,
    stage: usize,
    membrane: &MembraneDef,
    readings: &[(String, StageReading)],
) -> BatchResult<StageProps> {
    let mut rows = Vec::with_capacity(readings.len());
    let mut failed = 0;
    for (timestamp, reading) in readings {
        match ro_module::membrane_props(driver, membrane, reading) {
            Ok(props) => {
                tracing::info!(stage, %timestamp, a = props.a_comp, b = props.b_comp, "membrane properties");
                rows.push(PropsRow {
                    timestamp: timestamp.clone(),
                    a_comp: props.a_comp,
                    b_comp: props.b_comp,
                });
            }
            Err(e) => {
                tracing::warn!(stage, %timestamp, error = %e, "inversion failed");
                failed += 1;
            }
        }
    }
    if rows.is_empty() {
        return Err(BatchError::NoRows {
            what: format!("stage {stage}: none of {} readings inverted", readings.len()),
        });
    }
    let result = StageProps { stage, rows, failed };
    if let Some((a, b)) = result.average() {
        tracing::info!(stage, a, b, rows = result.rows.len(), failed, "average membrane properties");
    }
    Ok(result)
}

pub fn write_csv(path: &Path, rows: &[PropsRow]) -> BatchResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        wtr.write_record([DATETIME, "A", "B"])?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Stages 1 and 2 from a primary logger export.
pub fn primary_membrane_props<S: Solver>(
    driver: &Driver<S>,
    doc: &InputDocument,
    table: &Table,
    filter: &RowFilter,
) -> BatchResult<[StageProps; 2]> {
    let readings = primary_readings(table, filter)?;
    let stage1: Vec<_> = readings.rows.iter().map(|(t, s1, _)| (t.clone(), *s1)).collect();
    let stage2: Vec<_> = readings.rows.iter().map(|(t, _, s2)| (t.clone(), *s2)).collect();
    let m1 = ro_module::membrane_for_stage(doc, 1)?;
    let m2 = ro_module::membrane_for_stage(doc, 2)?;
    Ok([invert_stage(driver, 1, &m1, &stage1)?, invert_stage(driver, 2, &m2, &stage2)?])
}

/// Stage 3 from a tertiary logger export.
pub fn tertiary_membrane_props<S: Solver>(
    driver: &Driver<S>,
    doc: &InputDocument,
    table: &Table,
    filter: &RowFilter,
) -> BatchResult<StageProps> {
    let readings = tertiary_readings(table, filter)?;
    let membrane = ro_module::membrane_for_stage(doc, 3)?;
    invert_stage(driver, 3, &membrane, &readings.rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PRIMARY: &str = "\
DateTime,stage 1 feed conductivity (us/cm),stage 1 permeate conductivity (us/cm),stage 1 permeate flowrate (gpm),stage 1 concentrate flowrate (gpm),stage 1 feed pressure (psi),stage 1 concentrate pressure (psi),stage 2 permeate conductivity (us/cm),stage 2 permeate flowrate (gpm),stage 2 concentrate flowrate (gpm),stage 2 feed pressure (psi),stage 2 concentrate pressure (psi)
7/31/2021 14:00,1000,20,1600,1000,136,111,45,600,400,148,123
8/1/2021 2:00,1000,20,1600,1000,136,111,45,600,400,148,123
8/1/2021 14:00,1000,20,900,1000,136,111,45,600,400,148,123
8/2/2021 2:00,1000,20,Bad Data,1000,136,111,45,600,400,148,123
8/2/2021 14:00,1000,,1600,1000,136,111,45,600,400,148,123
8/3/2021 2:00,1000,20,1700,-300,136,111,45,600,-900,148,123
";

    #[test]
    fn primary_rows_are_filtered_and_derived() {
        let table = Table::from_reader(PRIMARY.as_bytes()).unwrap();
        let readings = primary_readings(&table, &RowFilter::primary()).unwrap();
        assert_eq!(readings.rows.len(), 1);
        assert_eq!(readings.rejected, 2);
        let (timestamp, s1, s2) = &readings.rows[0];
        assert_eq!(timestamp, "8/1/2021 2:00");
        assert_relative_eq!(s1.feed_flow_gpm, 2600.0);
        assert_relative_eq!(s1.feed_conc_g_per_l, 0.5);
        assert_relative_eq!(s1.permeate_conc_g_per_l, 0.01);
        // (2600 * 0.5 - 1600 * 0.01) / 1000
        assert_relative_eq!(s2.feed_conc_g_per_l, 1.284, max_relative = 1e-12);
        assert_relative_eq!(s2.feed_flow_gpm, 1000.0);
        assert_relative_eq!(s2.feed_pressure, 148.0);
    }

    #[test]
    fn negative_concentrate_flow_is_rejected_not_inverted() {
        let table = Table::from_reader(PRIMARY.as_bytes()).unwrap();
        let readings = primary_readings(&table, &RowFilter::primary()).unwrap();
        assert!(readings.rows.iter().all(|(t, _, _)| t != "8/3/2021 2:00"));
        assert!(readings.rows.iter().all(|(_, s1, _)| s1.recovery() < 1.0));
    }

    #[test]
    fn tertiary_feed_is_flow_weighted() {
        let text = "\
DateTime,stage 3 permeate conductivity (us/cm),stage 3 concentrate conductivity (us/cm),stage 3 permeate flowrate (gpm),stage 3 concentrate flowrate (gpm),stage 3 feed pressure (psi),stage 3 concentrate pressure (psi)
8/3/2021 2:00,80,15000,300,150,239,219
8/3/2021 14:00,80,15000,300,150,40,20
8/4/2021 2:00,80,15000,100,150,239,219
";
        let table = Table::from_reader(text.as_bytes()).unwrap();
        let readings = tertiary_readings(&table, &RowFilter::tertiary()).unwrap();
        assert_eq!(readings.rows.len(), 1);
        assert_eq!(readings.rejected, 0);
        let s3 = readings.rows[0].1;
        assert_relative_eq!(s3.feed_flow_gpm, 450.0);
        assert_relative_eq!(s3.feed_conc_g_per_l, (300.0 * 0.04 + 150.0 * 7.5) / 450.0, max_relative = 1e-12);
    }

    #[test]
    fn averages_rows() {
        let props = StageProps {
            stage: 1,
            rows: vec![
                PropsRow {
                    timestamp: "a".into(),
                    a_comp: 4e-12,
                    b_comp: 3e-8,
                },
                PropsRow {
                    timestamp: "b".into(),
                    a_comp: 5e-12,
                    b_comp: 4e-8,
                },
            ],
            failed: 0,
        };
        let (a, b) = props.average().unwrap();
        assert_relative_eq!(a, 4.5e-12);
        assert_relative_eq!(b, 3.5e-8);
        assert_eq!(props.file_name(), "stage1_membrane_props.csv");
    }
}
