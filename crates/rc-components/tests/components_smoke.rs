//! Units sharing one model, wired by hand.

use rc_components::common::equate_states;
use rc_components::{Pump, PumpConfig, PumpSpec, ReverseOsmosis0D, RoConfig, UnitOp, default_scaling};
use rc_core::PackageId;
use rc_core::constants::ATM_PA;
use rc_core::units::read::{to_gpm, to_pa};
use rc_core::units::{g_per_l, gpm, k, pa, psi};
use rc_model::Model;
use rc_props::{PropertyPackage, StateValues};
use rc_solver::{NewtonSolver, Solver};

#[test]
fn pump_then_ro_stage() {
    let pkg = PropertyPackage::nacl(PackageId(0));
    let mut m = Model::new();

    let pump = Pump::build(
        &mut m,
        &pkg,
        "stage1.pump",
        &PumpConfig {
            efficiency: 0.8,
            spec: PumpSpec::OutletPressure {
                value: to_pa(psi(151.0)),
            },
        },
    )
    .unwrap();
    let ro = ReverseOsmosis0D::build(
        &mut m,
        &pkg,
        "stage1.ro",
        &RoConfig {
            a_comp: 4.2e-12,
            b_comp: 3.5e-8,
            area: 30_000.0,
            delta_p: -to_pa(psi(25.0)),
            permeate_pressure: ATM_PA,
        },
    )
    .unwrap();
    equate_states(&mut m, "stage1.arc", ro.inlet(), pump.outlet());

    let feed = StateValues::from_flow_and_conc(gpm(2637.0), g_per_l(0.5), k(302.0), pa(ATM_PA)).unwrap();
    pkg.fix_state(&mut m, pump.inlet(), &feed).unwrap();
    assert_eq!(m.degrees_of_freedom(), 0);

    m.calculate_scaling_factors(pkg.default_scaling());
    m.calculate_scaling_factors(&default_scaling());

    pump.guess_outlets(&mut m, &pkg).unwrap();
    pkg.propagate_state(&mut m, pump.outlet(), ro.inlet()).unwrap();
    ro.guess_outlets(&mut m, &pkg).unwrap();

    let report = NewtonSolver::default().solve(&mut m).unwrap();
    assert!(report.status.is_optimal(), "{report:?}");

    let kw = m.value(pump.work_mechanical) / 1e3;
    assert!(kw > 150.0 && kw < 240.0, "stage 1 pump {kw} kW");

    let perm = pkg.read_state(&m, ro.permeate());
    let perm_gpm = to_gpm(perm.flow_vol(pkg.params()));
    assert!(perm_gpm > 1200.0 && perm_gpm < 1900.0, "permeate {perm_gpm} gpm");
    assert!(ro.equations().iter().all(|e| (m.residual(*e) * m.eq_scale(*e)).abs() < 1e-6));
}
