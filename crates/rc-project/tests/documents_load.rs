use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use rc_costing::{DeepWellCostMethod, PumpCostType};
use rc_project::{ProjectError, load_yaml, resolve_in, validate_document};

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

#[test]
fn shipped_documents_load_and_validate() {
    let documents = [
        "wrd_inputs_8_19_21.yaml",
        "wrd_inputs_3_13_21.yaml",
        "wrd_ro_inputs_3_13_21.yaml",
    ];
    for name in documents {
        let path = data_dir().join(name);
        let doc = load_yaml(&path).unwrap_or_else(|e| panic!("Failed to load {name}: {e}"));
        validate_document(&doc).unwrap_or_else(|e| panic!("Failed to validate {name}: {e}"));
        assert!(doc.ro_train.is_some(), "{name} has no RO train");
    }
}

#[test]
fn august_document_sections() {
    let doc = load_yaml(&data_dir().join("wrd_inputs_8_19_21.yaml")).unwrap();

    let ro = doc.ro_train.as_ref().unwrap();
    let names: Vec<&str> = ro.stages.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["stage1", "stage2", "stage3"]);
    let pump = ro.stages[0].pump.to_config().unwrap();
    assert_relative_eq!(pump.efficiency, 0.8);

    let uf = doc.uf_train.unwrap();
    assert_relative_eq!(uf.unit.to_config().recovery, 0.95);

    let chem = doc.chemical_addition.as_ref().unwrap();
    assert_eq!(chem.chemicals.len(), 7);
    let acid = chem.to_config("sulfuric_acid", 0.93, 1840.0).unwrap();
    assert_relative_eq!(acid.dose, 0.06);
    assert_relative_eq!(acid.purity, 0.93);
    assert!(chem.to_config("chlorine", 1.0, 1000.0).is_none());

    assert_eq!(
        doc.brine_disposal.unwrap().cost_method,
        DeepWellCostMethod::AsOpex {
            dwi_lcow: Some(0.49)
        }
    );
    assert_eq!(doc.costing.unwrap().pump_cost_type, PumpCostType::HighPressure);
    assert_eq!(doc.uv_aop.unwrap().output, "UV1_kW");
}

#[test]
fn solver_section_is_optional() {
    let with = load_yaml(&data_dir().join("wrd_ro_inputs_3_13_21.yaml")).unwrap();
    let solver = with.solver.unwrap();
    assert_eq!(solver.max_iterations, 100);

    let without = load_yaml(&data_dir().join("wrd_inputs_3_13_21.yaml")).unwrap();
    assert!(without.solver.is_none());
}

#[test]
fn bare_names_resolve_in_data_dir() {
    let dir = data_dir();
    let found = resolve_in(&dir, Path::new("wrd_inputs_8_19_21.yaml")).unwrap();
    assert!(found.ends_with("wrd_inputs_8_19_21.yaml"));

    let err = resolve_in(&dir, Path::new("wrd_inputs_1_1_20.yaml")).unwrap_err();
    assert!(matches!(err, ProjectError::NotFound { .. }));
}
