//! Run the binaries against synthetic cases.

use assert_cmd::Command;
use ospx_test_data::{adder, printer, CaseFolder};

const CASE_DICT: &str = r#"
_environment { libSource ../lib; }
systemStructure
{
    components
    {
        A { fmu adder.fmu; stepSize 0.01; }
        B { fmu printer.fmu; }
    }
    connections
    {
        A_to_B
        {
            source { component A; variable out; }
            target { component B; variable in; }
        }
    }
}
run { simulation { name demo; startTime 0; stopTime 1; baseStepSize 0.01; algorithm fixedStep; } }
"#;

fn case_folder() -> CaseFolder {
    let folder = CaseFolder::new().unwrap();
    folder.add_fmu(&adder()).unwrap();
    folder.add_fmu(&printer()).unwrap();
    folder
}

#[test]
fn test_case_builder() {
    let folder = case_folder();
    let case_dict = folder.write_case_dict(CASE_DICT).unwrap();

    Command::cargo_bin("ospCaseBuilder")
        .unwrap()
        .arg(&case_dict)
        .arg("-q")
        .assert()
        .success();

    let files = folder.case_files().unwrap();
    for expected in [
        "A_OspModelDescription.xml",
        "B_OspModelDescription.xml",
        "OspSystemStructure.xml",
        "SystemStructure.ssd",
        "adder.fmu",
        "caseDict",
        "printer.fmu",
        "statisticsDict",
        "watchDict",
    ] {
        assert!(files.contains(&expected.to_owned()), "{expected} missing from {files:?}");
    }
}

#[test]
fn test_case_builder_inspect_writes_no_outputs() {
    let folder = case_folder();
    let case_dict = folder.write_case_dict(CASE_DICT).unwrap();

    Command::cargo_bin("ospCaseBuilder")
        .unwrap()
        .arg(&case_dict)
        .arg("--inspect")
        .assert()
        .success();

    let files = folder.case_files().unwrap();
    assert!(!files.contains(&"OspSystemStructure.xml".to_owned()));
}

#[test]
fn test_case_builder_missing_case_dict() {
    let folder = case_folder();
    Command::cargo_bin("ospCaseBuilder")
        .unwrap()
        .arg(folder.case_dir().join("caseDict"))
        .assert()
        .failure();
}

#[test]
fn test_case_builder_log_file() {
    let folder = case_folder();
    let case_dict = folder.write_case_dict(CASE_DICT).unwrap();
    let log = folder.root().join("ospx.log");

    Command::cargo_bin("ospCaseBuilder")
        .unwrap()
        .arg(&case_dict)
        .arg("--log")
        .arg(&log)
        .args(["--log-level", "DEBUG"])
        .assert()
        .success();

    let text = std::fs::read_to_string(&log).unwrap();
    assert!(text.contains("OspSystemStructure.xml"));
}

#[test]
fn test_import_round_trip() {
    let folder = case_folder();
    let case_dict = folder.write_case_dict(CASE_DICT).unwrap();
    Command::cargo_bin("ospCaseBuilder")
        .unwrap()
        .arg(&case_dict)
        .assert()
        .success();

    Command::cargo_bin("importSystemStructure")
        .unwrap()
        .arg(folder.case_dir().join("OspSystemStructure.xml"))
        .assert()
        .success();

    assert!(folder
        .case_dir()
        .join("caseDict_imported_from_OspSystemStructure_xml")
        .is_file());
}

#[test]
fn test_import_rejects_ssd() {
    let folder = case_folder();
    let ssd = folder
        .write_case_file("SystemStructure.ssd", "<ssd:SystemStructureDescription/>")
        .unwrap();
    Command::cargo_bin("importSystemStructure")
        .unwrap()
        .arg(&ssd)
        .assert()
        .failure();
}

#[test]
fn test_watch_cosim_dump() {
    let folder = case_folder();
    folder
        .write_case_file(
            "watchDict",
            "datasources { A { dataColumns (2); } }\nsimulation { name demo; }\n",
        )
        .unwrap();
    folder
        .write_case_file(
            "A_20240101_120000_000001.csv",
            "Time,StepCount,out\n0.0,0,1.0\n0.1,1,2.0\n",
        )
        .unwrap();

    Command::cargo_bin("watchCosim")
        .unwrap()
        .arg(folder.case_dir().join("watchDict"))
        .args(["--dump", "--interval", "0", "--timeout", "5"])
        .assert()
        .success();

    let files = folder.case_files().unwrap();
    assert!(files.contains(&"resultDict".to_owned()));
    assert!(files.contains(&"demo.zip".to_owned()));
}
