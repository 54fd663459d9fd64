//! End-to-end compilation of synthetic cases.

use std::path::{Path, PathBuf};

use ospx::{
    compiler::{CaseCompiler, CompileOptions},
    model_description::DataType,
    schema::{self, system_structure as osp},
    tools::{GraphRenderer, ProxyTool},
    Error,
};
use ospx_test_data::{adder, printer, CaseFolder};
use pretty_assertions::assert_eq;

/// Proxy tool that copies the FMU to `<stem>-proxy.fmu`
struct CopyProxy;

impl ProxyTool for CopyProxy {
    fn proxify(&self, fmu: &Path, _host: &str, _port: u16) -> ospx::Result<PathBuf> {
        let stem = fmu.file_stem().unwrap().to_string_lossy();
        let proxy = fmu.with_file_name(format!("{stem}-proxy.fmu"));
        std::fs::copy(fmu, &proxy)?;
        Ok(proxy)
    }
}

/// Renderer that copies the DOT source to the output path
struct CopyRenderer;

impl GraphRenderer for CopyRenderer {
    fn render(&self, dot_source: &Path, output: &Path) -> ospx::Result<()> {
        std::fs::copy(dot_source, output)?;
        Ok(())
    }
}

fn compiler(options: CompileOptions) -> CaseCompiler {
    CaseCompiler::with_tools(options, Box::new(CopyProxy), Box::new(CopyRenderer))
}

fn case_folder() -> CaseFolder {
    let folder = CaseFolder::new().unwrap();
    folder.add_fmu(&adder()).unwrap();
    folder.add_fmu(&printer()).unwrap();
    folder
}

const TWO_COMPONENTS: &str = r#"
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
run
{
    simulation { name demo; startTime 0; stopTime 1; baseStepSize 0.01; algorithm fixedStep; }
}
"#;

fn read_structure(case_dir: &Path) -> osp::OspSystemStructure {
    let text = std::fs::read_to_string(case_dir.join("OspSystemStructure.xml")).unwrap();
    schema::deserialize(&text).unwrap()
}

#[test_log::test]
fn test_two_component_connection() {
    let folder = case_folder();
    let case_dict = folder.write_case_dict(TWO_COMPONENTS).unwrap();
    let case = compiler(CompileOptions::default()).compile(&case_dict).unwrap();
    assert_eq!(case.name, "demo");

    let xml = std::fs::read_to_string(folder.case_dir().join("OspSystemStructure.xml")).unwrap();
    let position = |tag: &str| xml.find(tag).unwrap();
    assert!(position("<StartTime>") < position("<BaseStepSize>"));
    assert!(position("<BaseStepSize>") < position("<Algorithm>"));
    assert!(position("<Algorithm>") < position("<Simulators>"));
    assert!(position("<Simulators>") < position("<Connections>"));

    let structure = read_structure(&folder.case_dir());
    assert_eq!(structure.start_time.as_ref().map(|t| t.as_str()), Some("0"));
    assert_eq!(structure.base_step_size.as_ref().map(|t| t.as_str()), Some("0.01"));
    assert_eq!(structure.algorithm.as_ref().map(|t| t.as_str()), Some("fixedStep"));

    let sources: Vec<_> = structure
        .simulators
        .simulators
        .iter()
        .map(|s| (s.name.as_str(), s.source.as_str()))
        .collect();
    assert_eq!(sources, [("A", "adder.fmu"), ("B", "printer.fmu")]);
    assert_eq!(structure.simulators.simulators[0].step_size, Some(0.01));

    let connections = structure.connections.unwrap().connections;
    assert_eq!(connections.len(), 1);
    let osp::Connection::Variable(connection) = &connections[0] else {
        panic!("expected a variable connection, got {:?}", connections[0]);
    };
    let endpoints: Vec<_> = connection
        .variables
        .iter()
        .map(|v| format!("{}/{}", v.simulator, v.name))
        .collect();
    assert_eq!(endpoints, ["A/out", "B/in"]);
}

#[test_log::test]
fn test_outputs_written() {
    let folder = case_folder();
    let case_dict = folder.write_case_dict(TWO_COMPONENTS).unwrap();
    compiler(CompileOptions::default()).compile(&case_dict).unwrap();

    let case_dir = folder.case_dir();
    let omd = std::fs::read_to_string(case_dir.join("A_OspModelDescription.xml")).unwrap();
    assert!(omd.contains("Length"));

    let ssd = std::fs::read_to_string(case_dir.join("SystemStructure.ssd")).unwrap();
    let ssd: schema::ssd::SystemStructureDescription = schema::deserialize(&ssd).unwrap();
    assert_eq!(ssd.name, "demo");

    let statistics = ospx::dict::read_dict(case_dir.join("statisticsDict")).unwrap();
    assert_eq!(
        ospx::dict::lookup(&statistics, "components.count").and_then(|v| v.as_u64()),
        Some(2)
    );

    let watch = ospx::watcher::WatchConfig::from_file(&case_dir.join("watchDict")).unwrap();
    assert_eq!(watch.simulation_name, "demo");
    // adder has one output, printer has one
    assert_eq!(watch.data_columns["A"], [2]);
    assert_eq!(watch.data_columns["B"], [2]);
    assert_eq!(watch.end_time, Some(1.0));
}

#[test_log::test]
fn test_initial_value_with_inferred_type() {
    let folder = case_folder();
    let case_dict = folder
        .write_case_dict(
            r#"
_environment { libSource ../lib; }
systemStructure
{
    components
    {
        C { fmu printer.fmu; initialize { x { start 1.5; } } }
    }
}
"#,
        )
        .unwrap();
    let case = compiler(CompileOptions::default()).compile(&case_dict).unwrap();

    let component = &case.system.as_ref().unwrap().components["C"];
    assert_eq!(component.initial_values["x"].data_type, Some(DataType::Real));

    let structure = read_structure(&folder.case_dir());
    let simulator = &structure.simulators.simulators[0];
    let initial_values = &simulator.initial_values.as_ref().unwrap().initial_values;
    assert_eq!(initial_values.len(), 1);
    assert_eq!(initial_values[0].variable, "x");
    assert_eq!(
        initial_values[0].value,
        osp::TypedValue::Real(osp::RealValue { value: 1.5 })
    );
}

#[test_log::test]
fn test_missing_fmu_is_fatal() {
    let folder = case_folder();
    let case_dict = folder
        .write_case_dict(
            r#"
_environment { libSource ../lib; }
systemStructure { components { M { fmu missing.fmu; } } }
"#,
        )
        .unwrap();
    let err = compiler(CompileOptions::default())
        .compile(&case_dict)
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(path) if path.ends_with("missing.fmu")));
    assert_eq!(folder.case_files().unwrap(), ["caseDict"]);
}

#[test_log::test]
fn test_missing_case_dict() {
    let folder = case_folder();
    let err = compiler(CompileOptions::default())
        .compile(folder.case_dir().join("caseDict"))
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test_log::test]
fn test_compile_is_deterministic() {
    let folder = case_folder();
    let case_dict = folder.write_case_dict(TWO_COMPONENTS).unwrap();
    let compiler = compiler(CompileOptions::default());

    compiler.compile(&case_dict).unwrap();
    let first: Vec<_> = ["OspSystemStructure.xml", "SystemStructure.ssd", "statisticsDict"]
        .iter()
        .map(|name| std::fs::read(folder.case_dir().join(name)).unwrap())
        .collect();

    compiler.compile(&case_dict).unwrap();
    let second: Vec<_> = ["OspSystemStructure.xml", "SystemStructure.ssd", "statisticsDict"]
        .iter()
        .map(|name| std::fs::read(folder.case_dir().join(name)).unwrap())
        .collect();
    assert_eq!(first, second);
}

#[test_log::test]
fn test_recompile_keeps_user_files() {
    let folder = case_folder();
    let case_dict = folder.write_case_dict(TWO_COMPONENTS).unwrap();
    folder.write_case_file("notes.txt", "keep me").unwrap();
    folder
        .write_case_file("test_OspSystemStructure.xml", "<reference/>")
        .unwrap();
    folder
        .write_case_file("A_20240101_120000_000001.csv", "Time,StepCount,out\n")
        .unwrap();

    compiler(CompileOptions::default()).compile(&case_dict).unwrap();
    let files = folder.case_files().unwrap();
    assert!(files.contains(&"notes.txt".to_owned()));
    assert!(files.contains(&"test_OspSystemStructure.xml".to_owned()));
    assert!(!files.contains(&"A_20240101_120000_000001.csv".to_owned()));
}

#[test_log::test]
fn test_base_step_size_propagates() {
    let folder = case_folder();
    let case_dict = folder.write_case_dict(TWO_COMPONENTS).unwrap();
    let case = compiler(CompileOptions::default()).compile(&case_dict).unwrap();

    let components = &case.system.as_ref().unwrap().components;
    assert_eq!(components["A"].step_size, Some(0.01));
    // B has no stepSize of its own
    assert_eq!(components["B"].step_size, Some(0.01));
}

#[test_log::test]
fn test_inspect_writes_nothing() {
    let folder = case_folder();
    let case_dict = folder.write_case_dict(TWO_COMPONENTS).unwrap();
    compiler(CompileOptions {
        inspect: true,
        graph: false,
    })
    .compile(&case_dict)
    .unwrap();

    assert_eq!(
        folder.case_files().unwrap(),
        ["adder.fmu", "caseDict", "printer.fmu"]
    );
}

#[test_log::test]
fn test_graph_rendered() {
    let folder = case_folder();
    let case_dict = folder.write_case_dict(TWO_COMPONENTS).unwrap();
    compiler(CompileOptions {
        inspect: false,
        graph: true,
    })
    .compile(&case_dict)
    .unwrap();

    let pdf = std::fs::read_to_string(folder.case_dir().join("callGraph.pdf")).unwrap();
    assert!(pdf.contains("digraph"));
    assert!(pdf.contains("\"A\" -> \"B\""));
}

#[test_log::test]
fn test_unknown_connection_endpoint_skipped() {
    let folder = case_folder();
    let case_dict = folder
        .write_case_dict(
            r#"
_environment { libSource ../lib; }
systemStructure
{
    components { A { fmu adder.fmu; } B { fmu printer.fmu; } }
    connections
    {
        good { source { component A; variable out; } target { component B; variable in; } }
        bad { source { component Z; variable out; } target { component B; variable in; } }
    }
}
"#,
        )
        .unwrap();
    let case = compiler(CompileOptions::default()).compile(&case_dict).unwrap();
    let system = case.system.unwrap();
    assert_eq!(system.connections.keys().collect::<Vec<_>>(), ["good"]);
}

#[test_log::test]
fn test_proxy_component() {
    let folder = case_folder();
    let case_dict = folder
        .write_case_dict(
            r#"
_environment { libSource ../lib; }
systemStructure
{
    components
    {
        A
        {
            fmu adder.fmu;
            generate_proxy true;
            remoteAccess { host localhost; port 8000; }
        }
    }
}
"#,
        )
        .unwrap();
    let case = compiler(CompileOptions::default()).compile(&case_dict).unwrap();
    let component = &case.system.as_ref().unwrap().components["A-proxy"];
    assert_eq!(component.fmu.file_name(), "adder-proxy.fmu");

    let structure = read_structure(&folder.case_dir());
    let simulator = &structure.simulators.simulators[0];
    assert_eq!(simulator.name, "A-proxy");
    assert_eq!(simulator.source, "adder-proxy.fmu");
}

#[test_log::test]
fn test_fmu_in_library_subfolder() {
    let folder = CaseFolder::new().unwrap();
    folder.add_fmu_in("sub", &adder()).unwrap();
    folder.add_fmu(&printer()).unwrap();
    let case_dict = folder
        .write_case_dict(
            r#"
_environment { libSource ../lib; }
systemStructure
{
    components { A { fmu sub/adder.fmu; } B { fmu printer.fmu; } }
    connections
    {
        A_to_B { source { component A; variable out; } target { component B; variable in; } }
    }
}
"#,
        )
        .unwrap();
    let case = compiler(CompileOptions::default()).compile(&case_dict).unwrap();
    assert_eq!(case.system.unwrap().connections.len(), 1);

    let files = folder.case_files().unwrap();
    assert!(files.contains(&"adder.fmu".to_owned()));
    let structure = read_structure(&folder.case_dir());
    assert_eq!(structure.simulators.simulators[0].source, "adder.fmu");
}

#[test_log::test]
fn test_ssd_connectors() {
    let folder = case_folder();
    let case_dict = folder
        .write_case_dict(
            r#"
_environment { libSource ../lib; }
systemStructure
{
    components
    {
        A { fmu adder.fmu; connectors { out { variable out; type output; } } }
    }
}
"#,
        )
        .unwrap();
    compiler(CompileOptions::default()).compile(&case_dict).unwrap();

    let text = std::fs::read_to_string(folder.case_dir().join("SystemStructure.ssd")).unwrap();
    let ssd: schema::ssd::SystemStructureDescription = schema::deserialize(&text).unwrap();
    let component = &ssd.system.elements.components[0];
    let connector = &component.connectors.as_ref().unwrap().connectors[0];
    assert_eq!(connector.name, "out");
    assert_eq!(connector.kind.as_deref(), Some("output"));
    // The FMU declares unit "m" for `out`, the connector's type stays bare
    assert_eq!(connector.real, Some(schema::ssd::RealType::default()));
}
