#![doc=include_str!( "../README.md")]
#![deny(unsafe_code)]
#![deny(clippy::all)]

use std::{
    fmt::Write as _,
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;
use tempfile::TempDir;
use zip::{write::SimpleFileOptions, ZipWriter};

/// A scalar variable of a synthetic FMU
#[derive(Clone, Debug)]
pub struct Variable {
    pub name: String,
    pub data_type: String,
    pub causality: Option<String>,
    pub variability: Option<String>,
    pub start: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<String>,
}

impl Variable {
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: name.to_owned(),
            data_type: data_type.to_owned(),
            causality: None,
            variability: None,
            start: None,
            unit: None,
            quantity: None,
        }
    }

    /// A continuous `Real` input
    pub fn input(name: &str) -> Self {
        Self::new(name, "Real")
            .causality("input")
            .variability("continuous")
            .start("0.0")
    }

    /// A continuous `Real` output
    pub fn output(name: &str) -> Self {
        Self::new(name, "Real")
            .causality("output")
            .variability("continuous")
    }

    /// A fixed parameter of the given type
    pub fn parameter(name: &str, data_type: &str, start: &str) -> Self {
        Self::new(name, data_type)
            .causality("parameter")
            .variability("fixed")
            .start(start)
    }

    pub fn causality(mut self, causality: &str) -> Self {
        self.causality = Some(causality.to_owned());
        self
    }

    pub fn variability(mut self, variability: &str) -> Self {
        self.variability = Some(variability.to_owned());
        self
    }

    pub fn start(mut self, start: &str) -> Self {
        self.start = Some(start.to_owned());
        self
    }

    pub fn unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_owned());
        self
    }

    pub fn quantity(mut self, quantity: &str) -> Self {
        self.quantity = Some(quantity.to_owned());
        self
    }
}

/// Builds FMI 2.0 co-simulation FMU archives with placeholder binaries.
#[derive(Clone, Debug)]
pub struct FmuBuilder {
    pub model_name: String,
    pub description: String,
    /// `(name, BaseUnit attributes)`, e.g. `("N", r#"kg="1" m="1" s="-2""#)`
    pub units: Vec<(String, String)>,
    pub variables: Vec<Variable>,
    /// `binaries/<platform>` folders that get a shared library
    pub platforms: Vec<String>,
    pub default_experiment: Option<(f64, f64, f64)>,
}

impl FmuBuilder {
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_owned(),
            description: format!("Synthetic {model_name} model"),
            units: Vec::new(),
            variables: Vec::new(),
            platforms: vec!["win64".to_owned(), "linux64".to_owned()],
            default_experiment: None,
        }
    }

    pub fn variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn unit(mut self, name: &str, base_unit: &str) -> Self {
        self.units.push((name.to_owned(), base_unit.to_owned()));
        self
    }

    pub fn default_experiment(mut self, start: f64, stop: f64, step: f64) -> Self {
        self.default_experiment = Some((start, stop, step));
        self
    }

    /// The `modelDescription.xml` text
    pub fn model_description(&self) -> String {
        let name = &self.model_name;
        let mut xml = String::new();
        let _ = writeln!(xml, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        let _ = writeln!(
            xml,
            r#"<fmiModelDescription fmiVersion="2.0" modelName="{name}" guid="{{{name}}}" description="{}" generationTool="ospx-test-data" variableNamingConvention="structured">"#,
            self.description
        );
        let _ = writeln!(
            xml,
            r#"  <CoSimulation modelIdentifier="{name}" canHandleVariableCommunicationStepSize="true"/>"#
        );
        if !self.units.is_empty() {
            let _ = writeln!(xml, "  <UnitDefinitions>");
            for (unit, base_unit) in &self.units {
                let _ = writeln!(
                    xml,
                    r#"    <Unit name="{unit}"><BaseUnit {base_unit}/></Unit>"#
                );
            }
            let _ = writeln!(xml, "  </UnitDefinitions>");
        }
        if let Some((start, stop, step)) = self.default_experiment {
            let _ = writeln!(
                xml,
                r#"  <DefaultExperiment startTime="{start}" stopTime="{stop}" stepSize="{step}"/>"#
            );
        }
        let _ = writeln!(xml, "  <ModelVariables>");
        for (index, variable) in self.variables.iter().enumerate() {
            let mut outer = format!(r#"name="{}" valueReference="{index}""#, variable.name);
            if let Some(causality) = &variable.causality {
                let _ = write!(outer, r#" causality="{causality}""#);
            }
            if let Some(variability) = &variable.variability {
                let _ = write!(outer, r#" variability="{variability}""#);
            }
            let mut inner = String::new();
            for (key, value) in [
                ("quantity", &variable.quantity),
                ("unit", &variable.unit),
                ("start", &variable.start),
            ] {
                if let Some(value) = value {
                    let _ = write!(inner, r#" {key}="{value}""#);
                }
            }
            let _ = writeln!(
                xml,
                "    <ScalarVariable {outer}>\n      <{}{inner}/>\n    </ScalarVariable>",
                variable.data_type
            );
        }
        let _ = writeln!(xml, "  </ModelVariables>");
        let _ = writeln!(xml, "  <ModelStructure/>");
        let _ = writeln!(xml, "</fmiModelDescription>");
        xml
    }

    /// Write `<model_name>.fmu` into `folder`
    pub fn write(&self, folder: &Path) -> anyhow::Result<PathBuf> {
        let path = folder.join(format!("{}.fmu", self.model_name));
        self.write_to(&path)?;
        Ok(path)
    }

    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path).with_context(|| format!("Create {}", path.display()))?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        zip.start_file("modelDescription.xml", options)?;
        zip.write_all(self.model_description().as_bytes())?;
        for platform in &self.platforms {
            let library = match platform.as_str() {
                p if p.starts_with("win") => format!("{}.dll", self.model_name),
                p if p.starts_with("darwin") => format!("{}.dylib", self.model_name),
                _ => format!("{}.so", self.model_name),
            };
            zip.start_file(format!("binaries/{platform}/{library}"), options)?;
            zip.write_all(b"placeholder shared library")?;
        }
        zip.start_file("resources/readme.txt", options)?;
        zip.write_all(b"resources are left untouched")?;
        zip.finish()?;
        Ok(())
    }
}

/// An FMU with two real inputs `a` and `b`, a real output `out` and typed parameters.
pub fn adder() -> FmuBuilder {
    FmuBuilder::new("adder")
        .unit("m", r#"m="1""#)
        .unit("N", r#"kg="1" m="1" s="-2""#)
        .unit("m", r#"m="1" factor="1000""#)
        .default_experiment(0.0, 10.0, 0.01)
        .variable(Variable::input("a").unit("m").quantity("Length"))
        .variable(Variable::input("b").unit("m").quantity("Length"))
        .variable(Variable::output("out").unit("m").quantity("Length"))
        .variable(Variable::parameter("k", "Real", "1.0"))
        .variable(Variable::parameter("n", "Integer", "3"))
        .variable(Variable::parameter("on", "Boolean", "false"))
        .variable(Variable::parameter("label", "String", "sum"))
        .variable(Variable::new("_internal", "Real").causality("local"))
        .variable(Variable::new("settings.solver", "String").start("euler"))
}

/// An FMU with a real input `in` and a real output `y`.
pub fn printer() -> FmuBuilder {
    FmuBuilder::new("printer")
        .unit("N", r#"kg="1" m="1" s="-2""#)
        .variable(Variable::input("in").unit("N").quantity("Force"))
        .variable(Variable::output("y"))
        .variable(Variable::parameter("x", "Real", "0.0"))
}

/// A scratch directory with a `case` folder and a `lib` folder holding FMUs.
#[derive(Debug)]
pub struct CaseFolder {
    dir: TempDir,
}

impl CaseFolder {
    pub fn new() -> anyhow::Result<Self> {
        let dir = tempfile::Builder::new().prefix("ospx-case").tempdir()?;
        std::fs::create_dir_all(dir.path().join("case"))?;
        std::fs::create_dir_all(dir.path().join("lib"))?;
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn case_dir(&self) -> PathBuf {
        self.dir.path().join("case")
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.dir.path().join("lib")
    }

    /// Write an FMU into the library folder
    pub fn add_fmu(&self, fmu: &FmuBuilder) -> anyhow::Result<PathBuf> {
        fmu.write(&self.lib_dir())
    }

    /// Write an FMU into `lib/<subfolder>`
    pub fn add_fmu_in(&self, subfolder: &str, fmu: &FmuBuilder) -> anyhow::Result<PathBuf> {
        let folder = self.lib_dir().join(subfolder);
        std::fs::create_dir_all(&folder)?;
        fmu.write(&folder)
    }

    /// Write `text` as `case/<name>` and return its path
    pub fn write_case_file(&self, name: &str, text: &str) -> anyhow::Result<PathBuf> {
        let path = self.case_dir().join(name);
        std::fs::write(&path, text).with_context(|| format!("Write {}", path.display()))?;
        Ok(path)
    }

    /// Write `text` as `case/caseDict`
    pub fn write_case_dict(&self, text: &str) -> anyhow::Result<PathBuf> {
        self.write_case_file("caseDict", text)
    }

    /// File names in the case folder, sorted
    pub fn case_files(&self) -> anyhow::Result<Vec<String>> {
        let mut names = std::fs::read_dir(self.case_dir())?
            .map(|entry| Ok(entry?.file_name().to_string_lossy().into_owned()))
            .collect::<anyhow::Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }
}
