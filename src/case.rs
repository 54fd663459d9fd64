use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::{
    dict::{self, Dict},
    simulation::Simulation,
    system::{System, SystemBuilder},
    tools::ProxyTool,
    Error, Result,
};

/// A co-simulation case: the parsed case dictionary and everything derived from it.
#[derive(Debug)]
pub struct Case {
    pub case_dict: Dict,
    pub case_dict_file: PathBuf,
    /// Folder holding the case dictionary; all outputs are written here
    pub case_folder: PathBuf,
    /// Folder holding the FMUs referenced by the case
    pub lib_source: PathBuf,
    pub name: String,
    pub simulation: Option<Simulation>,
    pub system: Option<System>,
}

impl Case {
    /// Read a case dictionary. A missing file is [`Error::NotFound`].
    pub fn from_file(case_dict_file: impl AsRef<Path>) -> Result<Self> {
        let case_dict_file = absolute(case_dict_file.as_ref())?;
        let case_dict = dict::read_dict(&case_dict_file)?;
        let case_folder = case_dict_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self::new(case_dict, case_dict_file, case_folder))
    }

    pub fn new(case_dict: Dict, case_dict_file: PathBuf, case_folder: PathBuf) -> Self {
        let lib_source = match dict::lookup(&case_dict, "_environment.libSource") {
            Some(Value::String(lib)) => {
                let lib = Path::new(lib);
                if lib.is_absolute() {
                    lib.to_path_buf()
                } else {
                    case_folder.join(lib)
                }
            }
            Some(other) => {
                log::warn!("_environment.libSource {other} is not a path, using the case folder");
                case_folder.clone()
            }
            None => case_folder.clone(),
        };

        let simulation = Simulation::from_dict(&case_dict);
        let name = simulation
            .as_ref()
            .and_then(|s| s.name.clone())
            .or_else(|| {
                case_folder
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "case".to_owned());

        Self {
            case_dict,
            case_dict_file,
            case_folder,
            lib_source,
            name,
            simulation,
            system: None,
        }
    }

    /// `lib_source` and `case_folder` are the same directory
    pub fn lib_source_is_case_folder(&self) -> bool {
        match (self.lib_source.canonicalize(), self.case_folder.canonicalize()) {
            (Ok(lib), Ok(case)) => lib == case,
            _ => self.lib_source == self.case_folder,
        }
    }

    /// FMU paths referenced by `systemStructure.components.*.fmu`, relative to `lib_source`, in
    /// order of first use. Paths sharing a file name are listed once, as they land on the same
    /// file in the case folder.
    pub fn fmu_files(&self) -> Vec<String> {
        let mut files: Vec<String> = Vec::new();
        let components = dict::lookup(&self.case_dict, "systemStructure.components")
            .and_then(Value::as_object);
        for spec in components.into_iter().flat_map(|c| c.values()) {
            let Some(fmu) = spec.get("fmu").and_then(Value::as_str) else {
                continue;
            };
            match files
                .iter()
                .find(|f| Path::new(f).file_name() == Path::new(fmu).file_name())
            {
                Some(existing) if existing != fmu => {
                    log::warn!("{fmu} shares its file name with {existing}, using {existing}");
                }
                Some(_) => {}
                None => files.push(fmu.to_owned()),
            }
        }
        files
    }

    /// Build the system structure from FMUs in the case folder and propagate the simulation's
    /// base step size to components without their own.
    pub fn setup(&mut self, proxy_tool: &dyn ProxyTool) -> Result<()> {
        let system_structure = self
            .case_dict
            .get("systemStructure")
            .ok_or_else(|| Error::Case("no systemStructure section".to_owned()))?;
        let mut system = SystemBuilder::new(&self.case_folder, proxy_tool).build(system_structure)?;

        let base_step_size = self.simulation.as_ref().and_then(|s| s.base_step_size);
        if let Some(step_size) = base_step_size {
            for component in system.components.values_mut() {
                if component.step_size.is_none() {
                    log::debug!("{}: using base step size {step_size}", component.name);
                    component.step_size = Some(step_size);
                }
            }
        }

        log::info!(
            "Case {}: {} components, {} connections",
            self.name,
            system.components.len(),
            system.connections.len()
        );
        self.system = Some(system);
        Ok(())
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
