//! Compilation of a case dictionary into OSP and SSP system structure files.
//!
//! [`CaseCompiler::compile`] runs these phases in order:
//!
//! 1. clean result files from the case folder,
//! 2. copy the referenced FMUs from `_environment.libSource` into the case folder,
//! 3. build the system structure and propagate the base step size,
//! 4. write `<component>_OspModelDescription.xml`, `OspSystemStructure.xml`,
//!    `SystemStructure.ssd`, `statisticsDict` and `watchDict`,
//! 5. optionally render `callGraph.pdf`.
//!
//! In inspect mode phases 4 and 5 are replaced by a logged report.

use std::path::{Path, PathBuf};

use crate::{
    case::Case,
    graph,
    tools::{Dot, FmuProxify, GraphRenderer, ProxyTool},
    Error, Result,
};

pub mod clean;
pub mod inspect;
pub mod osp_model_description;
pub mod ssd;
pub mod statistics;
pub mod system_structure;
pub mod watch_dict;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Log a report of the case instead of writing outputs
    pub inspect: bool,
    /// Render the dependency graph
    pub graph: bool,
}

pub struct CaseCompiler {
    options: CompileOptions,
    proxy_tool: Box<dyn ProxyTool>,
    graph_renderer: Box<dyn GraphRenderer>,
}

impl CaseCompiler {
    /// A compiler using `fmu-proxify` and Graphviz `dot` from the environment
    pub fn new(options: CompileOptions) -> Self {
        Self::with_tools(
            options,
            Box::new(FmuProxify::default()),
            Box::new(Dot::default()),
        )
    }

    pub fn with_tools(
        options: CompileOptions,
        proxy_tool: Box<dyn ProxyTool>,
        graph_renderer: Box<dyn GraphRenderer>,
    ) -> Self {
        Self {
            options,
            proxy_tool,
            graph_renderer,
        }
    }

    /// Compile the case dictionary at `case_dict_file`. Outputs are written next to it.
    pub fn compile(&self, case_dict_file: impl AsRef<Path>) -> Result<Case> {
        let mut case = Case::from_file(case_dict_file)?;
        log::info!("Compiling case {} in {}", case.name, case.case_folder.display());

        let lib_is_case_folder = case.lib_source_is_case_folder();
        clean::clean(&case.case_folder, lib_is_case_folder)?;
        if !lib_is_case_folder {
            copy_fmus(&case)?;
        }

        case.setup(self.proxy_tool.as_ref())?;

        if self.options.inspect {
            if let Some(system) = &case.system {
                inspect::inspect(system);
            }
            return Ok(case);
        }

        let written = write_outputs(&case)?;
        log::info!("Wrote {} files", written.len());

        if self.options.graph {
            if let Some(system) = &case.system {
                graph::render(&case.case_folder, system, self.graph_renderer.as_ref());
            }
        }
        Ok(case)
    }
}

/// Copy the FMUs named by the components from `lib_source` into the case folder, flattened to
/// their file names. Each file is copied once; a missing FMU is fatal.
pub fn copy_fmus(case: &Case) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();
    for fmu in case.fmu_files() {
        let source = case.lib_source.join(&fmu);
        let Some(file_name) = source.file_name() else {
            return Err(Error::Case(format!("invalid FMU path {fmu}")));
        };
        if !source.is_file() {
            log::error!("FMU {} not found in {}", fmu, case.lib_source.display());
            return Err(Error::NotFound(source));
        }
        let target = case.case_folder.join(file_name);
        std::fs::copy(&source, &target)?;
        log::debug!("Copied {} to {}", source.display(), target.display());
        copied.push(target);
    }
    Ok(copied)
}

/// Write every output file of a set-up case and return their paths.
pub fn write_outputs(case: &Case) -> Result<Vec<PathBuf>> {
    let system = case
        .system
        .as_ref()
        .ok_or_else(|| Error::Case(format!("case {} has not been set up", case.name)))?;
    let folder = &case.case_folder;
    let simulation = case.simulation.as_ref();

    let mut written = Vec::new();
    for component in system.components.values() {
        written.push(osp_model_description::write(folder, component)?);
    }
    written.push(system_structure::write(folder, system, simulation)?);
    written.push(ssd::write(folder, &case.name, system, simulation)?);
    written.push(statistics::write(folder, &case.name, system, simulation)?);
    written.push(watch_dict::write(
        folder,
        &case.name,
        system,
        simulation,
        case.case_dict.get("postProcessing"),
    )?);
    Ok(written)
}
