use std::path::{Path, PathBuf};

use chrono::Utc;
use indexmap::IndexMap;

use crate::{
    archive,
    model_description::{Experiment, ModelDescription, ScalarVariable, Unit},
    tools::ProxyTool,
    Error, Result,
};

/// Shared library extensions renamed when an FMU is copied
const LIBRARY_EXTENSIONS: [&str; 3] = ["dll", "so", "dylib"];

/// An FMU archive on disk together with its parsed model description.
#[derive(Clone, Debug, PartialEq)]
pub struct Fmu {
    pub file: PathBuf,
    pub model_description: ModelDescription,
}

impl Fmu {
    pub fn from_path(file: impl AsRef<Path>) -> Result<Self> {
        let file = file.as_ref();
        if !file.is_file() {
            log::error!("FMU {} does not exist", file.display());
            return Err(Error::NotFound(file.to_path_buf()));
        }
        log::debug!("Reading FMU {}", file.display());
        let model_description = ModelDescription::from_fmu(file)?;
        Ok(Self {
            file: file.to_path_buf(),
            model_description,
        })
    }

    /// File name, e.g. `adder.fmu`
    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without extension, e.g. `adder`
    pub fn stem(&self) -> String {
        self.file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn units(&self) -> IndexMap<String, Unit> {
        self.model_description.units()
    }

    pub fn variables(&self) -> IndexMap<String, ScalarVariable> {
        self.model_description.variables()
    }

    pub fn default_experiment(&self) -> Option<Experiment> {
        self.model_description.default_experiment()
    }

    /// Copy the FMU to `<new_name>.fmu` in the same folder.
    ///
    /// Shared libraries named after the old stem are renamed, and `modelName` and
    /// `modelIdentifier` are set to `new_name`. Returns `None` after logging if the copy fails or
    /// `new_name` is the current name.
    pub fn copy(&self, new_name: &str) -> Option<Fmu> {
        let stem = self.stem();
        if new_name == stem {
            log::error!("Cannot copy {} onto itself: new name equals {stem}", self.file.display());
            return None;
        }
        match self.try_copy(&stem, new_name) {
            Ok(fmu) => Some(fmu),
            Err(err) => {
                log::error!("Failed to copy {} as {new_name}: {err}", self.file.display());
                None
            }
        }
    }

    fn try_copy(&self, stem: &str, new_name: &str) -> Result<Fmu> {
        let target = self.file.with_file_name(format!("{new_name}.fmu"));
        std::fs::copy(&self.file, &target)?;
        log::info!("Copied {} to {}", self.file.display(), target.display());

        for entry in archive::entry_names(&target)? {
            if let Some(renamed) = renamed_library(&entry, stem, new_name) {
                archive::rename_entry(&target, &entry, &renamed).ok_or_else(|| {
                    Error::Archive(format!("could not rename {entry} in {}", target.display()))
                })?;
                log::debug!("Renamed {entry} to {renamed}");
            }
        }

        let mut model_description = self.model_description.clone();
        let old_name = model_description.model_name().unwrap_or(stem).to_owned();
        model_description.set_model_name(new_name);
        model_description.log_update(
            &format!("Copied from {}: modelName {old_name} -> {new_name}", self.file_name()),
            Utc::now(),
        );
        model_description.write_to_fmu(&target)?;

        Ok(Fmu {
            file: target,
            model_description,
        })
    }

    /// Replace this FMU by a proxy that forwards to `host:port`. On failure the error is logged
    /// and the FMU is returned unchanged.
    pub fn proxify(self, host: &str, port: u16, tool: &dyn ProxyTool) -> Fmu {
        let proxy = tool
            .proxify(&self.file, host, port)
            .and_then(Fmu::from_path);
        match proxy {
            Ok(proxy) => {
                log::info!("Created proxy {} for {host}:{port}", proxy.file.display());
                proxy
            }
            Err(err) => {
                log::error!("Could not proxify {}: {err}", self.file.display());
                self
            }
        }
    }
}

/// The new name of a shared library entry, if `entry` is one whose file name contains `stem`.
fn renamed_library(entry: &str, stem: &str, new_name: &str) -> Option<String> {
    if !entry.starts_with("binaries/") {
        return None;
    }
    let (dir, file_name) = entry.rsplit_once('/')?;
    let extension = file_name.rsplit_once('.').map(|(_, ext)| ext)?;
    if !LIBRARY_EXTENSIONS.contains(&extension) || !file_name.contains(stem) {
        return None;
    }
    Some(format!("{dir}/{}", file_name.replace(stem, new_name)))
}
