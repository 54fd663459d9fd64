//! The `ospx` crate compiles co-simulation case descriptions built from FMI 2.0 FMUs into the
//! deployment files consumed by Open Simulation Platform (OSP) simulation masters.
//!
//! ## Examples
//!
//! ### Compiling a case
//!
//! ```rust,no_run
//! use ospx::compiler::{CaseCompiler, CompileOptions};
//!
//! let compiler = CaseCompiler::new(CompileOptions::default());
//! let case = compiler.compile("path/to/caseDict").unwrap();
//! println!("compiled {}", case.name);
//! ```
//!
//! ### Importing an existing system structure
//!
//! ```rust,no_run
//! let case_dict = ospx::importer::import_system_structure("OspSystemStructure.xml").unwrap();
//! println!("wrote {}", case_dict.display());
//! ```
#![deny(clippy::all)]

use std::path::PathBuf;

pub mod archive;
pub mod case;
pub mod compiler;
pub mod dict;
pub mod fmu;
pub mod graph;
pub mod importer;
pub mod model_description;
pub mod simulation;
pub mod system;
pub mod tools;
pub mod watcher;
pub mod xml;

// Re-export the osp-schema crate
pub use osp_schema as schema;

pub use case::Case;
pub use fmu::Fmu;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported connection type: {0}")]
    UnsupportedConnection(String),

    #[error("Unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Error parsing dictionary {}: {message}", path.display())]
    DictParse { path: PathBuf, message: String },

    #[error("Invalid case: {0}")]
    Case(String),

    #[error("Invalid model description: {0}")]
    ModelDescription(String),

    #[error("FMU archive error: {0}")]
    Archive(String),

    #[error("External tool failed: {0}")]
    Tool(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Schema(#[from] osp_schema::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
