//! Reading and in-place editing of zip archives (FMUs).
//!
//! Every mutation writes a complete new archive into a temporary file next to the original and
//! replaces the original only once the new archive is finished. Mutations log failures and return
//! `None`; the temporary file is removed when it is dropped.

use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use zip::{write::SimpleFileOptions, CompressionMethod, ZipArchive, ZipWriter};

use crate::{Error, Result};

pub const MODEL_DESCRIPTION: &str = "modelDescription.xml";

fn open(archive: &Path) -> Result<ZipArchive<File>> {
    if !archive.exists() {
        log::error!("Archive {} does not exist", archive.display());
        return Err(Error::NotFound(archive.to_path_buf()));
    }
    Ok(ZipArchive::new(File::open(archive)?)?)
}

/// Read the UTF-8 text of entry `name`, or `None` if the archive has no such entry.
pub fn read_entry(archive: &Path, name: &str) -> Result<Option<String>> {
    let mut zip = open(archive)?;
    // The entry borrows `zip`, so the result is bound before returning.
    let contents = match zip.by_name(name) {
        Ok(mut file) => {
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;
            Ok(Some(contents))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(err) => Err(err.into()),
    };
    contents
}

/// Names of all entries, in archive order
pub fn entry_names(archive: &Path) -> Result<Vec<String>> {
    let zip = open(archive)?;
    Ok(zip.file_names().map(str::to_owned).collect())
}

/// Remove the named entries. Names not present in the archive are ignored.
pub fn remove_entries(archive: &Path, names: &[&str]) -> Option<PathBuf> {
    rewrite(archive, "remove entries from", |source, writer| {
        for index in 0..source.len() {
            let entry = source.by_index_raw(index)?;
            if names.contains(&entry.name()) {
                log::debug!("Removing {} from {}", entry.name(), archive.display());
                continue;
            }
            writer.raw_copy_file(entry)?;
        }
        Ok(())
    })
}

/// Rename entry `from` to `to`, keeping all other entries and the compressed bytes unchanged.
pub fn rename_entry(archive: &Path, from: &str, to: &str) -> Option<PathBuf> {
    rewrite(archive, "rename entry in", |source, writer| {
        let mut found = false;
        for index in 0..source.len() {
            let entry = source.by_index_raw(index)?;
            if entry.name() == from {
                found = true;
                writer.raw_copy_file_rename(entry, to)?;
            } else {
                writer.raw_copy_file(entry)?;
            }
        }
        if found {
            Ok(())
        } else {
            Err(Error::Archive(format!("no entry named {from}")))
        }
    })
}

/// Add a deflate-compressed text entry. An existing entry of the same name is replaced.
pub fn add_entry(archive: &Path, name: &str, text: &str) -> Option<PathBuf> {
    rewrite(archive, "add entry to", |source, writer| {
        for index in 0..source.len() {
            let entry = source.by_index_raw(index)?;
            if entry.name() != name {
                writer.raw_copy_file(entry)?;
            }
        }
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        writer.start_file(name, options)?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    })
}

fn rewrite<F>(archive: &Path, operation: &str, edit: F) -> Option<PathBuf>
where
    F: FnOnce(&mut ZipArchive<File>, &mut ZipWriter<&mut File>) -> Result<()>,
{
    match try_rewrite(archive, edit) {
        Ok(()) => Some(archive.to_path_buf()),
        Err(err) => {
            log::error!("Failed to {operation} {}: {err}", archive.display());
            None
        }
    }
}

fn try_rewrite<F>(archive: &Path, edit: F) -> Result<()>
where
    F: FnOnce(&mut ZipArchive<File>, &mut ZipWriter<&mut File>) -> Result<()>,
{
    let mut source = open(archive)?;
    let dir = match archive.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut temp = tempfile::Builder::new()
        .prefix(".ospx-")
        .suffix(".zip")
        .tempfile_in(&dir)?;
    {
        let mut writer = ZipWriter::new(temp.as_file_mut());
        edit(&mut source, &mut writer)?;
        writer.finish()?;
    }
    drop(source);
    temp.persist(archive).map_err(|err| Error::Io(err.error))?;
    Ok(())
}
