use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use semver::Version;
use crate::error::ManifestError;
use crate::manifest::{RawToolEntry, ToolManifest};
use crate::resolve::{PackageId, ToolCommandName, ToolManifestPackage, resolve_packages};
use crate::scanner::{DangerousFileDetector, MarkOfTheWebDetector};

/// The manifest editor: parse → validate → mutate → serialize, one whole
/// file read and at most one whole file write per operation.
///
/// Nothing is cached between calls; every operation re-reads the file. The
/// raw document is mutated, never the validated view, so a write preserves
/// everything the operation did not touch.
pub struct ToolManifestEditor {
    detector: Box<dyn DangerousFileDetector>,
}

impl Default for ToolManifestEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolManifestEditor {
    pub fn new() -> ToolManifestEditor {
        Self::with_detector(Box::new(MarkOfTheWebDetector))
    }

    /// Builds an editor with a custom taint detector. Used by tests to
    /// simulate a downloaded manifest.
    pub fn with_detector(detector: Box<dyn DangerousFileDetector>) -> ToolManifestEditor {
        ToolManifestEditor { detector }
    }

    /// Pins a tool in the manifest.
    ///
    /// Re-adding an existing package with the same version and the same
    /// command set (order-independent) only rewrites its `rollForward` flag.
    /// The same id with a different version or command set is a
    /// [`ManifestError::PackageIdCollision`] and leaves the file untouched.
    pub fn add(
        &self,
        manifest_path: &Path,
        package_id: &PackageId,
        version: &Version,
        commands: &[ToolCommandName],
        roll_forward: bool,
    ) -> Result<(), ManifestError> {
        let mut document = ToolManifest::load(manifest_path)?;
        let packages = resolve_packages(
            &document,
            manifest_path,
            &manifest_directory(manifest_path),
        )?;

        if let Some(existing) = packages.iter().find(|p| p.package_id == *package_id) {
            if existing.version == *version
                && command_sets_equal(&existing.command_names, commands)
            {
                let entry = find_raw_entry_mut(&mut document, package_id)
                    .ok_or_else(|| out_of_sync(package_id))?;
                entry.roll_forward = roll_forward;
                return document.save(manifest_path);
            }
            return Err(ManifestError::PackageIdCollision {
                package_id: package_id.to_string(),
                existing_version: existing.version.to_string(),
                requested_version: version.to_string(),
                path: manifest_path.to_path_buf(),
            });
        }

        document
            .tools
            .get_or_insert_with(Vec::new)
            .push(RawToolEntry {
                package_id: package_id.to_string(),
                version: Some(version.to_string()),
                commands: Some(commands.iter().map(|c| c.as_str().to_string()).collect()),
                roll_forward,
            });
        document.save(manifest_path)
    }

    /// Overwrites an existing entry's version and commands in place.
    ///
    /// The entry keeps its position and its `rollForward` flag. A missing
    /// package id is a [`ManifestError::PackageNotFound`].
    pub fn edit(
        &self,
        manifest_path: &Path,
        package_id: &PackageId,
        new_version: &Version,
        new_commands: &[ToolCommandName],
    ) -> Result<(), ManifestError> {
        let mut document = ToolManifest::load(manifest_path)?;
        let packages = resolve_packages(
            &document,
            manifest_path,
            &manifest_directory(manifest_path),
        )?;

        if !packages.iter().any(|p| p.package_id == *package_id) {
            return Err(ManifestError::PackageNotFound {
                package_id: package_id.to_string(),
                path: manifest_path.to_path_buf(),
            });
        }

        let entry = find_raw_entry_mut(&mut document, package_id)
            .ok_or_else(|| out_of_sync(package_id))?;
        entry.version = Some(new_version.to_string());
        entry.commands = Some(new_commands.iter().map(|c| c.as_str().to_string()).collect());
        document.save(manifest_path)
    }

    /// Drops every entry matching the package id, preserving the order of
    /// the remaining entries.
    pub fn remove(
        &self,
        manifest_path: &Path,
        package_id: &PackageId,
    ) -> Result<(), ManifestError> {
        let mut document = ToolManifest::load(manifest_path)?;
        let packages = resolve_packages(
            &document,
            manifest_path,
            &manifest_directory(manifest_path),
        )?;

        if !packages.iter().any(|p| p.package_id == *package_id) {
            return Err(ManifestError::PackageNotFound {
                package_id: package_id.to_string(),
                path: manifest_path.to_path_buf(),
            });
        }

        let tools = document
            .tools
            .as_mut()
            .ok_or_else(|| out_of_sync(package_id))?;
        tools.retain(|entry| PackageId::new(&entry.package_id) != *package_id);
        document.save(manifest_path)
    }

    /// Reads the manifest without mutating it.
    ///
    /// Refuses files flagged by the taint scanner before any parse, then
    /// returns the resolved entries bound to `directory` plus the resolved
    /// `isRoot` flag.
    pub fn read(
        &self,
        manifest_path: &Path,
        directory: &Path,
    ) -> Result<(Vec<ToolManifestPackage>, bool), ManifestError> {
        if self.detector.is_dangerous(manifest_path) {
            return Err(ManifestError::Untrusted {
                path: manifest_path.to_path_buf(),
            });
        }

        let document = ToolManifest::load(manifest_path)?;
        let packages = resolve_packages(&document, manifest_path, directory)?;
        let is_root = document.is_root.ok_or_else(|| {
            ManifestError::Inconsistent(
                "validation passed but 'isRoot' is unset in the raw document".to_string(),
            )
        })?;
        Ok((packages, is_root))
    }
}

fn out_of_sync(package_id: &PackageId) -> ManifestError {
    ManifestError::Inconsistent(format!(
        "package '{package_id}' exists in the resolved view but not in the raw document"
    ))
}

fn find_raw_entry_mut<'a>(
    document: &'a mut ToolManifest,
    package_id: &PackageId,
) -> Option<&'a mut RawToolEntry> {
    document
        .tools
        .as_mut()?
        .iter_mut()
        .find(|entry| PackageId::new(&entry.package_id) == *package_id)
}

fn command_sets_equal(left: &[ToolCommandName], right: &[ToolCommandName]) -> bool {
    left.iter().collect::<BTreeSet<_>>() == right.iter().collect::<BTreeSet<_>>()
}

fn manifest_directory(manifest_path: &Path) -> PathBuf {
    match manifest_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
