use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use semver::Version;
use crate::error::{EntryProblem, ManifestError, ValidationError};
use crate::manifest::{DEFAULT_MANIFEST_VERSION, SUPPORTED_MANIFEST_VERSION, ToolManifest};

/// A normalized package identifier.
///
/// Ids compare case-insensitively: construction trims surrounding
/// whitespace and lowercases, so `Just` and `just` are the same package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(String);

impl PackageId {
    pub fn new(id: &str) -> PackageId {
        PackageId(id.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A normalized command token a tool exposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToolCommandName(String);

impl ToolCommandName {
    pub fn new(name: &str) -> ToolCommandName {
        ToolCommandName(name.trim().to_string())
    }

    /// Normalizes a whole command list, preserving order.
    pub fn convert(names: &[String]) -> Vec<ToolCommandName> {
        names.iter().map(|n| ToolCommandName::new(n)).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolCommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A manifest entry that passed validation, bound to the directory the
/// manifest applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolManifestPackage {
    pub package_id: PackageId,
    pub version: Version,
    pub command_names: Vec<ToolCommandName>,
    pub directory: PathBuf,
    pub roll_forward: bool,
}

/// Validates a parsed manifest and produces its resolved entries.
///
/// Every violation in the document is collected before reporting: document
/// level checks (format version, `isRoot` presence, duplicate package ids)
/// and per-entry checks (version present and parseable, at least one
/// command) all land in one [`ManifestError::Invalid`]. A document with any
/// error anywhere yields no entries at all.
pub fn resolve_packages(
    manifest: &ToolManifest,
    manifest_path: &Path,
    directory: &Path,
) -> Result<Vec<ToolManifestPackage>, ManifestError> {
    let mut packages = Vec::new();
    let mut errors = Vec::new();

    validate_version(manifest, &mut errors);

    if manifest.is_root.is_none() {
        errors.push(ValidationError::MissingIsRoot);
    }

    let entries = manifest.tools.as_deref().unwrap_or_default();

    let mut seen: BTreeMap<PackageId, usize> = BTreeMap::new();
    for entry in entries {
        *seen.entry(PackageId::new(&entry.package_id)).or_insert(0) += 1;
    }
    let duplicates: Vec<String> = seen
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(id, _)| id.to_string())
        .collect();
    if !duplicates.is_empty() {
        errors.push(ValidationError::DuplicatePackageIds(duplicates));
    }

    for entry in entries {
        let package_id = PackageId::new(&entry.package_id);
        let mut problems = Vec::new();

        let version = match entry.version.as_deref() {
            None => {
                problems.push(EntryProblem::MissingVersion);
                None
            }
            Some(raw) => match Version::parse(raw) {
                Ok(version) => Some(version),
                Err(_) => {
                    problems.push(EntryProblem::InvalidVersion(raw.to_string()));
                    None
                }
            },
        };

        let commands = entry.commands.as_deref().unwrap_or_default();
        if commands.is_empty() {
            problems.push(EntryProblem::MissingCommands);
        }

        if problems.is_empty() {
            // problems is empty only when the version parsed
            if let Some(version) = version {
                packages.push(ToolManifestPackage {
                    package_id,
                    version,
                    command_names: ToolCommandName::convert(commands),
                    directory: directory.to_path_buf(),
                    roll_forward: entry.roll_forward,
                });
            }
        } else {
            errors.push(ValidationError::Package {
                package_id: package_id.to_string(),
                problems,
            });
        }
    }

    if !errors.is_empty() {
        return Err(ManifestError::Invalid {
            path: manifest_path.to_path_buf(),
            errors,
        });
    }

    Ok(packages)
}

/// An absent format version defaults to 1, yet an explicit 0 is rejected.
/// Preserved as schema-evolution policy; do not generalize past version 0/1.
fn validate_version(manifest: &ToolManifest, errors: &mut Vec<ValidationError>) {
    let version = manifest.version.unwrap_or(DEFAULT_MANIFEST_VERSION);
    if version == 0 {
        errors.push(ValidationError::VersionZero);
    }
    if version > SUPPORTED_MANIFEST_VERSION {
        errors.push(ValidationError::UnsupportedVersion {
            found: version,
            supported: SUPPORTED_MANIFEST_VERSION,
        });
    }
}
