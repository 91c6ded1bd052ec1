use std::path::Path;
use serde::Deserialize;
use serde_json::{Map, Value};
use crate::error::ManifestError;

/// The highest manifest format version this build understands.
pub const SUPPORTED_MANIFEST_VERSION: u64 = 1;
/// The version assumed when a manifest does not declare one.
pub const DEFAULT_MANIFEST_VERSION: u64 = 1;

const PROP_VERSION: &str = "version";
const PROP_IS_ROOT: &str = "isRoot";
const PROP_TOOLS: &str = "tools";
const PROP_COMMANDS: &str = "commands";
const PROP_ROLL_FORWARD: &str = "rollForward";

/// Represents the raw contents of a `toolpin.json` file.
///
/// Optional fields stay unset when absent from the JSON; whether their
/// absence is acceptable is decided later by validation, never by parsing.
/// The entry order matches the JSON document and is preserved across
/// parse → mutate → serialize round-trips.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolManifest {
    /// Declared manifest format version. Absent means "assume the default".
    pub version: Option<u64>,
    /// Whether this manifest is the root of its directory scope.
    pub is_root: Option<bool>,
    /// The pinned tool entries, in document order. `None` means the
    /// `"tools"` object was absent entirely.
    pub tools: Option<Vec<RawToolEntry>>,
}

/// One pinned tool as it appears on disk, unvalidated.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawToolEntry {
    /// The JSON map key the entry was stored under.
    #[serde(skip)]
    pub package_id: String,
    /// Raw version string, not yet parsed.
    pub version: Option<String>,
    /// Command names the tool exposes.
    pub commands: Option<Vec<String>>,
    /// Whether the tool may run on a newer runtime than it targets.
    #[serde(default)]
    pub roll_forward: bool,
}

impl ToolManifest {
    /// Creates an empty manifest with no fields set.
    pub fn empty() -> ToolManifest {
        ToolManifest {
            version: None,
            is_root: None,
            tools: None,
        }
    }

    /// Creates a fresh manifest the way `toolpin init` writes it:
    /// current format version, an `isRoot` marker, and no tools.
    pub fn new(is_root: bool) -> ToolManifest {
        ToolManifest {
            version: Some(DEFAULT_MANIFEST_VERSION),
            is_root: Some(is_root),
            tools: Some(Vec::new()),
        }
    }

    /// Loads a manifest from a file path.
    ///
    /// # Errors
    /// Returns [`ManifestError::Io`] if the file can't be read and
    /// [`ManifestError::Parse`] for malformed JSON or a field with the
    /// wrong JSON value kind. No partial document is ever returned.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ToolManifest, ManifestError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ManifestError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let root: Value = serde_json::from_str(&text).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json_value(root, path)
    }

    /// Builds a manifest from an already-parsed JSON tree.
    ///
    /// Tolerant of absent optional fields, strict about wrong value kinds:
    /// `"tools"` must be an object and each entry body must match the
    /// entry shape (`commands` an array of strings, `rollForward` a bool).
    fn from_json_value(root: Value, path: &Path) -> Result<ToolManifest, ManifestError> {
        let parse_err = |reason: String| ManifestError::Parse {
            path: path.to_path_buf(),
            reason,
        };

        let Value::Object(root) = root else {
            return Err(parse_err("expected a JSON object at the top level".to_string()));
        };

        let mut manifest = ToolManifest::empty();

        if let Some(value) = root.get(PROP_VERSION) {
            let version = value.as_u64().ok_or_else(|| {
                parse_err(format!(
                    "expected an unsigned integer for '{PROP_VERSION}', found {value}"
                ))
            })?;
            manifest.version = Some(version);
        }

        if let Some(value) = root.get(PROP_IS_ROOT) {
            let is_root = value.as_bool().ok_or_else(|| {
                parse_err(format!("expected a boolean for '{PROP_IS_ROOT}', found {value}"))
            })?;
            manifest.is_root = Some(is_root);
        }

        if let Some(value) = root.get(PROP_TOOLS) {
            let Value::Object(tools) = value else {
                return Err(parse_err(format!(
                    "expected an object for '{PROP_TOOLS}', found {value}"
                )));
            };
            let mut entries = Vec::with_capacity(tools.len());
            for (package_id, body) in tools {
                let mut entry: RawToolEntry = serde_json::from_value(body.clone())
                    .map_err(|e| parse_err(format!("in tool '{package_id}': {e}")))?;
                entry.package_id = package_id.clone();
                entries.push(entry);
            }
            manifest.tools = Some(entries);
        }

        Ok(manifest)
    }

    /// Renders the manifest as indented JSON.
    ///
    /// Field order is fixed: `version` (if set), `isRoot` (if set), then the
    /// `"tools"` object keyed by package id in document order. `rollForward`
    /// is always written, even when it equals the default.
    pub fn to_json(&self) -> String {
        let mut root = Map::new();
        if let Some(version) = self.version {
            root.insert(PROP_VERSION.to_string(), Value::from(version));
        }
        if let Some(is_root) = self.is_root {
            root.insert(PROP_IS_ROOT.to_string(), Value::Bool(is_root));
        }

        let mut tools = Map::new();
        for entry in self.tools.as_deref().unwrap_or_default() {
            let mut body = Map::new();
            body.insert(
                PROP_VERSION.to_string(),
                entry.version.as_deref().map_or(Value::Null, Value::from),
            );
            body.insert(
                PROP_COMMANDS.to_string(),
                entry.commands.as_deref().map_or(Value::Null, |commands| {
                    Value::Array(commands.iter().map(|c| Value::from(c.as_str())).collect())
                }),
            );
            body.insert(PROP_ROLL_FORWARD.to_string(), Value::Bool(entry.roll_forward));
            tools.insert(entry.package_id.clone(), Value::Object(body));
        }
        root.insert(PROP_TOOLS.to_string(), Value::Object(tools));

        let mut text = serde_json::to_string_pretty(&Value::Object(root))
            .unwrap_or_else(|_| String::from("{}"));
        text.push('\n');
        text
    }

    /// Saves the manifest to the given path as one whole-file write.
    ///
    /// # Errors
    /// Returns [`ManifestError::Io`] if the write fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ManifestError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()).map_err(|e| ManifestError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
