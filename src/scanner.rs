use std::path::Path;

/// Flags files that should not be trusted before they are parsed.
///
/// The editor consults this once per `read`, before any bytes of the
/// manifest are interpreted.
pub trait DangerousFileDetector {
    fn is_dangerous(&self, path: &Path) -> bool;
}

/// Detects the "mark of the web" on downloaded files.
///
/// On Windows this reads the NTFS `Zone.Identifier` alternate data stream;
/// zone 3 (Internet) and zone 4 (Restricted) mark the file untrusted. Other
/// platforms have no such taint, so the check is a constant `false`.
#[derive(Debug, Default)]
pub struct MarkOfTheWebDetector;

impl DangerousFileDetector for MarkOfTheWebDetector {
    #[cfg(windows)]
    fn is_dangerous(&self, path: &Path) -> bool {
        let stream = format!("{}:Zone.Identifier", path.display());
        match std::fs::read_to_string(stream) {
            Ok(content) => zone_id(&content).is_some_and(|zone| zone >= 3),
            Err(_) => false,
        }
    }

    #[cfg(not(windows))]
    fn is_dangerous(&self, _path: &Path) -> bool {
        false
    }
}

/// Extracts the `ZoneId` value from a `Zone.Identifier` stream body.
#[cfg(any(windows, test))]
fn zone_id(content: &str) -> Option<u32> {
    content
        .lines()
        .find_map(|line| line.trim().strip_prefix("ZoneId="))
        .and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_internet_zone() {
        let content = "[ZoneTransfer]\r\nZoneId=3\r\n";
        assert_eq!(zone_id(content), Some(3));
    }

    #[test]
    fn missing_zone_id_is_none() {
        assert_eq!(zone_id("[ZoneTransfer]\r\n"), None);
    }

    #[cfg(not(windows))]
    #[test]
    fn non_windows_files_are_never_dangerous() {
        assert!(!MarkOfTheWebDetector.is_dangerous(Path::new("toolpin.json")));
    }
}
