use std::path::PathBuf;
use anyhow::Result;

/// File name of the tool manifest inside a project directory.
pub const MANIFEST_FILE_NAME: &str = "toolpin.json";

/// Returns the path to the `toolpin.json` file in the current working directory.
pub fn get_manifest_file() -> Result<PathBuf> {
    Ok(std::env::current_dir()?.join(MANIFEST_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_file_lives_in_cwd() {
        let path = get_manifest_file().unwrap();
        assert!(path.ends_with(MANIFEST_FILE_NAME));
        assert_eq!(path.parent().unwrap(), std::env::current_dir().unwrap());
    }
}
