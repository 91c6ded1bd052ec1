use anyhow::{bail, Result};
use colored::Colorize;
use semver::Version;
use toolpin::editor::ToolManifestEditor;
use toolpin::manifest::ToolManifest;
use toolpin::resolve::{PackageId, ToolCommandName};
use toolpin::util::get_manifest_file;
use crate::cli::{ToolpinCommand, CLI};

pub fn execute(cli: CLI) -> Result<()> {
    if !matches!(cli.command, ToolpinCommand::Init { .. }) {
        let manifest_path = get_manifest_file()?;
        if !manifest_path.exists() {
            bail!("toolpin.json not found. Run `toolpin init` to create one.")
        }
    }
    match cli.command {
        ToolpinCommand::Init { no_root } => {
            execute_init(no_root)
        }
        ToolpinCommand::Add { name_at_version, commands, roll_forward } => {
            execute_add(name_at_version, commands, roll_forward)
        }
        ToolpinCommand::Update { name_at_version, commands } => {
            execute_update(name_at_version, commands)
        }
        ToolpinCommand::Remove { name } => {
            execute_remove(&name)
        }
        ToolpinCommand::List { verbose } => {
            execute_list(verbose)
        }
    }
}

pub fn execute_init(no_root: bool) -> Result<()> {
    let manifest_path = get_manifest_file()?;
    if manifest_path.exists() {
        bail!("toolpin.json already exists at {}", manifest_path.display());
    }
    ToolManifest::new(!no_root).save(&manifest_path)?;
    println!("Created {}", manifest_path.display());
    Ok(())
}

pub fn execute_add(
    name_at_version: String,
    commands: Vec<String>,
    roll_forward: bool,
) -> Result<()> {
    let (name, version) = extract_name_at_version(name_at_version)?;
    let version = parse_version(&version)?;
    let package_id = PackageId::new(&name);
    let commands = if commands.is_empty() {
        vec![name.clone()]
    } else {
        commands
    };
    let commands = ToolCommandName::convert(&commands);

    let editor = ToolManifestEditor::new();
    editor.add(&get_manifest_file()?, &package_id, &version, &commands, roll_forward)?;
    println!("Pinned {}@{}", package_id, version);
    Ok(())
}

pub fn execute_update(name_at_version: String, commands: Vec<String>) -> Result<()> {
    let (name, version) = extract_name_at_version(name_at_version)?;
    let version = parse_version(&version)?;
    let package_id = PackageId::new(&name);
    let manifest_path = get_manifest_file()?;
    let editor = ToolManifestEditor::new();

    let commands = if commands.is_empty() {
        let cwd = std::env::current_dir()?;
        let (packages, _) = editor.read(&manifest_path, &cwd)?;
        match packages.iter().find(|p| p.package_id == package_id) {
            Some(existing) => existing.command_names.clone(),
            None => vec![ToolCommandName::new(&name)],
        }
    } else {
        ToolCommandName::convert(&commands)
    };

    editor.edit(&manifest_path, &package_id, &version, &commands)?;
    println!("Updated {} to {}", package_id, version);
    Ok(())
}

pub fn execute_remove(name: &str) -> Result<()> {
    let package_id = PackageId::new(name);
    let editor = ToolManifestEditor::new();
    editor.remove(&get_manifest_file()?, &package_id)?;
    println!("Removed {}", package_id);
    Ok(())
}

pub fn execute_list(verbose: bool) -> Result<()> {
    let manifest_path = get_manifest_file()?;
    let cwd = std::env::current_dir()?;
    let editor = ToolManifestEditor::new();
    let (packages, is_root) = editor.read(&manifest_path, &cwd)?;

    if packages.is_empty() {
        println!("No tools pinned");
        return Ok(());
    }

    for package in &packages {
        println!("{}: {}", package.package_id.to_string().bold(), package.version);
        if verbose {
            let commands: Vec<&str> = package.command_names.iter().map(|c| c.as_str()).collect();
            println!("  commands: {}", commands.join(", "));
            println!("  rollForward: {}", package.roll_forward);
        }
    }
    if verbose {
        println!();
        println!("isRoot: {}", is_root);
    }
    Ok(())
}

fn parse_version(version: &str) -> Result<Version> {
    Version::parse(version)
        .map_err(|e| anyhow::anyhow!("Invalid version '{}': {}", version, e))
}

fn extract_name_at_version(name_at_version: String) -> Result<(String, String)> {
    let mut split = name_at_version.split('@');
    let name = split.next().ok_or(anyhow::anyhow!("Invalid name@version"))?;
    let version = split.next().ok_or(anyhow::anyhow!("Invalid name@version"))?;
    Ok((name.to_string(), version.to_string()))
}
