//! Command dispatch: one function per subcommand.

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands, LangCommands, RenderFormat};
use crate::cli::browse;
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{language, DomainError};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::InfraError;
use crate::util::path::source_dir;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Render {
            toc,
            lang,
            active,
            toggle,
            format,
        }) => _render(cli, toc, lang.as_deref(), active.as_deref(), toggle, *format),
        Some(Commands::Find { toc, url }) => _find(cli, toc, url),
        Some(Commands::Browse { toc, active }) => _browse(cli, toc, active.as_deref()),
        Some(Commands::Lang { command }) => _lang(cli, command),
        Some(Commands::Config { command }) => _config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see navtoc --help".to_string(),
        )),
    }
}

/// Load settings for a TOC, picking up `.navtoc.toml` next to it.
fn load_settings(cli: &Cli, toc_dir: Option<&Path>) -> CliResult<Settings> {
    let settings = match &cli.config {
        Some(path) => Settings::load_with_global(path, toc_dir)?,
        None => Settings::load(toc_dir)?,
    };
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn container_for(cli: &Cli, toc: &Path) -> CliResult<ServiceContainer> {
    let settings = load_settings(cli, Some(&source_dir(toc)))?;
    Ok(ServiceContainer::new(settings))
}

#[instrument(skip(cli))]
fn _render(
    cli: &Cli,
    toc: &Path,
    lang: Option<&str>,
    active: Option<&str>,
    toggles: &[String],
    format: RenderFormat,
) -> CliResult<()> {
    let container = container_for(cli, toc)?;
    let mut session = container.session(toc, active)?;
    if let Some(url) = active {
        if session.find(url).is_none() {
            output::warning(&format!("{url} is not in the TOC, rendering collapsed"));
        }
    }
    for url in toggles {
        session.toggle_url(url)?;
    }
    let rendered = match lang {
        Some(code) => session.render_with(code)?,
        None => session.render(),
    };
    match format {
        RenderFormat::Tree => print!("{}", rendered.to_tree()),
        RenderFormat::Html => print!("{}", rendered.to_html()),
        RenderFormat::Json => {
            let json = rendered
                .to_json()
                .map_err(|e| InfraError::io("serialize render", e.into()))?;
            output::info(&json);
        }
    }
    Ok(())
}

#[instrument(skip(cli))]
fn _find(cli: &Cli, toc: &Path, url: &str) -> CliResult<()> {
    if url.trim().is_empty() {
        return Err(CliError::InvalidArgs("url must not be empty".to_string()));
    }
    let container = container_for(cli, toc)?;
    let session = container.session(toc, None)?;
    match session.find(url) {
        Some(idx) => {
            output::info(&session.breadcrumbs(idx).join(" > "));
            Ok(())
        }
        None => Err(ApplicationError::from(DomainError::NodeNotFound(url.to_string())).into()),
    }
}

#[instrument(skip(cli))]
fn _browse(cli: &Cli, toc: &Path, active: Option<&str>) -> CliResult<()> {
    let container = container_for(cli, toc)?;
    let mut session = container.session(toc, active)?;
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut stdout = io::stdout();
    browse::run(&mut session, stdin.lock(), &mut stdout, interactive)
        .map_err(|e| InfraError::io("browse", e))?;
    Ok(())
}

fn _lang(cli: &Cli, command: &LangCommands) -> CliResult<()> {
    let settings = load_settings(cli, Some(Path::new(".")))?;
    let container = ServiceContainer::new(settings);
    let mut selector = container.selector();
    match command {
        LangCommands::Show => {
            output::info(selector.current());
        }
        LangCommands::Set { code } => {
            let current = selector.set_current(code)?;
            output::success(&format!(
                "language set to {} ({})",
                current,
                container.settings.preference_file.display()
            ));
        }
        LangCommands::List => {
            let current = selector.current().to_string();
            for code in selector.languages().codes() {
                let marker = if *code == current { "*" } else { " " };
                let line = match language::lookup(code) {
                    Some(info) => format!("{marker} {:<6} {} ({})", code, info.name, info.native_name),
                    None => format!("{marker} {code}"),
                };
                output::detail(&line);
            }
        }
    }
    Ok(())
}

/// Write the commented settings template, refusing to overwrite.
fn write_config_template(fs: &dyn FileSystem, target: &Path) -> CliResult<()> {
    if fs.exists(target) {
        return Err(CliError::Usage(format!(
            "config already exists: {}",
            target.display()
        )));
    }
    fs.ensure_parent(target)
        .map_err(|e| InfraError::io(format!("create parent of {}", target.display()), e))?;
    fs.write(target, &Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", target.display()), e))?;
    Ok(())
}

fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show { dir } => {
            let dir = dir.clone().unwrap_or_else(|| PathBuf::from("."));
            let settings = load_settings(cli, Some(&dir))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Init { global } => {
            let target = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".to_string())
                })?
            } else {
                local_config_path(Path::new("."))
            };
            let container = ServiceContainer::new(Settings::default());
            write_config_template(container.fs.as_ref(), &target)?;
            output::success(&format!("created {}", target.display()));
        }
        ConfigCommands::Path => {
            output::header("Config paths");
            match global_config_path() {
                Some(path) => output::detail(&format!("global: {}", path.display())),
                None => output::detail("global: <unavailable>"),
            }
            output::detail(&format!(
                "local:  {}",
                local_config_path(Path::new(".")).display()
            ));
            if let Some(path) = &cli.config {
                output::detail(&format!("--config: {}", path.display()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawSettings;
    use crate::infrastructure::traits::RealFileSystem;
    use tempfile::TempDir;

    #[test]
    fn given_missing_parent_when_writing_template_then_creates_parseable_config() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("navtoc/navtoc.toml");

        write_config_template(&RealFileSystem, &target).unwrap();

        let content = std::fs::read_to_string(&target).unwrap();
        let raw: RawSettings = toml::from_str(&content).unwrap();
        assert!(raw.supported_languages.is_none());
    }

    #[test]
    fn given_existing_config_when_writing_template_then_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join(".navtoc.toml");
        std::fs::write(&target, "title = \"Mine\"\n").unwrap();

        let err = write_config_template(&RealFileSystem, &target).unwrap_err();

        assert!(matches!(err, CliError::Usage(_)));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "title = \"Mine\"\n");
    }
}
