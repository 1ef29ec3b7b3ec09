use std::path::PathBuf;

use clap::Parser;

use super::*;

#[test]
fn test_global_options_after_subcommand() {
    let cli =
        Cli::try_parse_from(["blade", "render", "home.index", "--views", "site", "-q"]).unwrap();
    assert!(cli.quiet);
    assert_eq!(cli.views, Some(PathBuf::from("site")));
    assert!(matches!(cli.command, Commands::Render(_)));
}

#[test]
fn test_verbose_and_quiet_conflict() {
    assert!(Cli::try_parse_from(["blade", "-v", "-q", "clear-cache"]).is_err());
}

#[test]
fn test_quiet_disables_logging() {
    let cli = Cli::try_parse_from(["blade", "--quiet", "compile", "page"]).unwrap();
    assert!(cli.log_filter().is_none());

    let cli = Cli::try_parse_from(["blade", "--verbose", "compile", "page"]).unwrap();
    assert_eq!(cli.log_filter().map(|f| f.to_string()), Some("debug".to_string()));
}

#[test]
fn test_folder_overrides() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("blade.toml");
    std::fs::write(&config_path, "view_folder = \"from-file\"\necho_format = \"%s\"\n")?;

    let cli = Cli::try_parse_from([
        "blade",
        "--config",
        config_path.to_str().unwrap_or_default(),
        "--cache-dir",
        "/tmp/blade-test-cache",
        "clear-cache",
    ])?;
    let config = cli.build_config()?;
    assert_eq!(config.view_folder, dir.path().join("from-file"));
    assert_eq!(config.cache_folder, PathBuf::from("/tmp/blade-test-cache"));
    assert_eq!(config.echo_format, "%s");
    Ok(())
}
