//! `blade render`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use serde_json::{Map, Value};

use crate::engine::Blade;
use crate::utils::safe_write;

/// Render a template.
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Template name (`home.index`, `home/index`)
    name: String,

    /// Data file: `.json`, `.yaml`/`.yml` or `.toml`
    #[arg(short, long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// Extra variable; the value is parsed as JSON when possible
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    vars: Vec<(String, Value)>,

    /// Write the output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl RenderCommand {
    pub async fn execute(self, blade: &Blade, quiet: bool) -> Result<()> {
        let mut data = match &self.data {
            Some(path) => load_data(path).await?,
            None => Map::new(),
        };
        for (key, value) in self.vars {
            data.insert(key, value);
        }

        let output = blade.render(&self.name, &data)?;

        match &self.output {
            Some(path) => {
                safe_write(path, &output)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::info!("Rendered '{}' to {}", self.name, path.display());
                if !quiet {
                    eprintln!(
                        "{} Rendered {} to {}",
                        "✓".green(),
                        self.name.bold(),
                        path.display()
                    );
                }
            }
            None => print!("{output}"),
        }
        Ok(())
    }
}

/// Read a data file and check that it holds an object.
async fn load_data(path: &Path) -> Result<Map<String, Value>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read data file {}", path.display()))?;

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let value: Value = match extension.to_ascii_lowercase().as_str() {
        "json" => serde_json::from_str(&text)?,
        "yaml" | "yml" => serde_yaml::from_str(&text)?,
        "toml" => toml::from_str(&text)?,
        other => {
            bail!("Unsupported data file type '.{other}' (expected .json, .yaml, .yml or .toml)")
        }
    };

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => bail!("Data file {} must contain a table/object at the top level", path.display()),
    }
}

fn parse_var(raw: &str) -> Result<(String, Value), String> {
    let (key, value) =
        raw.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing variable name in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_parse_var() {
        assert_eq!(parse_var("count=3").unwrap(), ("count".to_string(), json!(3)));
        assert_eq!(
            parse_var("title=Hello world").unwrap(),
            ("title".to_string(), json!("Hello world"))
        );
        assert_eq!(parse_var("flags=[1,2]").unwrap(), ("flags".to_string(), json!([1, 2])));
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=x").is_err());
    }

    #[tokio::test]
    async fn test_load_data_formats() -> Result<()> {
        let dir = tempdir()?;
        let json_path = dir.path().join("d.json");
        let yaml_path = dir.path().join("d.yaml");
        let toml_path = dir.path().join("d.toml");
        std::fs::write(&json_path, r#"{"title": "t", "n": [1, 2]}"#)?;
        std::fs::write(&yaml_path, "title: t\nn:\n  - 1\n  - 2\n")?;
        std::fs::write(&toml_path, "title = \"t\"\nn = [1, 2]\n")?;

        let expected = json!({"title": "t", "n": [1, 2]});
        for path in [&json_path, &yaml_path, &toml_path] {
            assert_eq!(Value::Object(load_data(path).await?), expected);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_load_data_rejects_non_objects() -> Result<()> {
        let dir = tempdir()?;
        let list = dir.path().join("list.json");
        let text = dir.path().join("data.txt");
        std::fs::write(&list, "[1]")?;
        std::fs::write(&text, "x")?;

        assert!(load_data(&list).await.is_err());
        assert!(load_data(&text).await.is_err());
        Ok(())
    }
}
