//! The `blade` binary.

use anyhow::Result;
use assert_cmd::Command;
use blade_cli::test_utils::TestViews;
use predicates::prelude::*;

fn blade(views: &TestViews) -> Result<Command> {
    let mut cmd = Command::cargo_bin("blade")?;
    cmd.current_dir(views.root())
        .env_remove("BLADE_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--views")
        .arg(&views.view_folder)
        .arg("--cache-dir")
        .arg(&views.cache_folder);
    Ok(cmd)
}

#[test]
fn test_render_with_data_file_and_vars() -> Result<()> {
    let views = TestViews::with_demo()?;
    let data = views.root().join("data.yaml");
    std::fs::write(&data, "title: From YAML\nlink: /home\ncontent: Body\nnumbers: [1, 2, 3]\n")?;

    blade(&views)?
        .args(["render", "home.index", "--data"])
        .arg(&data)
        .args(["--var", "footer=Custom footer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<title>From YAML</title>"))
        .stdout(predicate::str::contains("<footer>Custom footer</footer>"))
        .stdout(predicate::str::contains("Odd numbers under 3:"));
    Ok(())
}

#[test]
fn test_render_to_output_file() -> Result<()> {
    let views = TestViews::new()?;
    views.write("hello", "Hello {{ name }}")?;
    let output = views.root().join("out/hello.html");

    blade(&views)?
        .args(["render", "hello", "--var", "name=World", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(std::fs::read_to_string(&output)?, "Hello World");
    Ok(())
}

#[test]
fn test_missing_template_reports_suggestion() -> Result<()> {
    let views = TestViews::with_demo()?;

    blade(&views)?
        .args(["render", "home.indx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("View file not found"))
        .stderr(predicate::str::contains("Did you mean: home.index?"));
    Ok(())
}

#[test]
fn test_compile_prints_artifact() -> Result<()> {
    let views = TestViews::new()?;
    views.write("cond", "@if(ok)yes@endif")?;

    blade(&views)?
        .args(["compile", "cond"])
        .assert()
        .success()
        .stdout("<?rs if(ok): ?>yes<?rs endif; ?>");
    assert_eq!(views.artifacts()?.len(), 1);
    Ok(())
}

#[test]
fn test_clear_cache() -> Result<()> {
    let views = TestViews::with_demo()?;
    views.blade()?.compile("shared.header")?;

    blade(&views)?
        .arg("clear-cache")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 compiled template(s)"));
    assert!(views.artifacts()?.is_empty());
    Ok(())
}

#[test]
fn test_config_file_is_picked_up_from_cwd() -> Result<()> {
    let views = TestViews::new()?;
    views.write("raw", "{{ html }}")?;
    std::fs::write(
        views.root().join("blade.toml"),
        "view_folder = \"views\"\necho_format = \"%s\"\ncache = \"memory\"\n",
    )?;

    Command::cargo_bin("blade")?
        .current_dir(views.root())
        .env_remove("BLADE_CONFIG")
        .args(["render", "raw", "--var", "html=<b>"])
        .assert()
        .success()
        .stdout("<b>");
    assert!(!views.cache_folder.exists());
    Ok(())
}

#[test]
fn test_invalid_data_file_type() -> Result<()> {
    let views = TestViews::with_demo()?;
    let data = views.root().join("data.ini");
    std::fs::write(&data, "a=1")?;

    blade(&views)?
        .args(["render", "shared.header", "--data"])
        .arg(&data)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported data file type"));
    Ok(())
}
