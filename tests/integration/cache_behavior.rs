//! Freshness checks and the on-disk artifact cache.

use std::time::{Duration, SystemTime};

use anyhow::Result;
use blade_cli::cache::artifact_key;
use blade_cli::test_utils::{DEMO_VIEWS, TestViews};
use serde_json::json;

#[test]
fn test_artifacts_are_reused_until_the_source_changes() -> Result<()> {
    let views = TestViews::with_demo()?;
    let blade = views.blade()?;
    let data = json!({"title": "t", "link": "/", "content": "c", "numbers": [1]});

    blade.render("home.index", &data)?;
    assert_eq!(blade.compile_count(), DEMO_VIEWS.len());
    assert_eq!(views.artifacts()?.len(), DEMO_VIEWS.len());

    blade.render("home.index", &data)?;
    assert_eq!(blade.compile_count(), DEMO_VIEWS.len());

    views.write("shared.footer", "<footer>changed</footer>")?;
    views.set_modified("shared.footer", SystemTime::now() + Duration::from_secs(60))?;
    let html = blade.render("home.index", &data)?;
    assert!(html.contains("<footer>changed</footer>"));
    assert_eq!(blade.compile_count(), DEMO_VIEWS.len() + 1);
    Ok(())
}

#[test]
fn test_persisted_artifacts_survive_a_new_engine() -> Result<()> {
    let views = TestViews::with_demo()?;
    views.blade()?.compile("shared.header")?;

    let fresh = views.blade()?;
    assert_eq!(
        fresh.render("shared.header", &json!({"title": "x", "link": "/"}))?,
        "<header><a href=\"/\">x</a></header>\n"
    );
    assert_eq!(fresh.compile_count(), 0);
    Ok(())
}

#[test]
fn test_artifact_file_naming() -> Result<()> {
    let views = TestViews::with_demo()?;
    let blade = views.blade()?;
    blade.compile("/shared/layout")?;

    let expected = views.cache_folder.join(format!("{}.compiled", artifact_key("shared.layout")));
    assert_eq!(views.artifacts()?, vec![expected.clone()]);

    let name = expected.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    assert!(name.starts_with("shared.layout__"));
    assert_eq!(name.len(), "shared.layout__".len() + 64 + ".compiled".len());
    Ok(())
}

#[test]
fn test_clear_cache_forces_recompile() -> Result<()> {
    let views = TestViews::with_demo()?;
    let blade = views.blade()?;
    blade.compile("shared.header")?;
    blade.compile("shared.footer")?;

    assert_eq!(blade.clear_cache()?, 2);
    assert!(views.artifacts()?.is_empty());

    blade.compile("shared.header")?;
    assert_eq!(blade.compile_count(), 3);
    Ok(())
}

#[test]
fn test_compiled_output_is_deterministic() -> Result<()> {
    let views = TestViews::with_demo()?;
    let first = views.blade()?.compile("home.index")?;
    views.blade()?.clear_cache()?;
    let second = views.blade()?.compile("home.index")?;
    assert_eq!(first, second);
    Ok(())
}
