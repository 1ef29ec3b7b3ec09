//! Layout inheritance, sections and includes.

use anyhow::Result;
use blade_cli::core::BladeError;
use blade_cli::test_utils::TestViews;
use serde_json::json;

fn demo_data() -> serde_json::Value {
    json!({
        "title": "blade test",
        "link": "https://github.com/esyede",
        "content": "This is your view content",
        "mytext": "And this should be capitalized",
        "numbers": [1, 2, 3, 4, 5],
    })
}

#[test]
fn test_demo_views_render() -> Result<()> {
    let views = TestViews::with_demo()?;
    let mut blade = views.blade()?;
    blade.register_directive("uppercase", |args| format!("<?rs echo {args} | upper ?>"))?;

    let html = blade.render("home.index", &demo_data())?;

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>blade test</title>"));
    assert!(html.contains("<header><a href=\"https://github.com/esyede\">blade test</a></header>"));
    assert!(html.contains("<p>AND THIS SHOULD BE CAPITALIZED</p>"));
    assert!(html.contains("Odd numbers under 5:"));
    assert!(html.contains("first:"));
    assert!(html.contains(":last"));
    assert!(html.contains("<footer>Powered by Blade</footer>"));
    for odd in ["1", "3", "5"] {
        assert!(html.contains(&format!("        {odd}\n")), "missing {odd} in:\n{html}");
    }
    assert!(!html.contains("        2\n"));
    Ok(())
}

#[test]
fn test_fixture_folder_matches_demo_views() -> Result<()> {
    let cache = tempfile::tempdir()?;
    let blade = blade_cli::engine::Blade::new(super::fixture_views(), cache.path())?;
    let html = blade.render("home/index", &demo_data())?;
    assert!(html.contains("<title>blade test</title>"));
    // unregistered directives stay as written
    assert!(html.contains("@uppercase(mytext)"));
    Ok(())
}

#[test]
fn test_three_level_chain() -> Result<()> {
    let views = TestViews::new()?;
    views.write(
        "pages.post",
        "@extends('layouts.blog')@section('title')Post@endsection@section('body')text@endsection",
    )?;
    views.write(
        "layouts.blog",
        "@extends('layouts.base')@section('body')<article>@yield('body')</article>@overwrite",
    )?;
    views.write(
        "layouts.base",
        "<title>@yield('title', 'Site')</title><main>@yield('body')</main>",
    )?;

    let blade = views.blade()?;
    assert_eq!(
        blade.render("pages.post", &json!({}))?,
        "<title>Post</title><main><article>text</article></main>"
    );
    assert_eq!(blade.render("layouts.base", &json!({}))?, "<title>Site</title><main></main>");
    Ok(())
}

#[test]
fn test_child_section_accumulates_with_parent_default() -> Result<()> {
    let views = TestViews::new()?;
    views.write("child", "@extends('parent')@section('scripts')<child>@append")?;
    views.write("parent", "@section('scripts')<parent>@endsection@yield('scripts')")?;

    let blade = views.blade()?;
    assert_eq!(blade.render("child", &json!({}))?, "<child><parent>");
    Ok(())
}

#[test]
fn test_include_missing_template_names_suggestions() -> Result<()> {
    let views = TestViews::new()?;
    views.write("page", "@include('partials.nav')")?;
    views.write("partials.navbar", "nav")?;

    let blade = views.blade()?;
    let err = blade.render("page", &json!({})).unwrap_err();
    let BladeError::TemplateNotFound { name, suggestions, .. } = err else {
        panic!("expected TemplateNotFound, got {err:?}");
    };
    assert_eq!(name, "partials.nav");
    assert_eq!(suggestions, vec!["partials.navbar".to_string()]);
    Ok(())
}

#[test]
fn test_include_sees_and_sets_variables() -> Result<()> {
    let views = TestViews::new()?;
    views.write("page", "@foreach(items as item)@include('row')@endforeach{{ rows }}")?;
    views.write("row", "[{{ item }}]@php(rows += 1)")?;

    let blade = views.blade()?;
    assert_eq!(blade.render("page", &json!({"items": ["a", "b"], "rows": 0}))?, "[a][b]2");
    Ok(())
}
