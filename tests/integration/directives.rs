//! Directive behavior over real view files.

use anyhow::Result;
use blade_cli::core::BladeError;
use blade_cli::test_utils::TestViews;
use serde_json::json;

#[test]
fn test_nested_forelse_gate_their_own_empty() -> Result<()> {
    let views = TestViews::new()?;
    views.write(
        "lists",
        "@forelse(groups as group)[@forelse(group as item){{ item }}@empty-@endforelse]@empty none@endforelse",
    )?;
    let blade = views.blade()?;

    assert_eq!(blade.render("lists", &json!({"groups": [[1, 2], []]}))?, "[12][-]");
    assert_eq!(blade.render("lists", &json!({"groups": []}))?, " none");
    Ok(())
}

#[test]
fn test_switch_with_several_cases() -> Result<()> {
    let views = TestViews::new()?;
    views.write(
        "status",
        "@switch(code)\n@case(200)\nok\n@break\n@case(404)\nmissing\n@break\n@default\nerror\n@endswitch",
    )?;
    let blade = views.blade()?;

    assert_eq!(blade.render("status", &json!({"code": 200}))?, "ok\n");
    assert_eq!(blade.render("status", &json!({"code": "404"}))?, "missing\n");
    assert_eq!(blade.render("status", &json!({"code": 500}))?, "error\n");
    Ok(())
}

#[test]
fn test_unless_isset_and_comments() -> Result<()> {
    let views = TestViews::new()?;
    views.write(
        "page",
        "{{-- hidden --}}@unless(admin)guest@endunless@isset(user.name)|{{ user.name }}@endisset",
    )?;
    let blade = views.blade()?;

    assert_eq!(
        blade.render("page", &json!({"admin": false, "user": {"name": "Ana"}}))?,
        "guest|Ana"
    );
    assert_eq!(blade.render("page", &json!({"admin": true}))?, "");
    Ok(())
}

#[test]
fn test_method_and_json_helpers() -> Result<()> {
    let views = TestViews::new()?;
    views.write("form", "<form>@method('put')</form><script>let s = @json(settings);</script>")?;
    let blade = views.blade()?;

    let html = blade.render("form", &json!({"settings": {"path": "a/b"}}))?;
    assert_eq!(
        html,
        "<form><input type=\"hidden\" name=\"_method\" value=\"PUT\">\n</form><script>let s = {\"path\":\"a\\/b\"};</script>"
    );
    Ok(())
}

#[test]
fn test_raw_php_block_and_set() -> Result<()> {
    let views = TestViews::new()?;
    views.write(
        "calc",
        "@php\n    total = 2;\n    total += 3;\n@endphp@set('label', 'sum')\n{{ label }}={{ total }}",
    )?;
    let blade = views.blade()?;
    assert_eq!(blade.render("calc", &json!({}))?, "sum=5");
    Ok(())
}

#[test]
fn test_custom_directive_overrides_builtin_with_arguments() -> Result<()> {
    let views = TestViews::new()?;
    views.write("page", "@json(v)|@shout()|@shout(v)")?;
    let mut blade = views.blade()?;
    blade.register_directive("json", |args| format!("<?rs echo {args} ?>"))?;
    blade.register_directive("shout", |args| format!("<?rs echo {args} ~ '!' ?>"))?;

    assert_eq!(blade.render("page", &json!({"v": 7}))?, "7|@shout()|7!");
    Ok(())
}

#[test]
fn test_stray_empty_fails_to_compile() -> Result<()> {
    let views = TestViews::new()?;
    views.write("broken", "@empty")?;
    let blade = views.blade()?;

    let result = blade.render("broken", &json!({}));
    assert!(matches!(result, Err(BladeError::UnbalancedDirective { .. })));
    assert!(views.artifacts()?.is_empty());
    Ok(())
}
