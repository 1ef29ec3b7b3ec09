//! Expansions of the built-in directives.
//!
//! Each expansion is a code island in the artifact language executed by
//! [`crate::runtime`]. `args` is the raw argument list *including* its
//! parentheses, exactly as written in the template; `None` means no argument
//! list followed the directive name.

use crate::compiler::matcher::{split_arguments, strip_parens};
use crate::compiler::registry::Builtin;
use crate::constants::{CODE_CLOSE, CODE_OPEN, DEFAULT_JSON_DEPTH};
use crate::core::BladeError;
use crate::runtime::expr::PRESENT_TEST;

/// Flags used by `@json` when none are given (`JSON_HEX_TAG | JSON_HEX_APOS |
/// JSON_HEX_AMP | JSON_HEX_QUOT`).
pub const DEFAULT_JSON_FLAGS: u32 = 15;

/// Compiler state that lives for exactly one top-level compile.
#[derive(Debug, Default)]
pub struct CompileState {
    /// Set by `@switch`, consumed by the next `@case`.
    pub first_case_switch: bool,
    /// Nesting depth of open `@forelse` blocks.
    pub empty_counter: usize,
}

fn island(body: &str) -> String {
    format!("{CODE_OPEN} {body} {CODE_CLOSE}")
}

/// Expand one built-in directive.
///
/// # Errors
///
/// Returns [`BladeError::UnbalancedDirective`] for `@empty` without an open
/// `@forelse`.
pub fn compile_builtin(
    builtin: Builtin,
    args: Option<&str>,
    state: &mut CompileState,
) -> Result<String, BladeError> {
    let raw = args.unwrap_or("");
    let inner = strip_parens(raw);

    let compiled = match builtin {
        Builtin::If => island(&format!("if{raw}:")),
        Builtin::Elseif => island(&format!("elseif{raw}:")),
        Builtin::Else => island("else:"),
        Builtin::Endif | Builtin::Endisset | Builtin::Endunless | Builtin::Endforelse => {
            island("endif;")
        }
        Builtin::Unless => island(&format!("if(! {raw}):")),
        Builtin::Isset => {
            let checks: Vec<String> = split_arguments(inner)
                .iter()
                .map(|arg| format!("{arg} is {PRESENT_TEST}"))
                .collect();
            island(&format!("if({}):", checks.join(" and ")))
        }

        Builtin::Switch => {
            state.first_case_switch = true;
            format!("{CODE_OPEN} switch{raw}:")
        }
        Builtin::Case => {
            if state.first_case_switch {
                state.first_case_switch = false;
                format!("case {raw}: {CODE_CLOSE}")
            } else {
                island(&format!("case {raw}:"))
            }
        }
        Builtin::Default => island("default:"),
        Builtin::Endswitch => island("endswitch;"),

        Builtin::Break => compile_jump("break", args),
        Builtin::Continue => compile_jump("continue", args),
        Builtin::Exit => compile_jump("exit", args),

        Builtin::For => island(&format!("for{raw}:")),
        Builtin::Endfor => island("endfor;"),
        Builtin::Foreach => island(&format!("foreach{raw}:")),
        Builtin::Endforeach => island("endforeach;"),
        Builtin::While => island(&format!("while{raw}:")),
        Builtin::Endwhile => island("endwhile;"),

        Builtin::Forelse => {
            state.empty_counter += 1;
            let flag = format!("__empty_{}", state.empty_counter);
            island(&format!("{flag} = true; foreach{raw}: {flag} = false;"))
        }
        Builtin::Empty => {
            if state.empty_counter == 0 {
                return Err(BladeError::UnbalancedDirective {
                    directive: "empty".to_string(),
                    reason: "no @forelse is open".to_string(),
                });
            }
            let compiled =
                island(&format!("endforeach; if(__empty_{}):", state.empty_counter));
            state.empty_counter -= 1;
            compiled
        }

        Builtin::Unset => island(&format!("unset{raw};")),

        Builtin::Extends => island(&format!("extends({inner})")),
        Builtin::Include => island(&format!("include({inner})")),
        Builtin::Yield => island(&format!("yield({inner})")),
        Builtin::Section => island(&format!("begin_block({inner})")),
        Builtin::Endsection | Builtin::Append | Builtin::Stop => island("end_block()"),
        Builtin::Overwrite => island("end_block(true)"),
        Builtin::Show => island("show_block()"),

        Builtin::Php => island(&format!("{inner};")),
        Builtin::Endphp => "@endphp".to_string(),

        Builtin::Json => compile_json(inner),
        Builtin::Method => format!(
            "<input type=\"hidden\" name=\"_method\" value=\"{CODE_OPEN} echo {inner} | upper {CODE_CLOSE}\">\n"
        ),
    };

    Ok(compiled)
}

/// `break`, `continue` and `exit` share three shapes: bare, levelled and guarded.
fn compile_jump(keyword: &str, args: Option<&str>) -> String {
    let Some(raw) = args.filter(|a| !strip_parens(a).trim().is_empty()) else {
        return island(&format!("{keyword};"));
    };

    match strip_parens(raw).trim().parse::<i64>() {
        Ok(levels) => island(&format!("{keyword} {};", levels.max(1))),
        Err(_) => island(&format!("if{raw} {keyword};")),
    }
}

fn compile_json(inner: &str) -> String {
    let parts = split_arguments(inner);
    let value = parts.first().copied().unwrap_or_default();
    let flags = parts
        .get(1)
        .filter(|p| !p.is_empty())
        .map_or_else(|| DEFAULT_JSON_FLAGS.to_string(), |p| (*p).to_string());
    let depth = parts
        .get(2)
        .filter(|p| !p.is_empty())
        .map_or_else(|| DEFAULT_JSON_DEPTH.to_string(), |p| (*p).to_string());

    island(&format!("json({value}, {flags}, {depth})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(builtin: Builtin, args: Option<&str>) -> String {
        compile_builtin(builtin, args, &mut CompileState::default()).unwrap()
    }

    #[test]
    fn test_conditionals() {
        assert_eq!(expand(Builtin::If, Some("(a > 1)")), "<?rs if(a > 1): ?>");
        assert_eq!(expand(Builtin::Elseif, Some("(b)")), "<?rs elseif(b): ?>");
        assert_eq!(expand(Builtin::Else, None), "<?rs else: ?>");
        assert_eq!(expand(Builtin::Unless, Some("(ok)")), "<?rs if(! (ok)): ?>");
        assert_eq!(
            expand(Builtin::Isset, Some("(user, user.name)")),
            "<?rs if(user is present and user.name is present): ?>"
        );
    }

    #[test]
    fn test_jump_forms() {
        assert_eq!(expand(Builtin::Break, None), "<?rs break; ?>");
        assert_eq!(expand(Builtin::Break, Some("(2)")), "<?rs break 2; ?>");
        assert_eq!(expand(Builtin::Break, Some("( 0 )")), "<?rs break 1; ?>");
        assert_eq!(expand(Builtin::Break, Some("(-3)")), "<?rs break 1; ?>");
        assert_eq!(expand(Builtin::Break, Some("(i > 3)")), "<?rs if(i > 3) break; ?>");
        assert_eq!(expand(Builtin::Continue, Some("(done)")), "<?rs if(done) continue; ?>");
        assert_eq!(expand(Builtin::Exit, None), "<?rs exit; ?>");
    }

    #[test]
    fn test_switch_first_case_flag() {
        let mut state = CompileState::default();
        let open = compile_builtin(Builtin::Switch, Some("(kind)"), &mut state).unwrap();
        let first = compile_builtin(Builtin::Case, Some("(1)"), &mut state).unwrap();
        let second = compile_builtin(Builtin::Case, Some("(2)"), &mut state).unwrap();

        assert_eq!(open, "<?rs switch(kind):");
        assert_eq!(first, "case (1): ?>");
        assert_eq!(second, "<?rs case (2): ?>");
    }

    #[test]
    fn test_forelse_counter_tracks_nesting() {
        let mut state = CompileState::default();
        let outer = compile_builtin(Builtin::Forelse, Some("(a as x)"), &mut state).unwrap();
        let inner = compile_builtin(Builtin::Forelse, Some("(b as y)"), &mut state).unwrap();
        let inner_empty = compile_builtin(Builtin::Empty, None, &mut state).unwrap();
        let outer_empty = compile_builtin(Builtin::Empty, None, &mut state).unwrap();

        assert!(outer.contains("__empty_1 = true; foreach(a as x): __empty_1 = false;"));
        assert!(inner.contains("__empty_2 = true;"));
        assert_eq!(inner_empty, "<?rs endforeach; if(__empty_2): ?>");
        assert_eq!(outer_empty, "<?rs endforeach; if(__empty_1): ?>");
        assert_eq!(state.empty_counter, 0);
    }

    #[test]
    fn test_empty_without_forelse_fails() {
        let result = compile_builtin(Builtin::Empty, None, &mut CompileState::default());
        assert!(matches!(result, Err(BladeError::UnbalancedDirective { .. })));
    }

    #[test]
    fn test_layout_directives() {
        assert_eq!(
            expand(Builtin::Extends, Some("('layouts.app')")),
            "<?rs extends('layouts.app') ?>"
        );
        assert_eq!(
            expand(Builtin::Yield, Some("('title', 'Home')")),
            "<?rs yield('title', 'Home') ?>"
        );
        assert_eq!(expand(Builtin::Section, Some("('body')")), "<?rs begin_block('body') ?>");
        assert_eq!(expand(Builtin::Overwrite, None), "<?rs end_block(true) ?>");
        assert_eq!(expand(Builtin::Show, None), "<?rs show_block() ?>");
    }

    #[test]
    fn test_json_defaults_and_quoted_commas() {
        assert_eq!(expand(Builtin::Json, Some("(data)")), "<?rs json(data, 15, 512) ?>");
        assert_eq!(
            expand(Builtin::Json, Some("(['a,b'], JSON_PRETTY_PRINT)")),
            "<?rs json(['a,b'], JSON_PRETTY_PRINT, 512) ?>"
        );
    }

    #[test]
    fn test_php_and_method() {
        assert_eq!(expand(Builtin::Php, Some("(count = 1)")), "<?rs count = 1; ?>");
        assert_eq!(
            expand(Builtin::Method, Some("('put')")),
            "<input type=\"hidden\" name=\"_method\" value=\"<?rs echo 'put' | upper ?>\">\n"
        );
    }
}
