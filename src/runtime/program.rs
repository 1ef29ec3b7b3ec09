//! Statement parsing and program trees.
//!
//! [`Program::parse`] turns a compiled artifact into a tree of [`Node`]s: block
//! statements (`if`, `switch`, the loops) are matched with their closers, every
//! other statement is a leaf. Expressions stay opaque strings.

use std::sync::LazyLock;

use regex::Regex;

use crate::compiler::matcher::{matching_paren, split_arguments, split_top_level, strip_parens};
use crate::core::BladeError;
use crate::runtime::artifact::{Segment, lex};

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^([A-Za-z_]\w*)\s*(\+\+|--|\+=|-=|=)(.*)$").expect("valid assignment pattern")
});

/// A boolean test, optionally negated with a leading `!`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Whether the result is inverted
    pub negated: bool,
    /// The expression to test
    pub expression: String,
}

impl Condition {
    /// Parse `!(expr)`, `! (expr)` or `expr`; one enclosing pair of parentheses is
    /// removed after a leading `!`.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut negated = false;
        let mut rest = strip_parens(text);
        while let Some(inner) = rest.strip_prefix('!') {
            negated = !negated;
            rest = strip_parens(inner);
        }
        Self {
            negated,
            expression: rest.to_string(),
        }
    }
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Set,
    /// `+=`
    Add,
    /// `-=`
    Sub,
    /// `++`
    Increment,
    /// `--`
    Decrement,
}

/// `name op value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Target variable
    pub name: String,
    /// Operator
    pub op: AssignOp,
    /// Right-hand side (empty for `++`/`--`)
    pub value: String,
}

/// `break`, `continue` or `exit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    /// Leave the enclosing loop or switch
    Break,
    /// Next iteration of the enclosing loop
    Continue,
    /// Stop rendering
    Exit,
}

/// Header of a `foreach` loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeachHeader {
    /// Expression producing the collection
    pub collection: String,
    /// Variable bound to the key or index, if any
    pub key: Option<String>,
    /// Variable bound to the element
    pub value: String,
}

impl ForeachHeader {
    /// Parse `xs as v`, `xs as k => v`, `v in xs` or `k, v in xs`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        if let Some((collection, binding)) = rsplit_keyword(text, "as") {
            let (key, value) = match binding.split_once("=>") {
                Some((k, v)) => (Some(k.trim().to_string()), v.trim().to_string()),
                None => (None, binding.trim().to_string()),
            };
            return Some(Self {
                collection: collection.trim().to_string(),
                key,
                value,
            });
        }

        let (binding, collection) = split_keyword(text, "in")?;
        let (key, value) = match binding.split_once(',') {
            Some((k, v)) => (Some(k.trim().to_string()), v.trim().to_string()),
            None => (None, binding.trim().to_string()),
        };
        Some(Self {
            collection: collection.trim().to_string(),
            key,
            value,
        })
    }
}

/// One executable statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `if(C):`
    If(Condition),
    /// `elseif(C):`
    ElseIf(Condition),
    /// `else:`
    Else,
    /// `endif;`
    EndIf,
    /// `switch(E):`
    Switch(String),
    /// `case E:`
    Case(String),
    /// `default:`
    Default,
    /// `endswitch;`
    EndSwitch,
    /// `for(I; C; S):`
    For {
        /// Comma-separated initialisers
        init: Vec<Statement>,
        /// Comma-separated conditions; the last one decides
        conditions: Vec<String>,
        /// Comma-separated step statements
        step: Vec<Statement>,
    },
    /// `endfor;`
    EndFor,
    /// `foreach(H):`
    Foreach(ForeachHeader),
    /// `endforeach;`
    EndForeach,
    /// `while(C):`
    While(Condition),
    /// `endwhile;`
    EndWhile,
    /// `break N`, `if(C) continue`, ...
    Jump {
        /// Which jump
        kind: JumpKind,
        /// Number of levels (at least 1)
        levels: usize,
        /// Optional guard
        guard: Option<Condition>,
    },
    /// Assignment into the render scope
    Assign(Assignment),
    /// `unset(a, b)`
    Unset(Vec<String>),
    /// `echo E` or `echo esc(E[, charset])`
    Echo {
        /// Expression to print
        expression: String,
        /// Whether to HTML-escape the output
        escape: bool,
        /// Charset expression for `esc(E, charset)`
        charset: Option<String>,
    },
    /// `extends(E)`
    Extends(String),
    /// `include(E)`
    Include(String),
    /// `yield(E[, D])`
    Yield {
        /// Block name expression
        name: String,
        /// Default expression
        default: Option<String>,
    },
    /// `begin_block(E)`
    BeginBlock(String),
    /// `end_block()` / `end_block(true)`
    EndBlock {
        /// Replace instead of append
        overwrite: bool,
    },
    /// `show_block()`
    ShowBlock,
    /// `json(E, FLAGS, DEPTH)`
    Json {
        /// Value expression
        expression: String,
        /// Flag list (`JSON_*` names or integers joined by `|`)
        flags: String,
        /// Maximum nesting depth
        depth: String,
    },
    /// Any other text, evaluated for its side effects
    Expression(String),
}

impl Statement {
    /// Parse one trimmed statement.
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::ArtifactSyntax`] for an `if(...)` followed by anything
    /// other than a jump, or a malformed `for`/`foreach` header.
    pub fn parse(text: &str, template: &str) -> Result<Self, BladeError> {
        let syntax = |reason: String| BladeError::ArtifactSyntax {
            template: template.to_string(),
            reason,
        };

        match text {
            "else" => return Ok(Self::Else),
            "endif" => return Ok(Self::EndIf),
            "default" => return Ok(Self::Default),
            "endswitch" => return Ok(Self::EndSwitch),
            "endfor" => return Ok(Self::EndFor),
            "endforeach" => return Ok(Self::EndForeach),
            "endwhile" => return Ok(Self::EndWhile),
            _ => {}
        }

        if let Some(jump) = parse_jump(text, None) {
            return Ok(jump);
        }

        if let Some((inner, rest)) = call(text, "if") {
            let condition = Condition::parse(inner);
            if rest.is_empty() {
                return Ok(Self::If(condition));
            }
            return parse_jump(rest, Some(condition))
                .ok_or_else(|| syntax(format!("unsupported statement after if(...): `{rest}`")));
        }
        if let Some((inner, _)) = call(text, "elseif") {
            return Ok(Self::ElseIf(Condition::parse(inner)));
        }
        if let Some((inner, _)) = call(text, "switch") {
            return Ok(Self::Switch(inner.trim().to_string()));
        }
        if let Some(rest) = keyword(text, "case") {
            return Ok(Self::Case(rest.to_string()));
        }
        if let Some((inner, _)) = call(text, "for") {
            return parse_for(inner, template);
        }
        if let Some((inner, _)) = call(text, "foreach") {
            return ForeachHeader::parse(inner)
                .map(Self::Foreach)
                .ok_or_else(|| syntax(format!("invalid foreach header `{inner}`")));
        }
        if let Some((inner, _)) = call(text, "while") {
            return Ok(Self::While(Condition::parse(inner)));
        }
        if let Some((inner, _)) = call(text, "unset") {
            return Ok(Self::Unset(
                split_arguments(inner)
                    .into_iter()
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .collect(),
            ));
        }
        if let Some(rest) = keyword(text, "echo") {
            return Ok(parse_echo(rest));
        }
        if let Some((inner, _)) = call(text, "extends") {
            return Ok(Self::Extends(inner.trim().to_string()));
        }
        if let Some((inner, _)) = call(text, "include") {
            return Ok(Self::Include(inner.trim().to_string()));
        }
        if let Some((inner, _)) = call(text, "yield") {
            let args = split_arguments(inner);
            return Ok(Self::Yield {
                name: args.first().copied().unwrap_or_default().to_string(),
                default: args.get(1).map(|d| (*d).to_string()),
            });
        }
        if let Some((inner, _)) = call(text, "begin_block") {
            return Ok(Self::BeginBlock(inner.trim().to_string()));
        }
        if let Some((inner, _)) = call(text, "end_block") {
            return Ok(Self::EndBlock {
                overwrite: inner.trim() == "true",
            });
        }
        if call(text, "show_block").is_some() {
            return Ok(Self::ShowBlock);
        }
        if let Some((inner, _)) = call(text, "json") {
            let args = split_arguments(inner);
            return Ok(Self::Json {
                expression: args.first().copied().unwrap_or_default().to_string(),
                flags: args.get(1).copied().unwrap_or("0").to_string(),
                depth: args.get(2).copied().unwrap_or("512").to_string(),
            });
        }

        if let Some(assignment) = parse_assignment(text) {
            return Ok(Self::Assign(assignment));
        }
        Ok(Self::Expression(text.to_string()))
    }

    fn name(&self) -> &'static str {
        match self {
            Self::ElseIf(_) => "elseif",
            Self::Else => "else",
            Self::EndIf => "endif",
            Self::Case(_) => "case",
            Self::Default => "default",
            Self::EndSwitch => "endswitch",
            Self::EndFor => "endfor",
            Self::EndForeach => "endforeach",
            Self::EndWhile => "endwhile",
            _ => "statement",
        }
    }
}

/// A node of the executable tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal output
    Text(String),
    /// A leaf statement
    Statement(Statement),
    /// `if` / `elseif` / `else`
    If {
        /// Tested in order; the first true one runs
        branches: Vec<(Condition, Vec<Node>)>,
        /// Runs when no branch matched
        otherwise: Option<Vec<Node>>,
    },
    /// `switch` with fall-through
    Switch {
        /// Subject expression
        subject: String,
        /// Case expression (`None` for `default`) and the body index it starts at
        labels: Vec<(Option<String>, usize)>,
        /// All nodes of the switch body
        body: Vec<Node>,
    },
    /// C-style loop
    For {
        /// Initialisers
        init: Vec<Statement>,
        /// Conditions
        conditions: Vec<String>,
        /// Step statements
        step: Vec<Statement>,
        /// Loop body
        body: Vec<Node>,
    },
    /// Collection loop
    Foreach {
        /// Header
        header: ForeachHeader,
        /// Loop body
        body: Vec<Node>,
    },
    /// Condition loop
    While {
        /// Condition
        condition: Condition,
        /// Loop body
        body: Vec<Node>,
    },
}

/// A parsed artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Template the artifact was compiled from
    pub template: String,
    /// Top-level nodes
    pub nodes: Vec<Node>,
}

enum Frame {
    If {
        branches: Vec<(Condition, Vec<Node>)>,
        pending: Option<Condition>,
    },
    Switch {
        subject: String,
        labels: Vec<(Option<String>, usize)>,
    },
    For {
        init: Vec<Statement>,
        conditions: Vec<String>,
        step: Vec<Statement>,
    },
    Foreach(ForeachHeader),
    While(Condition),
}

impl Frame {
    fn opener(&self) -> &'static str {
        match self {
            Self::If { .. } => "if",
            Self::Switch { .. } => "switch",
            Self::For { .. } => "for",
            Self::Foreach(_) => "foreach",
            Self::While(_) => "while",
        }
    }
}

impl Program {
    /// Lex and parse a compiled artifact.
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::ArtifactSyntax`] when block statements are not
    /// properly nested or a statement cannot be parsed.
    pub fn parse(template: &str, artifact: &str) -> Result<Self, BladeError> {
        let syntax = |reason: String| BladeError::ArtifactSyntax {
            template: template.to_string(),
            reason,
        };

        let mut root: Vec<Node> = Vec::new();
        let mut stack: Vec<(Frame, Vec<Node>)> = Vec::new();

        for segment in lex(artifact) {
            let statement = match segment {
                Segment::Text(text) => {
                    current(&mut root, &mut stack).push(Node::Text(text));
                    continue;
                }
                Segment::Code(code) => Statement::parse(&code, template)?,
            };

            match statement {
                Statement::If(condition) => stack.push((
                    Frame::If {
                        branches: Vec::new(),
                        pending: Some(condition),
                    },
                    Vec::new(),
                )),
                Statement::Switch(subject) => stack.push((
                    Frame::Switch {
                        subject,
                        labels: Vec::new(),
                    },
                    Vec::new(),
                )),
                Statement::For {
                    init,
                    conditions,
                    step,
                } => stack.push((
                    Frame::For {
                        init,
                        conditions,
                        step,
                    },
                    Vec::new(),
                )),
                Statement::Foreach(header) => stack.push((Frame::Foreach(header), Vec::new())),
                Statement::While(condition) => stack.push((Frame::While(condition), Vec::new())),

                Statement::ElseIf(_) | Statement::Else => {
                    let Some((Frame::If { branches, pending }, body)) = stack.last_mut() else {
                        let name = statement.name();
                        return Err(syntax(format!("`{name}` outside of an if block")));
                    };
                    let Some(condition) = pending.take() else {
                        return Err(syntax(format!("`{}` after else", statement.name())));
                    };
                    branches.push((condition, std::mem::take(body)));
                    if let Statement::ElseIf(next) = statement {
                        *pending = Some(next);
                    }
                }
                Statement::Case(_) | Statement::Default => {
                    let Some((Frame::Switch { labels, .. }, body)) = stack.last_mut() else {
                        let name = statement.name();
                        return Err(syntax(format!("`{name}` outside of a switch block")));
                    };
                    let label = match statement {
                        Statement::Case(expression) => Some(expression),
                        _ => None,
                    };
                    labels.push((label, body.len()));
                }

                Statement::EndIf
                | Statement::EndSwitch
                | Statement::EndFor
                | Statement::EndForeach
                | Statement::EndWhile => {
                    let closer = statement.name();
                    let Some((frame, body)) = stack.pop() else {
                        return Err(syntax(format!("`{closer}` without an open block")));
                    };
                    if closer != format!("end{}", frame.opener()) {
                        let opener = frame.opener();
                        return Err(syntax(format!("`{closer}` closes a `{opener}` block")));
                    }
                    let node = close_frame(frame, body);
                    current(&mut root, &mut stack).push(node);
                }

                leaf => current(&mut root, &mut stack).push(Node::Statement(leaf)),
            }
        }

        if let Some((frame, _)) = stack.last() {
            return Err(syntax(format!("`{}` block is never closed", frame.opener())));
        }

        Ok(Self {
            template: template.to_string(),
            nodes: root,
        })
    }
}

fn current<'a>(root: &'a mut Vec<Node>, stack: &'a mut [(Frame, Vec<Node>)]) -> &'a mut Vec<Node> {
    match stack.last_mut() {
        Some((_, body)) => body,
        None => root,
    }
}

fn close_frame(frame: Frame, body: Vec<Node>) -> Node {
    match frame {
        Frame::If {
            mut branches,
            pending,
        } => {
            let otherwise = match pending {
                Some(condition) => {
                    branches.push((condition, body));
                    None
                }
                None => Some(body),
            };
            Node::If {
                branches,
                otherwise,
            }
        }
        Frame::Switch { subject, labels } => Node::Switch {
            subject,
            labels,
            body,
        },
        Frame::For {
            init,
            conditions,
            step,
        } => Node::For {
            init,
            conditions,
            step,
            body,
        },
        Frame::Foreach(header) => Node::Foreach { header, body },
        Frame::While(condition) => Node::While { condition, body },
    }
}

/// Match `name(...)` (optionally with spaces before the parenthesis) at the
/// start of `text`, returning the argument text and whatever follows it.
fn call<'a>(text: &'a str, name: &str) -> Option<(&'a str, &'a str)> {
    let rest = text.strip_prefix(name)?;
    let open = rest.len() - rest.trim_start().len();
    if rest.as_bytes().get(open) != Some(&b'(') {
        return None;
    }
    let close = matching_paren(rest, open)?;
    Some((&rest[open + 1..close], rest[close + 1..].trim()))
}

/// Match a bare keyword followed by whitespace (or end of text) and return the rest.
fn keyword<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(word)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

fn parse_jump(text: &str, guard: Option<Condition>) -> Option<Statement> {
    let kinds = [
        ("break", JumpKind::Break),
        ("continue", JumpKind::Continue),
        ("exit", JumpKind::Exit),
    ];
    let (kind, rest) = kinds
        .iter()
        .find_map(|(word, kind)| keyword(text, word).map(|rest| (*kind, rest)))?;

    let levels = if rest.is_empty() {
        1
    } else {
        usize::try_from(rest.parse::<i64>().ok()?.max(1)).ok()?
    };
    Some(Statement::Jump {
        kind,
        levels,
        guard,
    })
}

fn parse_for(inner: &str, template: &str) -> Result<Statement, BladeError> {
    let parts = split_top_level(inner, |c| c == ';');
    let [(init, _), (conditions, _), (step, _)] = parts.as_slice() else {
        return Err(BladeError::ArtifactSyntax {
            template: template.to_string(),
            reason: format!("for header needs three parts: `{inner}`"),
        });
    };

    let statements = |list: &str| -> Result<Vec<Statement>, BladeError> {
        split_arguments(list)
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(|s| Statement::parse(s, template))
            .collect()
    };

    Ok(Statement::For {
        init: statements(*init)?,
        conditions: split_arguments(*conditions)
            .into_iter()
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect(),
        step: statements(*step)?,
    })
}

fn parse_echo(rest: &str) -> Statement {
    if let Some((inner, "")) = call(rest, "esc") {
        let args = split_arguments(inner);
        return Statement::Echo {
            expression: args.first().copied().unwrap_or_default().to_string(),
            escape: true,
            charset: args.get(1).map(|c| (*c).to_string()),
        };
    }

    Statement::Echo {
        expression: rest.to_string(),
        escape: false,
        charset: None,
    }
}

fn parse_assignment(text: &str) -> Option<Assignment> {
    let caps = ASSIGNMENT.captures(text)?;
    let value = caps[3].trim();
    let op = match &caps[2] {
        "=" if caps[3].starts_with('=') => return None,
        "=" => AssignOp::Set,
        "+=" => AssignOp::Add,
        "-=" => AssignOp::Sub,
        "++" if value.is_empty() => AssignOp::Increment,
        "--" if value.is_empty() => AssignOp::Decrement,
        _ => return None,
    };
    Some(Assignment {
        name: caps[1].to_string(),
        op,
        value: value.to_string(),
    })
}

/// Byte ranges of `word` standing alone (surrounded by whitespace) outside
/// strings and brackets.
fn keyword_positions(text: &str, word: &str) -> Vec<(usize, usize)> {
    let mut positions = Vec::new();
    let mut offset = 0;
    for (piece, separator) in split_top_level(text, char::is_whitespace) {
        let start = offset;
        offset += piece.len() + separator.map_or(0, char::len_utf8);
        if piece == word && start > 0 && separator.is_some() {
            positions.push((start, start + word.len()));
        }
    }
    positions
}

fn split_keyword<'a>(text: &'a str, word: &str) -> Option<(&'a str, &'a str)> {
    let (start, end) = *keyword_positions(text, word).first()?;
    Some((&text[..start], &text[end..]))
}

fn rsplit_keyword<'a>(text: &'a str, word: &str) -> Option<(&'a str, &'a str)> {
    let (start, end) = *keyword_positions(text, word).last()?;
    Some((&text[..start], &text[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Statement {
        Statement::parse(text, "test").unwrap()
    }

    #[test]
    fn test_condition_negation() {
        assert_eq!(
            Condition::parse("! (a > 1)"),
            Condition {
                negated: true,
                expression: "a > 1".to_string()
            }
        );
        assert!(!Condition::parse("!!ok").negated);
        assert_eq!(Condition::parse("a != b").expression, "a != b");
    }

    #[test]
    fn test_jumps() {
        assert_eq!(
            parse("break 2"),
            Statement::Jump {
                kind: JumpKind::Break,
                levels: 2,
                guard: None
            }
        );
        assert_eq!(
            parse("if(i > 2) continue"),
            Statement::Jump {
                kind: JumpKind::Continue,
                levels: 1,
                guard: Some(Condition::parse("i > 2")),
            }
        );
        assert!(Statement::parse("if(x) launch", "test").is_err());
        // `breakfast = 1` is an assignment, not a jump
        assert!(matches!(parse("breakfast = 1"), Statement::Assign(_)));
    }

    #[test]
    fn test_foreach_headers() {
        let header = ForeachHeader::parse("users as id => user").unwrap();
        assert_eq!(header.collection, "users");
        assert_eq!(header.key.as_deref(), Some("id"));
        assert_eq!(header.value, "user");

        let header = ForeachHeader::parse("k, v in data.items").unwrap();
        assert_eq!(header.collection, "data.items");
        assert_eq!(header.key.as_deref(), Some("k"));
        assert_eq!(header.value, "v");

        let header = ForeachHeader::parse("['as', 'in'] as word").unwrap();
        assert_eq!(header.collection, "['as', 'in']");
        assert_eq!(header.value, "word");

        assert!(ForeachHeader::parse("items").is_none());
    }

    #[test]
    fn test_assignments() {
        assert!(matches!(parse("x == 1"), Statement::Expression(_)));
        let Statement::Assign(assignment) = parse("count += 2") else {
            panic!("expected assignment");
        };
        assert_eq!(assignment.op, AssignOp::Add);
        assert_eq!(assignment.value, "2");
        assert!(matches!(
            parse("i++"),
            Statement::Assign(Assignment { op: AssignOp::Increment, .. })
        ));
    }

    #[test]
    fn test_echo_forms() {
        assert_eq!(
            parse("echo esc(name, 'UTF-8')"),
            Statement::Echo {
                expression: "name".to_string(),
                escape: true,
                charset: Some("'UTF-8'".to_string()),
            }
        );
        assert_eq!(
            parse("echo esc(a) ~ esc(b)"),
            Statement::Echo {
                expression: "esc(a) ~ esc(b)".to_string(),
                escape: false,
                charset: None,
            }
        );
    }

    #[test]
    fn test_for_header() {
        let Statement::For {
            init,
            conditions,
            step,
        } = parse("for(i = 0, j = 0; i < 3; i++, j += 2)")
        else {
            panic!("expected for");
        };
        assert_eq!(init.len(), 2);
        assert_eq!(conditions, vec!["i < 3"]);
        assert_eq!(step.len(), 2);
        assert!(Statement::parse("for(i = 0)", "test").is_err());
    }

    #[test]
    fn test_program_tree() {
        let program = Program::parse(
            "test",
            "<?rs if(a): ?>A<?rs elseif(b): ?>B<?rs else: ?>C<?rs endif; ?>",
        )
        .unwrap();
        let [Node::If { branches, otherwise }] = program.nodes.as_slice() else {
            panic!("expected a single if node");
        };
        assert_eq!(branches.len(), 2);
        assert_eq!(otherwise.as_deref(), Some(&[Node::Text("C".to_string())][..]));
    }

    #[test]
    fn test_switch_labels() {
        let artifact =
            "<?rs switch(k):\ncase (1): ?>one<?rs case (2): ?>two<?rs default: ?>d<?rs endswitch; ?>";
        let program = Program::parse("test", artifact).unwrap();
        let [Node::Switch { labels, body, .. }] = program.nodes.as_slice() else {
            panic!("expected a switch node");
        };
        assert_eq!(
            labels,
            &vec![(Some("(1)".to_string()), 0), (Some("(2)".to_string()), 1), (None, 2)]
        );
        assert_eq!(body.len(), 3);
    }

    #[test]
    fn test_mismatched_blocks() {
        for artifact in [
            "<?rs endif; ?>",
            "<?rs if(a): ?>x<?rs endforeach; ?>",
            "<?rs foreach(xs as x): ?>",
            "<?rs else: ?>",
            "<?rs if(a): else: else: endif; ?>",
        ] {
            assert!(
                matches!(Program::parse("t", artifact), Err(BladeError::ArtifactSyntax { .. })),
                "{artifact}"
            );
        }
    }
}
