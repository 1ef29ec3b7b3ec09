//! Statement execution.

use serde_json::{Map, Value};

use crate::constants::{DEFAULT_CHARSET, DEFAULT_JSON_DEPTH};
use crate::core::BladeError;
use crate::runtime::json;
use crate::runtime::program::{
    AssignOp, Assignment, Condition, ForeachHeader, JumpKind, Node, Statement,
};
use crate::runtime::session::{Flow, Session};
use crate::runtime::value::{add, loose_eq, negate, type_name};
use crate::utils::escape_with_charset;

const LOOP_VARIABLE: &str = "loop";

impl Session<'_> {
    pub(crate) fn exec_nodes(&mut self, nodes: &[Node]) -> Result<Flow, BladeError> {
        for node in nodes {
            let flow = self.exec_node(node)?;
            if flow != Flow::Normal {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_node(&mut self, node: &Node) -> Result<Flow, BladeError> {
        match node {
            Node::Text(text) => {
                self.blocks.write(text);
                Ok(Flow::Normal)
            }
            Node::Statement(statement) => self.exec_statement(statement),
            Node::If {
                branches,
                otherwise,
            } => {
                for (condition, body) in branches {
                    if self.test(condition)? {
                        return self.exec_nodes(body);
                    }
                }
                match otherwise {
                    Some(body) => self.exec_nodes(body),
                    None => Ok(Flow::Normal),
                }
            }
            Node::Switch {
                subject,
                labels,
                body,
            } => self.exec_switch(subject, labels, body),
            Node::For {
                init,
                conditions,
                step,
                body,
            } => self.exec_for(init, conditions, step, body),
            Node::Foreach { header, body } => self.exec_foreach(header, body),
            Node::While { condition, body } => {
                while self.test(condition)? {
                    match loop_flow(self.exec_nodes(body)?) {
                        LoopControl::Next => {}
                        LoopControl::Stop => break,
                        LoopControl::Propagate(flow) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
        }
    }

    fn exec_statement(&mut self, statement: &Statement) -> Result<Flow, BladeError> {
        tracing::trace!("{}: {statement:?}", self.template());

        match statement {
            Statement::Jump {
                kind,
                levels,
                guard,
            } => {
                if let Some(guard) = guard {
                    if !self.test(guard)? {
                        return Ok(Flow::Normal);
                    }
                }
                return Ok(match kind {
                    JumpKind::Break => Flow::Break(*levels),
                    JumpKind::Continue => Flow::Continue(*levels),
                    JumpKind::Exit => Flow::Exit,
                });
            }
            Statement::Assign(assignment) => self.assign(assignment)?,
            Statement::Unset(names) => {
                for name in names {
                    unset_path(&mut self.scope, name);
                }
            }
            Statement::Echo {
                expression,
                escape,
                charset,
            } => {
                let text = self.evaluator.display(expression, &self.scope)?;
                let text = if *escape {
                    let charset = match charset {
                        Some(expr) => self.string_value(expr)?,
                        None => DEFAULT_CHARSET.to_string(),
                    };
                    escape_with_charset(&text, &charset)?
                } else {
                    text
                };
                self.blocks.write(&text);
            }
            Statement::Extends(expression) => {
                let parent = self.string_value(expression)?;
                tracing::debug!("'{}' extends '{parent}'", self.template());
                self.queue.push_back(parent);
            }
            Statement::Include(expression) => {
                let name = self.string_value(expression)?;
                return self.include(&name);
            }
            Statement::Yield { name, default } => {
                let name = self.string_value(name)?;
                let fallback = match default {
                    Some(expr) => self.evaluator.display(expr, &self.scope)?,
                    None => String::new(),
                };
                let text = self.blocks.block(&name, &fallback).to_string();
                self.blocks.write(&text);
            }
            Statement::BeginBlock(expression) => {
                let name = self.string_value(expression)?;
                self.blocks.begin_block(name);
            }
            Statement::EndBlock { overwrite } => {
                self.end_block(*overwrite)?;
            }
            Statement::ShowBlock => {
                let name = self.end_block(true)?;
                let text = self.blocks.block(&name, "").to_string();
                self.blocks.write(&text);
            }
            Statement::Json {
                expression,
                flags,
                depth,
            } => {
                let value = self.evaluator.value(expression, &self.scope)?;
                let flags = json::parse_flags(flags).ok_or_else(|| BladeError::Expression {
                    expression: flags.clone(),
                    reason: "unknown JSON flag".to_string(),
                })?;
                let depth = depth.trim().parse().unwrap_or(DEFAULT_JSON_DEPTH);
                let encoded = json::encode(&value, flags, depth)?;
                self.blocks.write(&encoded);
            }
            Statement::Expression(expression) => {
                self.evaluator.value(expression, &self.scope)?;
            }
            other => {
                return Err(BladeError::ArtifactSyntax {
                    template: self.template().to_string(),
                    reason: format!("unexpected statement {other:?}"),
                });
            }
        }
        Ok(Flow::Normal)
    }

    fn end_block(&mut self, overwrite: bool) -> Result<String, BladeError> {
        if self.blocks.depth() > self.floor() {
            if let Some(name) = self.blocks.end_block(overwrite) {
                return Ok(name);
            }
        }
        Err(BladeError::StackUnderflow {
            template: self.template().to_string(),
        })
    }

    fn exec_switch(
        &mut self,
        subject: &str,
        labels: &[(Option<String>, usize)],
        body: &[Node],
    ) -> Result<Flow, BladeError> {
        let subject = self.evaluator.value(subject, &self.scope)?;

        let mut start = None;
        for (label, index) in labels {
            if let Some(expression) = label {
                let candidate = self.evaluator.value(expression, &self.scope)?;
                if loose_eq(&subject, &candidate) {
                    start = Some(*index);
                    break;
                }
            }
        }
        let start = start.or_else(|| {
            labels.iter().find(|(label, _)| label.is_none()).map(|(_, index)| *index)
        });

        let Some(start) = start else {
            return Ok(Flow::Normal);
        };
        // A switch counts as one loop level for break and continue
        Ok(match self.exec_nodes(&body[start..])? {
            Flow::Break(n) | Flow::Continue(n) if n <= 1 => Flow::Normal,
            Flow::Break(n) => Flow::Break(n - 1),
            Flow::Continue(n) => Flow::Continue(n - 1),
            flow => flow,
        })
    }

    fn exec_for(
        &mut self,
        init: &[Statement],
        conditions: &[String],
        step: &[Statement],
        body: &[Node],
    ) -> Result<Flow, BladeError> {
        for statement in init {
            self.exec_statement(statement)?;
        }

        loop {
            let mut proceed = true;
            for condition in conditions {
                proceed = self.evaluator.truthy(condition, &self.scope)?;
            }
            if !proceed {
                break;
            }

            match loop_flow(self.exec_nodes(body)?) {
                LoopControl::Next => {}
                LoopControl::Stop => break,
                LoopControl::Propagate(flow) => return Ok(flow),
            }

            for statement in step {
                self.exec_statement(statement)?;
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_foreach(&mut self, header: &ForeachHeader, body: &[Node]) -> Result<Flow, BladeError> {
        let collection = self.evaluator.value(&header.collection, &self.scope)?;
        let entries: Vec<(Value, Value)> = match collection {
            Value::Array(items) => {
                items.into_iter().enumerate().map(|(i, v)| (Value::from(i), v)).collect()
            }
            Value::Object(map) => map.into_iter().map(|(k, v)| (Value::String(k), v)).collect(),
            Value::Null => {
                tracing::warn!("{}: foreach over null `{}`", self.template(), header.collection);
                Vec::new()
            }
            other => {
                return Err(BladeError::NotIterable {
                    expression: header.collection.clone(),
                    found: type_name(&other).to_string(),
                });
            }
        };

        let parent = self.scope.get(LOOP_VARIABLE).cloned();
        let depth = parent
            .as_ref()
            .and_then(|p| p.get("depth"))
            .and_then(Value::as_u64)
            .map_or(1, |d| d + 1);
        let count = entries.len();

        let mut result = Flow::Normal;
        for (index, (key, value)) in entries.into_iter().enumerate() {
            self.scope.insert(
                LOOP_VARIABLE.to_string(),
                loop_object(index, count, depth, parent.clone()),
            );
            if let Some(key_name) = &header.key {
                self.scope.insert(key_name.clone(), key);
            }
            self.scope.insert(header.value.clone(), value);

            match loop_flow(self.exec_nodes(body)?) {
                LoopControl::Next => {}
                LoopControl::Stop => break,
                LoopControl::Propagate(flow) => {
                    result = flow;
                    break;
                }
            }
        }

        match parent {
            Some(parent) => self.scope.insert(LOOP_VARIABLE.to_string(), parent),
            None => self.scope.remove(LOOP_VARIABLE),
        };
        Ok(result)
    }

    fn assign(&mut self, assignment: &Assignment) -> Result<(), BladeError> {
        let Assignment { name, op, value } = assignment;
        let arithmetic = |current: &Value, delta: &Value| {
            add(current, delta).ok_or_else(|| BladeError::Expression {
                expression: format!("{name} {value}"),
                reason: format!(
                    "cannot do arithmetic on {} and {}",
                    type_name(current),
                    type_name(delta)
                ),
            })
        };
        let current = self.scope.get(name).cloned().unwrap_or(Value::Null);

        let new_value = match op {
            AssignOp::Set => self.evaluator.value(value, &self.scope)?,
            AssignOp::Add => arithmetic(&current, &self.evaluator.value(value, &self.scope)?)?,
            AssignOp::Sub => {
                let delta = self.evaluator.value(value, &self.scope)?;
                let negated = negate(&delta).ok_or_else(|| BladeError::Expression {
                    expression: value.clone(),
                    reason: format!("cannot negate {}", type_name(&delta)),
                })?;
                arithmetic(&current, &negated)?
            }
            AssignOp::Increment => arithmetic(&current, &Value::from(1))?,
            AssignOp::Decrement => arithmetic(&current, &Value::from(-1))?,
        };

        self.scope.insert(name.clone(), new_value);
        Ok(())
    }

    fn test(&mut self, condition: &Condition) -> Result<bool, BladeError> {
        let result = self.evaluator.truthy(&condition.expression, &self.scope)?;
        Ok(result != condition.negated)
    }

    /// Evaluate an expression that names a template, block or charset.
    fn string_value(&mut self, expression: &str) -> Result<String, BladeError> {
        match self.evaluator.value(expression, &self.scope)? {
            Value::String(s) => Ok(s),
            other if !other.is_array() && !other.is_object() => Ok(other.to_string()),
            other => Err(BladeError::Expression {
                expression: expression.to_string(),
                reason: format!("expected a name, found {}", type_name(&other)),
            }),
        }
    }
}

enum LoopControl {
    Next,
    Stop,
    Propagate(Flow),
}

fn loop_flow(flow: Flow) -> LoopControl {
    match flow {
        Flow::Normal | Flow::Continue(1) => LoopControl::Next,
        Flow::Break(1) => LoopControl::Stop,
        Flow::Break(n) => LoopControl::Propagate(Flow::Break(n - 1)),
        Flow::Continue(n) => LoopControl::Propagate(Flow::Continue(n - 1)),
        Flow::Exit => LoopControl::Propagate(Flow::Exit),
    }
}

fn loop_object(index: usize, count: usize, depth: u64, parent: Option<Value>) -> Value {
    let mut object = Map::new();
    object.insert("index".to_string(), Value::from(index));
    object.insert("iteration".to_string(), Value::from(index + 1));
    object.insert("remaining".to_string(), Value::from(count - index - 1));
    object.insert("count".to_string(), Value::from(count));
    object.insert("first".to_string(), Value::Bool(index == 0));
    object.insert("last".to_string(), Value::Bool(index + 1 == count));
    object.insert("depth".to_string(), Value::from(depth));
    object.insert("parent".to_string(), parent.unwrap_or(Value::Null));
    Value::Object(object)
}

fn unset_path(scope: &mut Map<String, Value>, path: &str) {
    let mut parts = path.split('.').map(str::trim);
    let Some(first) = parts.next() else {
        return;
    };
    let rest: Vec<&str> = parts.collect();
    let Some((last, middle)) = rest.split_last() else {
        scope.remove(first);
        return;
    };

    let mut target = scope.get_mut(first);
    for key in middle {
        target = target.and_then(|v| v.get_mut(*key));
    }
    if let Some(Value::Object(map)) = target {
        map.remove(*last);
    }
}
