//! Render sessions and the inheritance fetch loop.
//!
//! A [`Session`] owns all render-scoped state: the variable scope, the
//! [`BlockStack`], the queue of templates still to run and the include depth. A
//! new session is created for every top-level render.

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::constants::{MAX_INCLUDE_DEPTH, MAX_INHERITANCE_DEPTH, ROOT_BLOCK};
use crate::core::BladeError;
use crate::runtime::blocks::BlockStack;
use crate::runtime::expr::Evaluator;
use crate::runtime::program::Program;

/// Supplies parsed programs by template name.
pub trait TemplateLoader {
    /// Resolve, compile if needed, and parse the template called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`BladeError::TemplateNotFound`] when `name` has no source, or any
    /// compile/parse error.
    fn load(&self, name: &str) -> Result<Arc<Program>, BladeError>;
}

/// Control flow out of a statement list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Normal,
    Break(usize),
    Continue(usize),
    Exit,
}

/// The template currently executing and the capture depth it started at.
#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) template: String,
    pub(crate) floor: usize,
}

/// State for one render.
pub struct Session<'a> {
    pub(crate) loader: &'a dyn TemplateLoader,
    pub(crate) scope: Map<String, Value>,
    pub(crate) blocks: BlockStack,
    pub(crate) evaluator: Evaluator,
    pub(crate) queue: VecDeque<String>,
    pub(crate) frames: Vec<Frame>,
}

impl<'a> Session<'a> {
    /// Start a session with `scope` as the initial variables.
    #[must_use]
    pub fn new(loader: &'a dyn TemplateLoader, scope: Map<String, Value>) -> Self {
        Self {
            loader,
            scope,
            blocks: BlockStack::new(),
            evaluator: Evaluator::new(),
            queue: VecDeque::new(),
            frames: Vec::new(),
        }
    }

    /// Render `name` and every template it extends.
    ///
    /// Templates run in FIFO order: `name` first, then each parent in the order
    /// its `extends` was reached. Each one runs inside a `content` capture that is
    /// closed with overwrite semantics, so the last template to run provides the
    /// final `content` block, which is returned.
    ///
    /// # Errors
    ///
    /// Any lookup, compile or execution error aborts the render.
    /// [`BladeError::InheritanceDepthExceeded`] stops runaway `extends` chains.
    pub fn render(mut self, name: &str) -> Result<String, BladeError> {
        self.queue.push_back(name.to_string());
        let mut executed = 0usize;

        while let Some(template) = self.queue.pop_front() {
            executed += 1;
            if executed > MAX_INHERITANCE_DEPTH {
                return Err(BladeError::InheritanceDepthExceeded {
                    name: name.to_string(),
                    depth: MAX_INHERITANCE_DEPTH,
                });
            }

            tracing::debug!("Executing '{template}' ({} queued)", self.queue.len());
            let program = self.loader.load(&template)?;

            self.blocks.begin_block(ROOT_BLOCK);
            if self.run_template(&program)? == Flow::Exit {
                tracing::debug!("Render of '{name}' stopped by exit in '{template}'");
                return Ok(self.blocks.flush());
            }
            self.blocks.end_block(true);
        }

        Ok(self.blocks.block(ROOT_BLOCK, "").to_string())
    }

    /// Run `name` inline at the current output position.
    pub(crate) fn include(&mut self, name: &str) -> Result<Flow, BladeError> {
        let depth = self.frames.len();
        if depth > MAX_INCLUDE_DEPTH {
            return Err(BladeError::IncludeDepthExceeded {
                name: name.to_string(),
                depth: MAX_INCLUDE_DEPTH,
            });
        }

        tracing::debug!("Including '{name}' at depth {depth}");
        let program = self.loader.load(name)?;
        self.run_template(&program)
    }

    /// Execute one template's program with its own section floor.
    ///
    /// Only `Normal` or `Exit` leave this function; a `break`/`continue` that
    /// escapes every loop is an error.
    fn run_template(&mut self, program: &Program) -> Result<Flow, BladeError> {
        self.frames.push(Frame {
            template: program.template.clone(),
            floor: self.blocks.depth(),
        });

        let result = self.exec_nodes(&program.nodes);
        let frame = self.frames.pop();

        let flow = result?;
        match flow {
            Flow::Exit => return Ok(Flow::Exit),
            Flow::Break(_) | Flow::Continue(_) => {
                return Err(BladeError::ArtifactSyntax {
                    template: program.template.clone(),
                    reason: "break/continue outside of a loop".to_string(),
                });
            }
            Flow::Normal => {}
        }

        match frame {
            Some(frame) if self.blocks.depth() > frame.floor => Err(BladeError::UnclosedSection {
                section: self.blocks.current().unwrap_or_default().to_string(),
                template: frame.template,
            }),
            _ => Ok(Flow::Normal),
        }
    }

    /// Name of the template currently executing.
    pub(crate) fn template(&self) -> &str {
        self.frames.last().map_or("", |f| f.template.as_str())
    }

    /// Capture depth below which the current template may not close sections.
    pub(crate) fn floor(&self) -> usize {
        self.frames.last().map_or(0, |f| f.floor)
    }
}
