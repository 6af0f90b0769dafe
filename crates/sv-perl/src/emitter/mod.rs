//! Lazy rendering pass: walks the block arena top-down and produces the
//! final source text.

#[cfg(test)]
mod tests;

use sv_core::printer::LineEnding;
use sv_core::Result;

use crate::tree::{Block, BlockId, BlockKind, Element, SourceTree};

pub(crate) struct PerlEmitter<'a> {
    tree: &'a SourceTree,
}

impl<'a> PerlEmitter<'a> {
    pub(crate) fn new(tree: &'a SourceTree) -> Self {
        Self { tree }
    }

    pub(crate) fn render_file(&self) -> Result<String> {
        let mut code = self.render_block(self.tree.root(), 0)?;
        if self.tree.is_module() {
            code.push_str("1;");
        }
        let config = self.tree.config();
        if config.trailing_newline && !code.is_empty() && !code.ends_with('\n') {
            code.push('\n');
        }
        if let LineEnding::Windows = config.line_ending {
            code = code.replace('\n', "\r\n");
        }
        Ok(code)
    }

    /// Render one block at the given indent level. The level is the depth of
    /// the block's own elements; wrapping braces close one level up.
    pub(crate) fn render_block(&self, id: BlockId, level: usize) -> Result<String> {
        let block = self.tree.data(id);
        let mut body = String::new();
        for element in &block.elements {
            body.push_str(&self.render_element(element, level)?);
        }
        match &block.kind {
            BlockKind::WhileBody { increment } => {
                body.push_str(&self.line(level, increment));
            }
            BlockKind::WhilePre {
                body: loop_body,
                header,
            } => {
                body.push_str(&self.indent(level));
                body.push_str(header);
                body.push_str(&self.render_block(*loop_body, level + 1)?);
            }
            _ => {}
        }
        let rendered = match &block.kind {
            BlockKind::File { .. } => body,
            BlockKind::Plain
            | BlockKind::WhilePre { .. }
            | BlockKind::WhileBody { .. } => self.wrap(block, body, level),
            BlockKind::Routine(data) => {
                format!("{}{}", data.header(), self.wrap(block, body, level))
            }
            BlockKind::Condition { kind, expr } => {
                format!("{} ({}) {}", kind.as_str(), expr, self.wrap(block, body, level))
            }
            BlockKind::Eval { catch } => {
                let catch = self.render_block(*catch, level)?;
                format!(
                    "eval {}{}{}",
                    self.wrap(block, body, level),
                    self.indent(level.saturating_sub(1)),
                    catch
                )
            }
        };
        Ok(rendered)
    }

    fn render_element(&self, element: &Element, level: usize) -> Result<String> {
        let rendered = match element {
            Element::Text(text) => {
                if text == "\n" {
                    // bare breakline, no indent prefix
                    text.clone()
                } else {
                    self.line(level, text)
                }
            }
            Element::Block(id) => {
                let rendered = self.render_block(*id, level + 1)?;
                if rendered.is_empty() {
                    rendered
                } else {
                    format!("{}{}", self.indent(level), rendered)
                }
            }
            Element::Signal(handler) => {
                let routine = self.render_block(handler.routine(), level + 1)?;
                format!(
                    "{}$SIG{{{}}} = {}",
                    self.indent(level),
                    handler.signal().as_str(),
                    routine
                )
            }
            // admission converts the remaining shapes to text eagerly;
            // render them in place so the walk stays total
            Element::Value(value) => self.line(level, &value.render_construction()?),
            Element::Return(ret) => self.line(level, &ret.render()?),
            Element::Dependency(dependency) => self.line(level, &dependency.render()),
            Element::Print(print) => self.line(level, &print.render()),
            Element::Method(call) => self.line(level, &call.render()),
            Element::Binding(binding) => self.line(level, binding.render()),
            Element::Group(items) => {
                let mut rendered = String::new();
                for item in items {
                    rendered.push_str(&self.render_element(item, level)?);
                }
                rendered
            }
        };
        Ok(rendered)
    }

    /// Brace-wrap a rendered body. An empty body renders as the empty
    /// string regardless of the wrap flag.
    fn wrap(&self, block: &Block, body: String, level: usize) -> String {
        if body.is_empty() {
            return body;
        }
        if !block.wrap {
            return body;
        }
        format!("{{\n{}{}}};\n", body, self.indent(level.saturating_sub(1)))
    }

    /// Prefix every line of a fragment with the block's indent.
    fn line(&self, level: usize, text: &str) -> String {
        let prefix = self.indent(level);
        if prefix.is_empty() {
            return text.to_string();
        }
        let mut out = String::new();
        for segment in text.split_inclusive('\n') {
            if segment == "\n" {
                out.push('\n');
                continue;
            }
            out.push_str(&prefix);
            out.push_str(segment);
        }
        out
    }

    fn indent(&self, level: usize) -> String {
        self.tree.config().indentation.indent_string(level)
    }
}
