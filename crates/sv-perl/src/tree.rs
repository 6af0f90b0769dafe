//! The block arena: ownership-by-index tree of blocks, the admission
//! algorithm, and the control-flow constructors.
//!
//! Scope lookup is flat per block. A name lookup only sees names added
//! directly into that block; shadowing across nesting is not resolved by the
//! engine. This mirrors the semantics of the emitted scripts' builder and is
//! a deliberate design choice, not an oversight.

use indexmap::IndexMap;
use sv_core::error::Error;
use sv_core::printer::EmitConfig;
use sv_core::{bail, common_enum, common_struct, Result};

use crate::ast::{
    ArgumentBinding, CondExpr, ConditionKind, Dependency, MethodArg, MethodCall, Print,
    ReturnStatement, RoutineData, RoutineOptions, SignalHandler, Value,
};
use crate::emitter::PerlEmitter;
use crate::registry::Kind;

/// Index of a block inside its [`SourceTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct BlockId(pub u32);

common_enum! {
    /// Back-link to the enclosing block. May only transition from unset to
    /// set; the link never changes afterwards.
    #[derive(Copy, Eq, Hash)]
    pub enum RootSlot {
        Unset,
        Set(BlockId),
    }
}

impl RootSlot {
    pub fn get(&self) -> Option<BlockId> {
        match self {
            RootSlot::Unset => None,
            RootSlot::Set(id) => Some(*id),
        }
    }

    fn set(&mut self, id: BlockId) -> Result<()> {
        match self {
            RootSlot::Unset => {
                *self = RootSlot::Set(id);
                Ok(())
            }
            RootSlot::Set(_) => Err(Error::RootAlreadySet),
        }
    }
}

common_struct! {
    /// Names registered directly into a block. Insertion-ordered, keys
    /// unique, last write wins.
    #[derive(Default)]
    pub struct Scope {
        pub variables: IndexMap<String, Value>,
        pub routines: IndexMap<String, BlockId>,
    }
}

common_enum! {
    /// Discriminant of a block node.
    pub enum BlockKind {
        /// The root container of one emitted source artifact.
        File { name: String, is_module: bool },
        /// A plain brace-wrapped expression block.
        Plain,
        Routine(RoutineData),
        Condition { kind: ConditionKind, expr: String },
        /// Outer block of a while loop, holding the synthesized index and
        /// length declarations ahead of the loop header.
        WhilePre { body: BlockId, header: String },
        /// Loop body; rendering appends the index increment.
        WhileBody { increment: String },
        /// Try body of an eval; the catch branch is fixed at construction.
        Eval { catch: BlockId },
    }
}

common_enum! {
    /// Everything the admission algorithm accepts.
    pub enum Element {
        /// A finished text fragment, emitted verbatim behind the indent
        /// prefix.
        Text(String),
        /// A retained composite, rendered lazily during the final pass.
        Block(BlockId),
        Value(Value),
        Return(ReturnStatement),
        Dependency(Dependency),
        Signal(SignalHandler),
        Print(Print),
        Method(MethodCall),
        Binding(ArgumentBinding),
        /// A sequence, flattened member by member.
        Group(Vec<Element>),
    }
}

macro_rules! element_from {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for Element {
            fn from(value: $ty) -> Self {
                Element::$variant(value)
            }
        }
    };
}

element_from!(Text, String);
element_from!(Block, BlockId);
element_from!(Value, Value);
element_from!(Return, ReturnStatement);
element_from!(Dependency, Dependency);
element_from!(Signal, SignalHandler);
element_from!(Print, Print);
element_from!(Method, MethodCall);
element_from!(Binding, ArgumentBinding);
element_from!(Group, Vec<Element>);

impl From<&str> for Element {
    fn from(text: &str) -> Self {
        Element::Text(text.to_string())
    }
}

impl From<WhileLoop> for Element {
    fn from(while_loop: WhileLoop) -> Self {
        Element::Block(while_loop.pre)
    }
}

common_struct! {
    /// One node of the arena.
    pub struct Block {
        pub kind: BlockKind,
        pub elements: Vec<Element>,
        pub scope: Scope,
        pub closed: bool,
        pub header_done: bool,
        pub wrap: bool,
        pub root: RootSlot,
    }
}

impl Block {
    fn new(kind: BlockKind, wrap: bool) -> Self {
        Self {
            kind,
            elements: Vec::new(),
            scope: Scope::default(),
            closed: false,
            header_done: false,
            wrap,
            root: RootSlot::Unset,
        }
    }
}

common_struct! {
    /// Root-container construction options. The default dependency set is
    /// injected here rather than hard-coded, so alternative preludes stay
    /// testable.
    pub struct FileOptions {
        pub name: String,
        pub is_module: bool,
        pub default_dependencies: Vec<Dependency>,
    }
}

impl FileOptions {
    pub fn script(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_module: false,
            default_dependencies: Self::builtin_dependencies(),
        }
    }

    pub fn module(name: impl Into<String>) -> Self {
        Self {
            is_module: true,
            ..Self::script(name)
        }
    }

    pub fn with_default_dependencies(mut self, dependencies: Vec<Dependency>) -> Self {
        self.default_dependencies = dependencies;
        self
    }

    /// Core language pragmas plus the stdlib package of every built-in kind
    /// that ships one.
    pub fn builtin_dependencies() -> Vec<Dependency> {
        let mut dependencies = vec![
            Dependency::bare("strict"),
            Dependency::bare("warnings"),
            Dependency::bare("stdlib.util"),
        ];
        for kind in Kind::ALL {
            if let Some(package) = kind.package() {
                dependencies.push(Dependency::bare(package));
            }
        }
        dependencies
    }
}

/// Handle returned by [`SourceTree::while_over`]: the outer pre-block that
/// gets added to the caller's block, and the loop body callers populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WhileLoop {
    pre: BlockId,
    body: BlockId,
}

impl WhileLoop {
    pub fn pre(&self) -> BlockId {
        self.pre
    }

    pub fn body(&self) -> BlockId {
        self.body
    }
}

/// The arena owning every block of one source artifact. Block 0 is always
/// the root container.
#[derive(Debug, Clone)]
pub struct SourceTree {
    blocks: Vec<Block>,
    config: EmitConfig,
}

impl SourceTree {
    pub fn new(options: FileOptions) -> Self {
        Self::with_config(options, EmitConfig::default())
    }

    pub fn with_config(options: FileOptions, config: EmitConfig) -> Self {
        let root = Block::new(
            BlockKind::File {
                name: options.name,
                is_module: options.is_module,
            },
            false,
        );
        let mut tree = Self {
            blocks: vec![root],
            config,
        };
        let root = tree.root();
        for dependency in options.default_dependencies {
            let package = dependency.package().to_string();
            if let Err(err) = tree.add(root, dependency) {
                sv_core::error!("failed to add default dependency {package}: {err}");
            }
        }
        tree.blocks[0].header_done = true;
        tree
    }

    pub fn root(&self) -> BlockId {
        BlockId(0)
    }

    pub fn config(&self) -> &EmitConfig {
        &self.config
    }

    pub fn file_name(&self) -> &str {
        match &self.blocks[0].kind {
            BlockKind::File { name, .. } => name,
            _ => "",
        }
    }

    pub fn is_module(&self) -> bool {
        matches!(self.blocks[0].kind, BlockKind::File { is_module: true, .. })
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.0 as usize)
    }

    pub(crate) fn data(&self, id: BlockId) -> &Block {
        &self.blocks[id.0 as usize]
    }

    fn data_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0 as usize]
    }

    fn push(&mut self, block: Block) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(block);
        id
    }

    /// A plain brace-wrapped expression block.
    pub fn expr(&mut self) -> BlockId {
        self.push(Block::new(BlockKind::Plain, true))
    }

    /// A routine block with its argument-binding prolog installed.
    pub fn routine(&mut self, options: RoutineOptions) -> BlockId {
        let binding = ArgumentBinding::new(&options.params, options.shifting);
        let mut block = Block::new(BlockKind::Routine(RoutineData::new(options.name)), true);
        if !binding.is_empty() {
            block.elements.push(Element::Text(binding.render().to_string()));
        }
        self.push(block)
    }

    /// A condition block of the given discriminant.
    pub fn condition(&mut self, kind: ConditionKind, expr: impl Into<CondExpr>) -> BlockId {
        self.push(Block::new(
            BlockKind::Condition {
                kind,
                expr: expr.into().as_str().to_string(),
            },
            true,
        ))
    }

    /// An eval block with its fixed catch branch. Callers only populate the
    /// try body.
    pub fn evaluation(&mut self) -> Result<BlockId> {
        let catch = self.condition(ConditionKind::If, "$@");
        self.add(catch, Print::line("$@"))?;
        Ok(self.push(Block::new(BlockKind::Eval { catch }, true)))
    }

    /// A counted loop over a container value. Arrays iterate by index; maps
    /// iterate their key list, binding `$key` and `$value` per round.
    pub fn while_over(&mut self, iterable: &Value) -> Result<WhileLoop> {
        match iterable.kind() {
            Kind::Array => self.while_over_array(iterable),
            Kind::Map => self.while_over_map(iterable),
            other => Err(Error::UnsupportedIterable(other.symbol().to_string())),
        }
    }

    fn while_loop_blocks(&mut self) -> Result<WhileLoop> {
        let body = self.push(Block::new(
            BlockKind::WhileBody {
                increment: "$i->add(1);\n".to_string(),
            },
            true,
        ));
        let pre = self.push(Block::new(
            BlockKind::WhilePre {
                body,
                header: "while ($i < $len) ".to_string(),
            },
            true,
        ));
        self.set_root(body, pre)?;
        Ok(WhileLoop { pre, body })
    }

    fn while_over_array(&mut self, array: &Value) -> Result<WhileLoop> {
        let while_loop = self.while_loop_blocks()?;
        let index = Value::integer("i", 0);
        let length = Value::from_method(Kind::Integer, "len", array.method("size", vec![]));
        let element = Value::from_method(
            array.element_kind(),
            "element",
            array.method("get", vec![MethodArg::from(&index)]),
        );
        self.add(while_loop.pre, index)?;
        self.add(while_loop.pre, length)?;
        self.add(while_loop.body, element)?;
        Ok(while_loop)
    }

    fn while_over_map(&mut self, map: &Value) -> Result<WhileLoop> {
        let while_loop = self.while_loop_blocks()?;
        let index = Value::integer("i", 0);
        let keys = Value::from_method(Kind::Array, "keys", map.method("keys", vec![]));
        let length = Value::from_method(Kind::Integer, "len", keys.method("size", vec![]));
        let key = Value::from_method(
            Kind::Scalar,
            "key",
            keys.method("get", vec![MethodArg::from(&index)]),
        );
        let value = Value::from_method(
            map.element_kind(),
            "value",
            map.method("get", vec![MethodArg::raw("$key")]),
        );
        self.add(while_loop.pre, index)?;
        self.add(while_loop.pre, keys)?;
        self.add(while_loop.pre, length)?;
        self.add(while_loop.body, key)?;
        self.add(while_loop.body, value)?;
        Ok(while_loop)
    }

    /// Set a block's root link. Fails once the link is set.
    pub fn set_root(&mut self, child: BlockId, parent: BlockId) -> Result<()> {
        self.data_mut(child).root.set(parent)
    }

    fn set_root_if_unset(&mut self, child: BlockId, parent: BlockId) {
        if self.data(child).root.get().is_none() {
            // cannot fail on an unset slot
            let _ = self.data_mut(child).root.set(parent);
        }
    }

    /// Admit an element into a block. Validation, scope registration and
    /// eager rendering happen here; composites stay live until the final
    /// render pass.
    pub fn add(&mut self, target: BlockId, element: impl Into<Element>) -> Result<()> {
        self.add_element(target, element.into())
    }

    fn add_element(&mut self, target: BlockId, element: Element) -> Result<()> {
        if self.data(target).closed {
            return Err(Error::ClosedBlock);
        }
        match element {
            Element::Group(items) => {
                for item in items {
                    self.add_element(target, item)?;
                }
            }
            Element::Dependency(dependency) => {
                let block = self.data_mut(target);
                if !matches!(block.kind, BlockKind::File { .. }) {
                    return Err(Error::MisplacedDependency(dependency.package().to_string()));
                }
                let text = Element::Text(dependency.render());
                if block.header_done {
                    // keep declared-before-use ordering for late dependencies
                    block.elements.insert(0, text);
                } else {
                    block.elements.push(text);
                }
            }
            Element::Return(ret) => {
                if !matches!(self.data(target).kind, BlockKind::Routine(_)) {
                    // shared composition code may add a return defensively;
                    // outside a routine it is a no-op, not an error
                    return Ok(());
                }
                let text = ret.render()?;
                let info = ret.info();
                let block = self.data_mut(target);
                block.elements.push(Element::Text(text));
                block.closed = true;
                if let BlockKind::Routine(data) = &mut block.kind {
                    data.set_ret(info);
                }
            }
            Element::Block(id) => {
                if id == target {
                    return Ok(());
                }
                self.set_root_if_unset(id, target);
                match &self.data(id).kind {
                    BlockKind::Eval { catch } => {
                        let catch = *catch;
                        self.set_root_if_unset(catch, target);
                    }
                    BlockKind::Routine(data) => {
                        let name = data.display().to_string();
                        self.data_mut(target).scope.routines.insert(name, id);
                    }
                    _ => {}
                }
                self.data_mut(target).elements.push(Element::Block(id));
            }
            Element::Signal(handler) => {
                self.set_root_if_unset(handler.routine(), target);
                self.data_mut(target).elements.push(Element::Signal(handler));
            }
            Element::Value(value) => {
                let text = value.render_construction()?;
                let block = self.data_mut(target);
                block
                    .scope
                    .variables
                    .insert(value.display_name().to_string(), value);
                block.elements.push(Element::Text(text));
            }
            Element::Print(print) => {
                let text = print.render();
                self.data_mut(target).elements.push(Element::Text(text));
            }
            Element::Method(call) => {
                let text = call.render();
                self.data_mut(target).elements.push(Element::Text(text));
            }
            Element::Binding(binding) => {
                if !binding.is_empty() {
                    let text = binding.render().to_string();
                    self.data_mut(target).elements.push(Element::Text(text));
                }
            }
            Element::Text(text) => {
                self.data_mut(target).elements.push(Element::Text(text));
            }
        }
        Ok(())
    }

    /// Whether a variable name was registered directly into this block.
    pub fn has_var(&self, block: BlockId, name: &str) -> bool {
        self.data(block).scope.variables.contains_key(name)
    }

    /// Whether a routine name was registered directly into this block.
    pub fn has_routine(&self, block: BlockId, name: &str) -> bool {
        self.data(block).scope.routines.contains_key(name)
    }

    pub fn var(&self, block: BlockId, name: &str) -> Option<&Value> {
        self.data(block).scope.variables.get(name)
    }

    pub fn lookup_routine(&self, block: BlockId, name: &str) -> Option<BlockId> {
        self.data(block).scope.routines.get(name).copied()
    }

    pub fn is_closed(&self, block: BlockId) -> bool {
        self.data(block).closed
    }

    /// Routine state of a block, when the block is a routine.
    pub fn routine_data(&self, id: BlockId) -> Option<&RoutineData> {
        match &self.get(id)?.kind {
            BlockKind::Routine(data) => Some(data),
            _ => None,
        }
    }

    /// The fixed catch branch of an eval block.
    pub fn eval_catch(&self, id: BlockId) -> Option<BlockId> {
        match &self.get(id)?.kind {
            BlockKind::Eval { catch } => Some(*catch),
            _ => None,
        }
    }

    /// `package Foo::Bar;` marker, module files only.
    pub fn set_package(&mut self, name: &str) -> Result<()> {
        if !self.is_module() {
            bail!("cannot set package on a non-module file");
        }
        let package = name.replace('.', "::");
        self.blocks[0]
            .elements
            .push(Element::Text(format!("package {package};\n")));
        Ok(())
    }

    /// Push a bare line break.
    pub fn breakline(&mut self, block: BlockId) {
        self.data_mut(block)
            .elements
            .push(Element::Text("\n".to_string()));
    }

    /// Render the whole artifact: hoisted headers, body, optional module
    /// trailer.
    pub fn render(&self) -> Result<String> {
        let code = PerlEmitter::new(self).render_file()?;
        sv_core::debug!("rendered {} ({} bytes)", self.file_name(), code.len());
        Ok(code)
    }

    pub(crate) fn render_block_at(&self, id: BlockId, level: usize) -> Result<String> {
        PerlEmitter::new(self).render_block(id, level)
    }

    /// Render a routine as an inline `sub { ... }` expression, without the
    /// statement terminator.
    pub(crate) fn inline_sub(&self, routine: BlockId) -> Result<String> {
        let rendered = self.render_block_at(routine, 1)?;
        let trimmed = rendered.trim_end();
        let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed);
        Ok(trimmed.to_string())
    }
}
