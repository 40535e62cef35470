//! Tree traversal types and algorithms
//!
//! Every traversal is a lazy iterator driven by an explicit frame stack. The
//! iterators borrow the [`Model`] immutably, so the tree cannot change while
//! a traversal is in flight.

use crate::category::Category;
use crate::error::{Error, Result};
use crate::model::Model;
use crate::node::{Categorized, Key, Node, NodeId};
use crate::query::TraversalQuery;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;

/// When a container is emitted relative to its descendants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Container first, then its children
    #[default]
    Preorder,
    /// Children first, then the container
    Postorder,
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preorder => write!(f, "preorder"),
            Self::Postorder => write!(f, "postorder"),
        }
    }
}

/// How the children of a frame are filtered and expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// A block: the category filter applies to its children
    Block,
    /// A container of blocks: members are walked as blocks
    BlockContainer,
    /// A homogeneous container of non-block members: everything is emitted
    Plain,
}

#[derive(Debug)]
struct Frame {
    node: NodeId,
    key: Option<Key>,
    mode: Mode,
    cursor: usize,
    emit: bool,
    entered: bool,
}

enum Step {
    Skip,
    Emit,
    Descend(Mode),
}

/// Depth-first walk over a container tree
pub struct Traversal<'a> {
    model: &'a Model,
    order: Order,
    category: Option<Category>,
    active_only: bool,
    include_parent_blocks: bool,
    stack: SmallVec<[Frame; 8]>,
}

impl<'a> Traversal<'a> {
    fn new(model: &'a Model, root: NodeId, order: Order, query: &TraversalQuery) -> Result<Self> {
        let active_only = query.active_filter()?;
        let node = model.node(root)?;
        if !node.is_container() {
            return Err(Error::NotAContainer(root));
        }

        tracing::debug!(
            "Starting {} traversal from {} (category={:?}, active_only={}, parent_blocks={})",
            order,
            root,
            query.category.as_ref().map(|c| c.as_str()),
            active_only,
            query.include_parent_blocks
        );

        let mut traversal = Self {
            model,
            order,
            category: query.category.clone(),
            active_only,
            include_parent_blocks: query.include_parent_blocks,
            stack: SmallVec::new(),
        };

        if !active_only || node.is_active() {
            let mode = if node.is_component() {
                Mode::Block
            } else if node.category.is_block() {
                Mode::BlockContainer
            } else {
                Mode::Plain
            };
            traversal.push(root, query.root_key.clone(), mode);
        }
        Ok(traversal)
    }

    /// Pair every node with its key in its direct parent
    pub fn with_keys(self) -> KeyedTraversal<'a> {
        KeyedTraversal(self)
    }

    fn push(&mut self, node: NodeId, key: Option<Key>, mode: Mode) {
        let emit = match mode {
            Mode::Plain => true,
            Mode::Block | Mode::BlockContainer => {
                self.include_parent_blocks
                    || self.category.as_ref().map_or(true, |c| c.is_block())
            }
        };
        self.stack.push(Frame {
            node,
            key,
            mode,
            cursor: 0,
            emit,
            entered: false,
        });
    }

    fn step(&self, mode: Mode, child: &Node) -> Step {
        if mode == Mode::Block {
            if let Some(category) = &self.category {
                if child.category != *category && !child.category.is_block() {
                    return Step::Skip;
                }
            }
        }
        if self.active_only && !child.is_active() {
            return Step::Skip;
        }

        match mode {
            Mode::Block => {
                if !child.is_container() {
                    Step::Emit
                } else if child.is_component() {
                    Step::Descend(Mode::Block)
                } else if child.category.is_block() {
                    Step::Descend(Mode::BlockContainer)
                } else {
                    Step::Descend(Mode::Plain)
                }
            }
            Mode::BlockContainer => {
                if child.is_block() {
                    Step::Descend(Mode::Block)
                } else if child.is_container() {
                    Step::Descend(Mode::BlockContainer)
                } else {
                    Step::Emit
                }
            }
            Mode::Plain => {
                if child.is_container() && !child.is_component() {
                    Step::Descend(Mode::Plain)
                } else {
                    Step::Emit
                }
            }
        }
    }

    fn next_keyed(&mut self) -> Option<(Option<Key>, NodeId)> {
        loop {
            let top = self.stack.last_mut()?;
            if !top.entered {
                top.entered = true;
                if self.order == Order::Preorder && top.emit {
                    return Some((top.key.clone(), top.node));
                }
                continue;
            }

            let (parent, mode) = (top.node, top.mode);
            let next = self.model.next_child(parent, None, &mut top.cursor);
            let Some((key, child)) = next else {
                let frame = self.stack.pop()?;
                if self.order == Order::Postorder && frame.emit {
                    return Some((frame.key, frame.node));
                }
                continue;
            };

            let Some(node) = self.model.get(child) else {
                continue;
            };
            match self.step(mode, node) {
                Step::Skip => {}
                Step::Emit => return Some((Some(key), child)),
                Step::Descend(mode) => self.push(child, Some(key), mode),
            }
        }
    }
}

impl Iterator for Traversal<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.next_keyed().map(|(_, id)| id)
    }
}

/// Traversal yielding `(key, node)`; the root carries the query's root key
pub struct KeyedTraversal<'a>(Traversal<'a>);

impl Iterator for KeyedTraversal<'_> {
    type Item = (Option<Key>, NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next_keyed()
    }
}

#[derive(Debug)]
enum SearchFrame {
    /// A block: direct children first, then its sub-blocks
    Block {
        node: NodeId,
        descending: bool,
        cursor: usize,
    },
    /// A container whose component members are yielded
    Flatten { node: NodeId, cursor: usize },
    /// A container of blocks being searched
    Expand { node: NodeId, cursor: usize },
}

enum Action {
    Yield(NodeId),
    Push(SearchFrame),
    StartDescent,
    Pop,
    Skip,
}

/// Flat search for components under a block
pub struct Components<'a> {
    model: &'a Model,
    category: Option<Category>,
    active_only: bool,
    descend_into: bool,
    block: Category,
    stack: SmallVec<[SearchFrame; 8]>,
}

impl<'a> Components<'a> {
    fn new(model: &'a Model, root: NodeId, query: &TraversalQuery) -> Result<Self> {
        let active_only = query.active_filter()?;
        let node = model.node(root)?;
        if !node.is_block() {
            return Err(Error::NotABlock(root));
        }

        let mut stack = SmallVec::new();
        if !active_only || node.is_active() {
            stack.push(SearchFrame::Block {
                node: root,
                descending: false,
                cursor: 0,
            });
        }

        Ok(Self {
            model,
            category: query.category.clone(),
            active_only,
            descend_into: query.descend_into,
            block: Category::block(),
            stack,
        })
    }

    fn passes(&self, child: NodeId) -> Option<&'a Node> {
        let node = self.model.get(child)?;
        (!self.active_only || node.is_active()).then_some(node)
    }

    fn direct(&self, child: NodeId) -> Action {
        let Some(node) = self.passes(child) else {
            return Action::Skip;
        };
        // Blocks are reached through the descent phase unless asked for
        if self.category.is_none() && node.category.is_block() {
            return Action::Skip;
        }
        if node.is_component() {
            Action::Yield(child)
        } else {
            Action::Push(SearchFrame::Flatten {
                node: child,
                cursor: 0,
            })
        }
    }

    fn into_block(&self, child: NodeId) -> Action {
        let Some(node) = self.passes(child) else {
            return Action::Skip;
        };
        if node.is_block() {
            Action::Push(SearchFrame::Block {
                node: child,
                descending: false,
                cursor: 0,
            })
        } else if node.is_container() {
            Action::Push(SearchFrame::Expand {
                node: child,
                cursor: 0,
            })
        } else {
            Action::Skip
        }
    }

    fn flatten_member(&self, child: NodeId) -> Action {
        let Some(node) = self.passes(child) else {
            return Action::Skip;
        };
        if node.is_component() {
            Action::Yield(child)
        } else {
            Action::Push(SearchFrame::Flatten {
                node: child,
                cursor: 0,
            })
        }
    }
}

impl Iterator for Components<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let model = self.model;
            let action = match self.stack.last_mut()? {
                SearchFrame::Block {
                    node,
                    descending: false,
                    cursor,
                } => match model.next_child(*node, self.category.as_ref(), cursor) {
                    Some((_, child)) => self.direct(child),
                    None if self.descend_into => Action::StartDescent,
                    None => Action::Pop,
                },
                SearchFrame::Block {
                    node,
                    descending: true,
                    cursor,
                } => match model.next_child(*node, Some(&self.block), cursor) {
                    Some((_, child)) => self.into_block(child),
                    None => Action::Pop,
                },
                SearchFrame::Flatten { node, cursor } => match model.next_child(*node, None, cursor)
                {
                    Some((_, child)) => self.flatten_member(child),
                    None => Action::Pop,
                },
                SearchFrame::Expand { node, cursor } => match model.next_child(*node, None, cursor) {
                    Some((_, child)) => self.into_block(child),
                    None => Action::Pop,
                },
            };

            match action {
                Action::Yield(id) => return Some(id),
                Action::Push(frame) => self.stack.push(frame),
                Action::StartDescent => {
                    if let Some(SearchFrame::Block {
                        descending, cursor, ..
                    }) = self.stack.last_mut()
                    {
                        *descending = true;
                        *cursor = 0;
                    }
                }
                Action::Pop => {
                    self.stack.pop();
                }
                Action::Skip => {}
            }
        }
    }
}

/// The root block followed by every block beneath it
pub struct Blocks<'a> {
    root: Option<NodeId>,
    rest: Components<'a>,
}

impl Iterator for Blocks<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        match self.root.take() {
            Some(root) => Some(root),
            None => self.rest.next(),
        }
    }
}

impl Model {
    /// Depth-first walk emitting each container before its children
    pub fn preorder(&self, root: NodeId, query: &TraversalQuery) -> Result<Traversal<'_>> {
        Traversal::new(self, root, Order::Preorder, query)
    }

    /// Depth-first walk emitting each container after its children
    pub fn postorder(&self, root: NodeId, query: &TraversalQuery) -> Result<Traversal<'_>> {
        Traversal::new(self, root, Order::Postorder, query)
    }

    pub fn traverse(
        &self,
        root: NodeId,
        order: Order,
        query: &TraversalQuery,
    ) -> Result<Traversal<'_>> {
        Traversal::new(self, root, order, query)
    }

    /// Components of the query's category found under a block
    ///
    /// Containers are flattened and never yielded. Blocks are yielded only
    /// when the block category is requested.
    pub fn components(&self, root: NodeId, query: &TraversalQuery) -> Result<Components<'_>> {
        Components::new(self, root, query)
    }

    /// The root block, then every block found beneath it
    ///
    /// The query's category is ignored.
    pub fn blocks(&self, root: NodeId, query: &TraversalQuery) -> Result<Blocks<'_>> {
        let search = query.clone().with_category(Category::block());
        let rest = Components::new(self, root, &search)?;
        let yield_root = !rest.active_only || self.node(root)?.is_active();
        Ok(Blocks {
            root: yield_root.then_some(root),
            rest,
        })
    }

    /// Distinct categories of the children on or under a block
    pub fn collect_ctypes(&self, root: NodeId, query: &TraversalQuery) -> Result<BTreeSet<Category>> {
        let active_only = query.active_filter()?;
        let mut found = BTreeSet::new();
        if query.descend_into {
            for block in self.blocks(root, query)? {
                found.extend(self.direct_ctypes(block, active_only)?);
            }
        } else {
            found = self.direct_ctypes(root, active_only)?;
        }
        tracing::debug!("Collected {} categories under {}", found.len(), root);
        Ok(found)
    }

    fn direct_ctypes(&self, block: NodeId, active_only: bool) -> Result<BTreeSet<Category>> {
        let node = self.node(block)?;
        if !node.is_block() {
            return Err(Error::NotABlock(block));
        }

        let present: BTreeSet<Category> = match node.as_dynamic_block() {
            Some(dynamic) => dynamic.categories().cloned().collect(),
            None => self
                .children(block)?
                .filter_map(|child| self.get(child).map(|n| n.category.clone()))
                .collect(),
        };
        if !active_only {
            return Ok(present);
        }

        let mut active = BTreeSet::new();
        for category in present {
            let query = TraversalQuery::new()
                .with_category(category.clone())
                .only_active()
                .shallow();
            if self.components(block, &query)?.next().is_some() {
                active.insert(category);
            }
        }
        Ok(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Component;
    use crate::static_block::StaticLayout;

    /// M { x: Var, b: { y: Var, c: Con(inactive) }, items: [ {z: Var} ] }
    struct Fixture {
        model: Model,
        m: NodeId,
        x: NodeId,
        b: NodeId,
        y: NodeId,
        c: NodeId,
        items: NodeId,
        item: NodeId,
        z: NodeId,
    }

    fn fixture() -> Fixture {
        let mut model = Model::new();
        let m = model.add_block();
        let x = model.add_component(Component::new("Var")).unwrap();
        let b = model.add_block();
        let y = model.add_component(Component::new("Var")).unwrap();
        let c = model
            .add_component(Component::new("Con").with_active(false))
            .unwrap();
        let items = model.add_block_list();
        let item = model.add_block();
        let z = model.add_component(Component::new("Var")).unwrap();

        model.attach(m, "x", x).unwrap();
        model.attach(m, "b", b).unwrap();
        model.attach(b, "y", y).unwrap();
        model.attach(b, "c", c).unwrap();
        model.attach(m, "items", items).unwrap();
        model.push(items, item).unwrap();
        model.attach(item, "z", z).unwrap();

        Fixture {
            model,
            m,
            x,
            b,
            y,
            c,
            items,
            item,
            z,
        }
    }

    #[test]
    fn test_preorder_all() {
        let f = fixture();
        let nodes: Vec<_> = f.model.preorder(f.m, &TraversalQuery::new()).unwrap().collect();
        assert_eq!(nodes, vec![f.m, f.x, f.b, f.y, f.c, f.items, f.item, f.z]);
    }

    #[test]
    fn test_postorder_all() {
        let f = fixture();
        let nodes: Vec<_> = f.model.postorder(f.m, &TraversalQuery::new()).unwrap().collect();
        assert_eq!(nodes, vec![f.x, f.y, f.c, f.b, f.z, f.item, f.items, f.m]);
    }

    #[test]
    fn test_preorder_category_keeps_parent_blocks() {
        let f = fixture();
        let query = TraversalQuery::new().with_category("Con");
        let nodes: Vec<_> = f.model.preorder(f.m, &query).unwrap().collect();
        assert_eq!(nodes, vec![f.m, f.b, f.c, f.items, f.item]);

        let query = query.without_parent_blocks();
        let nodes: Vec<_> = f.model.preorder(f.m, &query).unwrap().collect();
        assert_eq!(nodes, vec![f.c]);
    }

    #[test]
    fn test_preorder_active_prunes() {
        let mut f = fixture();
        f.model.deactivate(f.b).unwrap();
        let nodes: Vec<_> = f
            .model
            .preorder(f.m, &TraversalQuery::new().only_active())
            .unwrap()
            .collect();
        assert_eq!(nodes, vec![f.m, f.x, f.items, f.item, f.z]);

        f.model.deactivate(f.m).unwrap();
        let query = TraversalQuery::new().only_active();
        assert_eq!(f.model.preorder(f.m, &query).unwrap().count(), 0);
    }

    #[test]
    fn test_keyed_traversal() {
        let f = fixture();
        let query = TraversalQuery::new().with_root_key("top");
        let keys: Vec<_> = f
            .model
            .preorder(f.m, &query)
            .unwrap()
            .with_keys()
            .map(|(k, _)| k.map(|k| k.to_string()))
            .collect();
        let expected = ["top", "x", "b", "y", "c", "items", "0", "z"];
        assert_eq!(
            keys,
            expected.iter().map(|s| Some(s.to_string())).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_traversal_rejects_false_filter_and_leaf_root() {
        let f = fixture();
        let query = TraversalQuery::new().with_active(Some(false));
        assert!(matches!(
            f.model.preorder(f.m, &query),
            Err(Error::InvalidFilter(false))
        ));
        assert!(matches!(
            f.model.preorder(f.x, &TraversalQuery::new()),
            Err(Error::NotAContainer(_))
        ));
    }

    #[test]
    fn test_components() {
        let f = fixture();
        let var: Vec<_> = f
            .model
            .components(f.m, &TraversalQuery::new().with_category("Var"))
            .unwrap()
            .collect();
        assert_eq!(var, vec![f.x, f.y, f.z]);

        let shallow: Vec<_> = f
            .model
            .components(f.m, &TraversalQuery::new().with_category("Var").shallow())
            .unwrap()
            .collect();
        assert_eq!(shallow, vec![f.x]);

        let active: Vec<_> = f
            .model
            .components(f.m, &TraversalQuery::new().only_active())
            .unwrap()
            .collect();
        assert_eq!(active, vec![f.x, f.y, f.z]);
    }

    #[test]
    fn test_components_flattens_lists() {
        let mut model = Model::new();
        let m = model.add_block();
        let vars = model.add_list("Var").unwrap();
        let (a, b) = (
            model.add_component(Component::new("Var")).unwrap(),
            model.add_component(Component::new("Var")).unwrap(),
        );
        model.push(vars, a).unwrap();
        model.push(vars, b).unwrap();
        model.attach(m, "vars", vars).unwrap();

        let query = TraversalQuery::new().with_category("Var");
        assert_eq!(model.components(m, &query).unwrap().collect::<Vec<_>>(), vec![a, b]);

        model.deactivate(vars).unwrap();
        let query = query.only_active();
        assert_eq!(model.components(m, &query).unwrap().count(), 0);
    }

    #[test]
    fn test_blocks() {
        let mut f = fixture();
        let all: Vec<_> = f.model.blocks(f.m, &TraversalQuery::new()).unwrap().collect();
        assert_eq!(all, vec![f.m, f.b, f.item]);

        let shallow: Vec<_> = f
            .model
            .blocks(f.m, &TraversalQuery::new().shallow())
            .unwrap()
            .collect();
        // Direct block containers are still flattened
        assert_eq!(shallow, vec![f.m, f.b, f.item]);

        f.model.deactivate(f.items).unwrap();
        let active: Vec<_> = f
            .model
            .blocks(f.m, &TraversalQuery::new().only_active())
            .unwrap()
            .collect();
        assert_eq!(active, vec![f.m, f.b]);

        assert!(matches!(
            f.model.blocks(f.items, &TraversalQuery::new()),
            Err(Error::NotABlock(_))
        ));
    }

    #[test]
    fn test_collect_ctypes() {
        let f = fixture();
        let all = f.model.collect_ctypes(f.m, &TraversalQuery::new()).unwrap();
        let names: Vec<&str> = all.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["Con", "Var", "block"]);

        let active = f
            .model
            .collect_ctypes(f.m, &TraversalQuery::new().only_active())
            .unwrap();
        assert!(!active.contains(&Category::new("Con")));

        let shallow = f
            .model
            .collect_ctypes(f.b, &TraversalQuery::new().shallow().only_active())
            .unwrap();
        assert_eq!(shallow.into_iter().collect::<Vec<_>>(), vec![Category::new("Var")]);
    }

    /// M { sb: Unit { x: Var, sub: { w: Var }(inactive), c: Con, extra: Var } }
    ///
    /// `extra` is an overflow attribute, attached first.
    struct StaticFixture {
        model: Model,
        m: NodeId,
        sb: NodeId,
        x: NodeId,
        sub: NodeId,
        w: NodeId,
        c: NodeId,
        extra: NodeId,
    }

    fn static_fixture() -> StaticFixture {
        let layout = StaticLayout::builder("Unit")
            .typed_slot("x", "Var")
            .slot("sub")
            .typed_slot("c", "Con")
            .allow_overflow()
            .build()
            .unwrap();
        let mut model = Model::new();
        let m = model.add_block();
        let sb = model.add_static_block(layout);
        let x = model.add_component(Component::new("Var")).unwrap();
        let sub = model.add_block();
        let w = model.add_component(Component::new("Var")).unwrap();
        let c = model.add_component(Component::new("Con")).unwrap();
        let extra = model.add_component(Component::new("Var")).unwrap();

        model.attach(m, "sb", sb).unwrap();
        model.attach(sb, "extra", extra).unwrap();
        model.attach(sb, "c", c).unwrap();
        model.attach(sub, "w", w).unwrap();
        model.attach(sb, "sub", sub).unwrap();
        model.attach(sb, "x", x).unwrap();
        model.deactivate(sub).unwrap();

        StaticFixture {
            model,
            m,
            sb,
            x,
            sub,
            w,
            c,
            extra,
        }
    }

    #[test]
    fn test_static_block_traversal_order() {
        let f = static_fixture();
        let all = TraversalQuery::new();
        let pre: Vec<_> = f.model.preorder(f.m, &all).unwrap().collect();
        assert_eq!(pre, vec![f.m, f.sb, f.x, f.sub, f.w, f.c, f.extra]);

        let post: Vec<_> = f.model.postorder(f.m, &all).unwrap().collect();
        assert_eq!(post, vec![f.x, f.w, f.sub, f.c, f.extra, f.sb, f.m]);

        let active: Vec<_> = f
            .model
            .preorder(f.m, &TraversalQuery::new().only_active())
            .unwrap()
            .collect();
        assert_eq!(active, vec![f.m, f.sb, f.x, f.c, f.extra]);
    }

    #[test]
    fn test_static_block_search() {
        let f = static_fixture();
        let var = TraversalQuery::new().with_category("Var");
        let found: Vec<_> = f.model.components(f.m, &var).unwrap().collect();
        assert_eq!(found, vec![f.x, f.extra, f.w]);

        let found: Vec<_> = f
            .model
            .components(f.m, &var.clone().only_active())
            .unwrap()
            .collect();
        assert_eq!(found, vec![f.x, f.extra]);

        let blocks: Vec<_> = f.model.blocks(f.m, &TraversalQuery::new()).unwrap().collect();
        assert_eq!(blocks, vec![f.m, f.sb, f.sub]);
        let blocks: Vec<_> = f
            .model
            .blocks(f.m, &TraversalQuery::new().only_active())
            .unwrap()
            .collect();
        assert_eq!(blocks, vec![f.m, f.sb]);

        let shallow = f
            .model
            .collect_ctypes(f.sb, &TraversalQuery::new().shallow())
            .unwrap();
        let names: Vec<&str> = shallow.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["Con", "Var", "block"]);

        let shallow_active = f
            .model
            .collect_ctypes(f.sb, &TraversalQuery::new().shallow().only_active())
            .unwrap();
        let names: Vec<&str> = shallow_active.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["Con", "Var"]);
    }

    #[test]
    fn test_static_block_names() {
        let f = static_fixture();
        let names = f.model.generate_names(f.m, &TraversalQuery::new()).unwrap();
        assert_eq!(names.len(), 6);
        assert_eq!(names[&f.sb], "sb");
        assert_eq!(names[&f.x], "sb.x");
        assert_eq!(names[&f.sub], "sb.sub");
        assert_eq!(names[&f.w], "sb.sub.w");
        assert_eq!(names[&f.c], "sb.c");
        assert_eq!(names[&f.extra], "sb.extra");
        assert_eq!(f.model.qualified_name(f.w).unwrap(), "sb.sub.w");

        let active = f
            .model
            .generate_names(f.m, &TraversalQuery::new().only_active())
            .unwrap();
        assert!(!active.contains_key(&f.sub));
        assert!(!active.contains_key(&f.w));
        assert_eq!(active[&f.extra], "sb.extra");
    }

    #[test]
    fn test_block_dict_traversal() {
        let mut model = Model::new();
        let m = model.add_block();
        let d = model.add_block_dict();
        let (north, third) = (model.add_block(), model.add_block());
        let z = model.add_component(Component::new("Var")).unwrap();
        let q = model.add_component(Component::new("Con")).unwrap();
        model.attach(m, "d", d).unwrap();
        model.attach(d, "north", north).unwrap();
        model.attach(d, 3usize, third).unwrap();
        model.attach(north, "z", z).unwrap();
        model.attach(third, "q", q).unwrap();

        let keys: Vec<_> = model
            .preorder(m, &TraversalQuery::new())
            .unwrap()
            .with_keys()
            .map(|(k, id)| (k.map(|k| k.to_string()), id))
            .collect();
        assert_eq!(
            keys,
            vec![
                (None, m),
                (Some("d".to_string()), d),
                (Some("north".to_string()), north),
                (Some("z".to_string()), z),
                (Some("3".to_string()), third),
                (Some("q".to_string()), q),
            ]
        );

        let blocks: Vec<_> = model.blocks(m, &TraversalQuery::new()).unwrap().collect();
        assert_eq!(blocks, vec![m, north, third]);

        let names = model.generate_names(m, &TraversalQuery::new()).unwrap();
        assert_eq!(names[&d], "d");
        assert_eq!(names[&north], "d[north]");
        assert_eq!(names[&z], "d[north].z");
        assert_eq!(names[&third], "d[3]");
        assert_eq!(names[&q], "d[3].q");

        model.deactivate(third).unwrap();
        let active = TraversalQuery::new().only_active();
        let blocks: Vec<_> = model.blocks(m, &active).unwrap().collect();
        assert_eq!(blocks, vec![m, north]);
        let cons = active.with_category("Con");
        assert_eq!(model.components(m, &cons).unwrap().count(), 0);
    }
}
