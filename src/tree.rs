use crate::token::Token;

/// Handle into the tree's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// One slot of the common template. `values` holds the interchangeable
/// tokens observed at this position; `sibling` is a structurally distinct
/// alternative under the same parent, not another value.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) values: Vec<Token>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) sibling: Option<NodeId>,
    pub(crate) child: Option<NodeId>,
    pub(crate) terminal_count: u32,
}

/// Mutable structural model of the corpus. Nodes live in an arena addressed
/// by `NodeId`, so restructuring is a local index rewrite; removal leaves a
/// tombstone.
pub struct PatternTree {
    nodes: Vec<Option<Node>>,
    root: NodeId,
}

impl PatternTree {
    pub fn new() -> Self {
        let mut tree = PatternTree {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        let root = tree.alloc(Node {
            values: vec![Token::new("[ROOT]".to_string())],
            parent: None,
            sibling: None,
            child: None,
            terminal_count: 0,
        });
        tree.root = root;
        tree
    }

    /// Sentinel entry point for every line.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn values(&self, id: NodeId) -> &[Token] {
        &self.node(id).values
    }

    pub fn child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).child
    }

    pub fn sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).sibling
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn terminal_count(&self, id: NodeId) -> u32 {
        self.node(id).terminal_count
    }

    /// Number of live nodes, sentinel included.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn note_terminal(&mut self, id: NodeId) {
        self.node_mut(id).terminal_count += 1;
    }

    /// Insert `token` below `level`, with one token of lookahead.
    ///
    /// 1. A child whose values already contain the exact text reuses that
    ///    node and bumps the occurrence count.
    /// 2. Otherwise, a child whose own first continuation equals the
    ///    lookahead absorbs `token` as another value: when the *next* word
    ///    repeats across lines while the current one differs, the current
    ///    word is almost certainly a variable of one slot, not a new path.
    /// 3. Otherwise a new sibling branch is appended in insertion order.
    pub fn insert(&mut self, level: NodeId, token: Token, lookahead: Option<&str>) -> NodeId {
        let mut prev = None;
        let mut cursor = self.node(level).child;
        while let Some(id) = cursor {
            if let Some(i) = self.find_value(id, &token.text) {
                self.node_mut(id).values[i].occurs += 1;
                return id;
            }
            prev = Some(id);
            cursor = self.node(id).sibling;
        }

        if let Some(next_text) = lookahead {
            let mut cursor = self.node(level).child;
            while let Some(id) = cursor {
                if let Some(child) = self.node(id).child {
                    if self.node(child).values[0].text == next_text {
                        self.node_mut(id).values.push(token);
                        return id;
                    }
                }
                cursor = self.node(id).sibling;
            }
        }

        let new_id = self.alloc(Node {
            values: vec![token],
            parent: Some(level),
            sibling: None,
            child: None,
            terminal_count: 0,
        });
        match prev {
            Some(p) => self.node_mut(p).sibling = Some(new_id),
            None => self.node_mut(level).child = Some(new_id),
        }
        new_id
    }

    fn find_value(&self, id: NodeId, text: &str) -> Option<usize> {
        self.node(id).values.iter().position(|v| v.text == text)
    }

    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(node));
        id
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.0].as_ref().expect("dangling node id")
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.0].as_mut().expect("dangling node id")
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> Node {
        self.nodes[id.0].take().expect("dangling node id")
    }
}

impl Default for PatternTree {
    fn default() -> Self {
        Self::new()
    }
}
