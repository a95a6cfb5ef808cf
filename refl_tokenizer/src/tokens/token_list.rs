//! Token list arena for identifier chains such as `Foo::Bar<Baz>`
//!
//! Lists are singly linked through arena nodes. Released nodes go onto a free
//! list and are reused by the next [`TokenListArena::borrow_list`] caller, so a
//! parse that builds many short chains does not allocate per chain. Node ids
//! carry a generation; touching a list after it was released is a protocol error.

use crate::config::compile_time::arena::INITIAL_TOKEN_LIST_CAPACITY;
use crate::syntax::internal_error;
use crate::tokens::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Node<'src> {
    token: Option<Token<'src>>,
    next: Option<NodeId>,
    generation: u32,
}

/// Handle to a chain of tokens owned by a [`TokenListArena`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenList {
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl TokenList {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Per-parse pool of token list nodes
#[derive(Debug)]
pub struct TokenListArena<'src> {
    nodes: Vec<Node<'src>>,
    free: Vec<u32>,
}

impl<'src> Default for TokenListArena<'src> {
    fn default() -> Self {
        Self::with_capacity(INITIAL_TOKEN_LIST_CAPACITY)
    }
}

impl<'src> TokenListArena<'src> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Start a new, empty list
    pub fn borrow_list(&mut self) -> TokenList {
        TokenList::default()
    }

    /// Append a token to the end of `list`
    pub fn push(&mut self, list: &mut TokenList, token: Token<'src>) {
        if let Some(tail) = list.tail {
            self.check(tail);
        }

        let id = self.allocate(token);
        match list.tail {
            Some(tail) => self.nodes[tail.index as usize].next = Some(id),
            None => list.head = Some(id),
        }
        list.tail = Some(id);
        list.len += 1;
    }

    /// Tokens of `list` in insertion order
    pub fn iter<'a>(&'a self, list: &TokenList) -> TokenListIter<'a, 'src> {
        if let Some(head) = list.head {
            self.check(head);
        }
        TokenListIter {
            arena: self,
            next: list.head,
        }
    }

    pub fn tokens(&self, list: &TokenList) -> Vec<Token<'src>> {
        self.iter(list).collect()
    }

    /// Concatenated source text, e.g. `Foo::Bar<Baz>`
    pub fn join(&self, list: &TokenList) -> String {
        self.iter(list).map(|token| token.value).collect()
    }

    /// Return every node of `list` to the free list
    pub fn release(&mut self, list: TokenList) {
        let mut cursor = list.head;
        while let Some(id) = cursor {
            self.check(id);
            let node = &mut self.nodes[id.index as usize];
            cursor = node.next.take();
            node.token = None;
            node.generation = node.generation.wrapping_add(1);
            self.free.push(id.index);
        }
    }

    /// Nodes currently linked into some list
    pub fn live_nodes(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn free_nodes(&self) -> usize {
        self.free.len()
    }

    fn allocate(&mut self, token: Token<'src>) -> NodeId {
        if let Some(index) = self.free.pop() {
            let node = &mut self.nodes[index as usize];
            node.token = Some(token);
            node.next = None;
            return NodeId {
                index,
                generation: node.generation,
            };
        }

        let index = self.nodes.len() as u32;
        self.nodes.push(Node {
            token: Some(token),
            next: None,
            generation: 0,
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    fn check(&self, id: NodeId) {
        match self.nodes.get(id.index as usize) {
            Some(node) if node.generation == id.generation && node.token.is_some() => {}
            _ => internal_error("token list used after it was released"),
        }
    }
}

pub struct TokenListIter<'a, 'src> {
    arena: &'a TokenListArena<'src>,
    next: Option<NodeId>,
}

impl<'a, 'src> Iterator for TokenListIter<'a, 'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = &self.arena.nodes[id.index as usize];
        self.next = node.next;
        node.token
    }
}
