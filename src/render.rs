use std::io::{self, Write};

use serde::Serialize;

use crate::token::Token;
use crate::tree::{NodeId, PatternTree};

/// Indented text dump of the tree. Each node's first value gets an `l` row,
/// further values `v` rows at the same level.
pub fn render_text<W: Write>(tree: &PatternTree, out: &mut W) -> io::Result<()> {
    render_chain(tree, Some(tree.root()), 0, out)
}

pub fn render_to_string(tree: &PatternTree) -> String {
    let mut buf = Vec::new();
    let _ = render_text(tree, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn render_chain<W: Write>(
    tree: &PatternTree,
    mut node: Option<NodeId>,
    level: usize,
    out: &mut W,
) -> io::Result<()> {
    while let Some(id) = node {
        let values = tree.values(id);
        write_indent(out, level, 'l')?;
        write_value(out, &values[0])?;
        let nterm = tree.terminal_count(id);
        if nterm > 0 {
            write!(out, " [nterm {}]", nterm)?;
        }
        writeln!(out)?;
        for value in &values[1..] {
            write_indent(out, level, 'v')?;
            write_value(out, value)?;
            writeln!(out)?;
        }
        render_chain(tree, tree.child(id), level + 1, out)?;
        node = tree.sibling(id);
    }
    Ok(())
}

fn write_indent<W: Write>(out: &mut W, level: usize, marker: char) -> io::Result<()> {
    write!(out, "{:2}{}:", level, marker)?;
    for _ in 0..level {
        write!(out, "   ")?;
    }
    Ok(())
}

fn write_value<W: Write>(out: &mut W, token: &Token) -> io::Result<()> {
    write!(out, "{}", token.text)?;
    if token.subword {
        write!(out, " {{subword}}")?;
    }
    if token.occurs > 1 {
        write!(out, " {{{}}}", token.occurs)?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TreeValue {
    pub text: String,
    pub occurs: u32,
    pub subword: bool,
    pub special: bool,
}

#[derive(Debug, Serialize)]
pub struct TreeNode {
    pub values: Vec<TreeValue>,
    pub terminal_count: u32,
    pub children: Vec<TreeNode>,
}

/// Owned, serializable view of the tree for machine consumption. Sibling
/// chains become the parent's `children` list, in sibling order.
pub fn to_json_tree(tree: &PatternTree) -> TreeNode {
    build_node(tree, tree.root())
}

fn build_node(tree: &PatternTree, id: NodeId) -> TreeNode {
    let mut children = Vec::new();
    let mut cursor = tree.child(id);
    while let Some(child) = cursor {
        children.push(build_node(tree, child));
        cursor = tree.sibling(child);
    }
    TreeNode {
        values: tree
            .values(id)
            .iter()
            .map(|t| TreeValue {
                text: t.text.clone(),
                occurs: t.occurs,
                subword: t.subword,
                special: t.special,
            })
            .collect(),
        terminal_count: tree.terminal_count(id),
        children,
    }
}
