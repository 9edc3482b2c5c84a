use itertools::Itertools;

use crate::progress::Progress;
use crate::syntax;
use crate::token::Token;
use crate::tree::{Node, NodeId, PatternTree};

/// Single depth-first sweep over the finished tree: collapse trivial chains,
/// then factor common prefixes/suffixes out of multi-valued slots. Each node
/// is visited once; factoring is not re-triggered upward.
///
/// The `[ROOT]` sentinel is exempt; the sweep starts at its first child.
pub fn refine(tree: &mut PatternTree, progress: &mut dyn Progress) {
    if let Some(first) = tree.child(tree.root()) {
        refine_chain(tree, first, progress);
    }
}

fn refine_chain(tree: &mut PatternTree, first: NodeId, progress: &mut dyn Progress) {
    let mut cursor = Some(first);
    while let Some(id) = cursor {
        progress.tick("refining");
        collapse_chain(tree, id);
        factor_values(tree, id);
        if let Some(child) = tree.child(id) {
            refine_chain(tree, child, progress);
        }
        cursor = tree.sibling(id);
    }
}

/// Merge `node -> child` pairs where both hold exactly one value and have no
/// sibling, concatenating the literals with one space. Placeholders are
/// never merged into literals. The parent adopts the child's terminal count;
/// when both terminated lines the distinction is lost, an accepted
/// imprecision of the heuristic.
fn collapse_chain(tree: &mut PatternTree, id: NodeId) {
    loop {
        let node = tree.node(id);
        if node.values.len() != 1 || node.sibling.is_some() {
            return;
        }
        let Some(child_id) = node.child else { return };
        let child = tree.node(child_id);
        if child.values.len() != 1 || child.sibling.is_some() {
            return;
        }
        if node.values[0].text.starts_with(syntax::PLACEHOLDER_MARK)
            || child.values[0].text.starts_with(syntax::PLACEHOLDER_MARK)
        {
            return;
        }

        let child = tree.remove(child_id);
        let grandchild = child.child;
        let node = tree.node_mut(id);
        node.values[0].text.push(' ');
        node.values[0].text.push_str(&child.values[0].text);
        node.terminal_count = child.terminal_count;
        node.child = grandchild;
        if let Some(gc) = grandchild {
            tree.node_mut(gc).parent = Some(id);
        }
    }
}

/// Extract a common literal prefix and/or suffix shared by all values of a
/// slot into separate subword nodes, then re-detect syntax on the residuals.
fn factor_values(tree: &mut PatternTree, id: NodeId) {
    {
        let values = tree.values(id);
        if values.len() == 1 || values[0].subword {
            return;
        }
    }
    let (mut len_prefix, mut len_suffix) = common_affix_lengths(tree.values(id));
    delimiter_correction(
        tree.values(id)[0].text.as_bytes(),
        &mut len_prefix,
        &mut len_suffix,
    );
    if len_prefix == 0 && len_suffix == 0 {
        return;
    }
    disjoin_common(tree, id, len_prefix, len_suffix);
}

/// Longest common prefix and suffix (in bytes) across all values. The
/// suffix comparison is bounded per pair by the shorter string. Both may
/// overlap on the first value itself (e.g. {"end","eend"}); callers strip
/// with saturation.
fn common_affix_lengths(values: &[Token]) -> (usize, usize) {
    let base = values[0].text.as_bytes();
    let mut len_prefix = base.len();
    let mut len_suffix = base.len();
    for token in &values[1..] {
        let word = token.text.as_bytes();
        if len_prefix > 0 {
            len_prefix = base
                .iter()
                .zip(word)
                .take(len_prefix)
                .take_while(|(a, b)| a == b)
                .count();
        }
        if len_suffix > 0 {
            len_suffix = base
                .iter()
                .rev()
                .zip(word.iter().rev())
                .take(len_suffix)
                .take_while(|(a, b)| a == b)
                .count();
        }
    }
    (len_prefix, len_suffix)
}

/// Guard against cutting inside common `field="xxx"` syntaxes. Scanning
/// backward from the prefix boundary: a quote/bracket opener whose closer
/// lies in the suffix window pins both boundaries to the delimiter pair; a
/// `=` or `:` seen first pins the prefix to end right after it.
fn delimiter_correction(base: &[u8], len_prefix: &mut usize, len_suffix: &mut usize) {
    for j in (0..*len_prefix).rev() {
        let closer = match base[j] {
            b'"' => b'"',
            b'\'' => b'\'',
            b'[' => b']',
            b'(' => b')',
            b'<' => b'>',
            b'=' | b':' => {
                *len_prefix = j + 1;
                return;
            }
            _ => continue,
        };
        if find_matching_term(base, j + 1, len_prefix, len_suffix, closer) {
            return;
        }
    }
}

/// Search for `term` within the suffix window only; on a hit, update both
/// boundary lengths and report success.
fn find_matching_term(
    word: &[u8],
    new_prefix: usize,
    len_prefix: &mut usize,
    len_suffix: &mut usize,
    term: u8,
) -> bool {
    for i in 0..*len_suffix {
        if word[word.len() - i - 1] == term {
            *len_suffix = i + 1;
            *len_prefix = new_prefix;
            return true;
        }
    }
    false
}

/// Restructure the node in place: it keeps a single subword literal equal to
/// the prefix, a new child owns the prefix-stripped values, and a further
/// child holds the suffix when present. The node must stay where it is so
/// the surrounding tree structure is unaffected.
fn disjoin_common(tree: &mut PatternTree, id: NodeId, len_prefix: usize, len_suffix: usize) {
    let len_prefix = align_prefix_boundary(&tree.values(id)[0].text, len_prefix);

    let mut target = id;
    if len_prefix > 0 {
        let node = tree.node_mut(id);
        let values = std::mem::take(&mut node.values);
        let mut prefix = Token::new(values[0].text[..len_prefix].to_string());
        prefix.subword = true;
        node.values.push(prefix);
        let old_child = node.child;

        let inner = tree.alloc(Node {
            values,
            parent: Some(id),
            sibling: None,
            child: old_child,
            terminal_count: 0,
        });
        if let Some(c) = old_child {
            tree.node_mut(c).parent = Some(inner);
        }
        tree.node_mut(id).child = Some(inner);
        for value in &mut tree.node_mut(inner).values {
            value.text.drain(..len_prefix);
        }
        target = inner;
    }

    if len_suffix > 0 {
        let base = &tree.values(target)[0].text;
        let len_suffix = align_suffix_boundary(base, len_suffix);
        let cut = base.len().saturating_sub(len_suffix);
        let mut suffix = Token::new(base[cut..].to_string());
        suffix.subword = true;
        let old_child = tree.node(target).child;

        let tail = tree.alloc(Node {
            values: vec![suffix],
            parent: Some(target),
            sibling: None,
            child: old_child,
            terminal_count: 0,
        });
        if let Some(c) = old_child {
            tree.node_mut(c).parent = Some(tail);
        }
        tree.node_mut(target).child = Some(tail);
        for value in &mut tree.node_mut(target).values {
            let cut = value.text.len().saturating_sub(len_suffix);
            value.text.truncate(cut);
        }
    }

    // Stripping a constant affix can expose a pure numeric/time/IP value;
    // re-detect without the stacked path.
    let node = tree.node_mut(target);
    for value in &mut node.values {
        value.subword = true;
        syntax::detect(value, None);
    }
    squash_duplicate_values(&mut node.values);
}

/// Merge equal-text values, summing occurrence counts. Must only run after
/// node values were modified. Bounds the branching factor when many raw
/// values reduce to the same residual.
fn squash_duplicate_values(values: &mut Vec<Token>) {
    if values.len() <= 1 {
        return;
    }
    values.sort_by(|a, b| a.text.cmp(&b.text));
    *values = std::mem::take(values)
        .into_iter()
        .coalesce(|mut keep, next| {
            if keep.text == next.text {
                keep.occurs += next.occurs;
                Ok(keep)
            } else {
                Err((keep, next))
            }
        })
        .collect();
}

/// The common byte prefix decodes identically in every value, so checking
/// the first value's boundary is enough.
fn align_prefix_boundary(base: &str, mut len: usize) -> usize {
    while len > 0 && !base.is_char_boundary(len) {
        len -= 1;
    }
    len
}

fn align_suffix_boundary(base: &str, mut len: usize) -> usize {
    while len > 0 && len <= base.len() && !base.is_char_boundary(base.len() - len) {
        len -= 1;
    }
    len.min(base.len())
}
