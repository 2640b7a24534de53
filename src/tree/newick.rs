//! Newick parser for rooted trees with branch lengths and internal labels,
//! the format emitted by augur refine.

use super::{Node, NodeId, Tree};
use crate::error::{PriorkinError, Result};

/// Parse a newick string into a [`Tree`].
///
/// Supports nested clades, optional node labels (bare or single-quoted),
/// and optional `:length` branch annotations. Unannotated branches default
/// to length 0.
pub fn parse_newick(input: &str) -> Result<Tree> {
    let mut parser = Parser {
        bytes: input.as_bytes(),
        pos: 0,
        nodes: Vec::new(),
    };
    let root = parser.subtree(None)?;
    parser.skip_ws();
    parser.expect(b';')?;
    parser.skip_ws();
    if parser.pos != parser.bytes.len() {
        return Err(parser.err("trailing content after ';'"));
    }
    Ok(Tree::from_nodes(parser.nodes, root))
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    nodes: Vec<Node>,
}

impl Parser<'_> {
    fn err(&self, reason: impl Into<String>) -> PriorkinError {
        PriorkinError::Newick {
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.err(format!("expected '{}'", byte as char)))
        }
    }

    fn push_node(&mut self, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            name: String::new(),
            parent,
            branch_length: 0.0,
            children: Vec::new(),
        });
        id
    }

    fn subtree(&mut self, parent: Option<NodeId>) -> Result<NodeId> {
        self.skip_ws();
        let id = self.push_node(parent);

        if self.peek() == Some(b'(') {
            self.pos += 1;
            loop {
                let child = self.subtree(Some(id))?;
                self.nodes[id.0 as usize].children.push(child);
                self.skip_ws();
                match self.peek() {
                    Some(b',') => self.pos += 1,
                    Some(b')') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.err("expected ',' or ')'")),
                }
            }
        }

        self.skip_ws();
        let name = self.label()?;
        self.nodes[id.0 as usize].name = name;

        self.skip_ws();
        if self.peek() == Some(b':') {
            self.pos += 1;
            self.nodes[id.0 as usize].branch_length = self.branch_length()?;
        }

        Ok(id)
    }

    fn label(&mut self) -> Result<String> {
        if self.peek() == Some(b'\'') {
            self.pos += 1;
            let start = self.pos;
            while let Some(b) = self.peek() {
                if b == b'\'' {
                    let name = String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned();
                    self.pos += 1;
                    return Ok(name);
                }
                self.pos += 1;
            }
            return Err(self.err("unterminated quoted label"));
        }

        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b'(' | b')' | b',' | b':' | b';' | b' ' | b'\t' | b'\n' | b'\r') {
                break;
            }
            self.pos += 1;
        }
        Ok(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
    }

    fn branch_length(&mut self) -> Result<f64> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b'0'..=b'9' | b'.' | b'-' | b'+' | b'e' | b'E') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let length: f64 = std::str::from_utf8(&self.bytes[start..self.pos])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| self.err("invalid branch length"))?;
        // path distances must stay non-negative
        if length < 0.0 {
            return Err(self.err(format!("negative branch length {length}")));
        }
        Ok(length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_tree() {
        let tree = parse_newick("(A:1,B:2,C:3);").unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.leaf_names().count(), 3);
        assert_eq!(tree.branch_length(tree.node("B").unwrap()), 2.0);
    }

    #[test]
    fn internal_labels_and_nesting() {
        let tree = parse_newick("((A:0.1,B:0.2)NODE_01:0.05,C:0.3)NODE_00;").unwrap();
        let node = tree.node("NODE_01").unwrap();
        assert!(!tree.is_leaf(node));
        assert_eq!(tree.parent(node), Some(tree.root()));
        assert_eq!(tree.name(tree.root()), "NODE_00");
    }

    #[test]
    fn quoted_labels_and_scientific_lengths() {
        let tree = parse_newick("('hCoV-19/x 1':1e-3,B:2);").unwrap();
        let node = tree.node("hCoV-19/x 1").unwrap();
        assert!((tree.branch_length(node) - 1e-3).abs() < 1e-12);
    }

    #[test]
    fn missing_semicolon_reports_offset() {
        let err = parse_newick("(A:1,B:2)").unwrap_err();
        match err {
            PriorkinError::Newick { offset, .. } => assert_eq!(offset, 9),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_branch_length_is_rejected() {
        let err = parse_newick("(A:-0.5,B:2);").unwrap_err();
        match err {
            PriorkinError::Newick { reason, .. } => assert!(reason.contains("negative")),
            other => panic!("unexpected error: {other}"),
        }
        // negative exponents are still fine
        assert!(parse_newick("(A:1e-3,B:2);").is_ok());
    }

    #[test]
    fn unbalanced_parens_fail() {
        assert!(parse_newick("((A:1,B:2;").is_err());
        assert!(parse_newick("").is_err());
    }
}
