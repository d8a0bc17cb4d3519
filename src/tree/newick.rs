//! Iterative Newick reader producing binary [`Tree`]s
//!
//! Tips are numbered `1..=T` in order of appearance, internal nodes from
//! `T+1` in preorder, so the root always ends up at `T+1`. Every non-root
//! node must carry a branch length.

use super::{Tree, TreeBuilder};
use crate::{CblvError, Result};

/// Bytes that terminate an unquoted label or a branch length
const DELIMITERS: &[u8] = b"()[]':;,";

#[derive(Default)]
struct RawNode {
    parent: Option<usize>,
    children: Vec<usize>,
    label: Option<String>,
    length: Option<f64>,
}

/// Lazy reader over `;`-terminated Newick trees
///
/// ```
/// use cblv::tree::NewickReader;
///
/// let trees: Vec<_> = NewickReader::new("(A:1,B:1);\n(A:2,B:1);")
///     .collect::<cblv::Result<_>>()
///     .unwrap();
/// assert_eq!(trees.len(), 2);
/// ```
pub struct NewickReader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> NewickReader<'a> {
    /// Create a reader over `input`
    pub fn new(input: &'a str) -> Self {
        NewickReader {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> CblvError {
        CblvError::Newick {
            position: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Skip whitespace and `[...]` comments
    fn skip_blank(&mut self) -> Result<()> {
        while let Some(byte) = self.peek() {
            if byte.is_ascii_whitespace() {
                self.pos += 1;
            } else if byte == b'[' {
                match self.input[self.pos..].iter().position(|&c| c == b']') {
                    Some(offset) => self.pos += offset + 1,
                    None => return Err(self.error("unterminated comment")),
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn read_unquoted(&mut self) -> &'a [u8] {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte.is_ascii_whitespace() || DELIMITERS.contains(&byte) {
                break;
            }
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    fn read_label(&mut self) -> Result<String> {
        if self.peek() != Some(b'\'') {
            let raw = self.read_unquoted();
            if raw.is_empty() {
                return Err(self.error("unexpected character"));
            }
            // Delimiters are ASCII, so the slice boundaries fall on UTF-8 boundaries
            return Ok(String::from_utf8_lossy(raw).into_owned());
        }

        let start = self.pos;
        self.pos += 1;
        let mut label = Vec::new();
        loop {
            match self.peek() {
                None => {
                    return Err(CblvError::Newick {
                        position: start,
                        message: "unterminated quoted label".to_string(),
                    })
                }
                Some(b'\'') => {
                    self.pos += 1;
                    if self.peek() == Some(b'\'') {
                        label.push(b'\'');
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
                Some(byte) => {
                    label.push(byte);
                    self.pos += 1;
                }
            }
        }
        Ok(String::from_utf8_lossy(&label).into_owned())
    }

    fn read_length(&mut self) -> Result<f64> {
        self.skip_blank()?;
        let start = self.pos;
        let raw = self.read_unquoted();
        let text = String::from_utf8_lossy(raw);
        text.parse::<f64>().map_err(|_| CblvError::Newick {
            position: start,
            message: format!("invalid branch length '{}'", text),
        })
    }

    fn push_node(
        &self,
        arena: &mut Vec<RawNode>,
        open: &[usize],
        root: &mut Option<usize>,
    ) -> Result<usize> {
        let id = arena.len();
        let parent = open.last().copied();
        match parent {
            Some(p) => arena[p].children.push(id),
            None if root.is_some() => return Err(self.error("more than one root")),
            None => *root = Some(id),
        }
        arena.push(RawNode {
            parent,
            ..RawNode::default()
        });
        Ok(id)
    }

    /// Read the next tree, `Ok(None)` once the input is exhausted
    pub fn read_tree(&mut self) -> Result<Option<Tree>> {
        self.skip_blank()?;
        if self.peek().is_none() {
            return Ok(None);
        }

        let start = self.pos;
        let mut arena: Vec<RawNode> = Vec::new();
        let mut open: Vec<usize> = Vec::new();
        let mut last: Option<usize> = None;
        let mut root: Option<usize> = None;

        loop {
            self.skip_blank()?;
            let Some(byte) = self.peek() else {
                return Err(self.error("unexpected end of input, missing ';'"));
            };

            match byte {
                b'(' => {
                    if last.is_some() {
                        return Err(self.error("unexpected '('"));
                    }
                    let id = self.push_node(&mut arena, &open, &mut root)?;
                    open.push(id);
                    self.pos += 1;
                }
                b',' => {
                    if open.is_empty() {
                        return Err(self.error("',' outside parentheses"));
                    }
                    if last.is_none() {
                        self.push_node(&mut arena, &open, &mut root)?;
                    }
                    last = None;
                    self.pos += 1;
                }
                b')' => {
                    if open.is_empty() {
                        return Err(self.error("unbalanced ')'"));
                    }
                    if last.is_none() {
                        self.push_node(&mut arena, &open, &mut root)?;
                    }
                    last = open.pop();
                    self.pos += 1;
                }
                b':' => {
                    let node = match last {
                        Some(node) => node,
                        None => self.push_node(&mut arena, &open, &mut root)?,
                    };
                    if arena[node].length.is_some() {
                        return Err(self.error("duplicate branch length"));
                    }
                    self.pos += 1;
                    arena[node].length = Some(self.read_length()?);
                    last = Some(node);
                }
                b';' => {
                    if !open.is_empty() {
                        return Err(self.error("unbalanced '('"));
                    }
                    if root.is_none() {
                        return Err(self.error("empty tree"));
                    }
                    self.pos += 1;
                    break;
                }
                _ => {
                    let node = match last {
                        Some(node) => node,
                        None => self.push_node(&mut arena, &open, &mut root)?,
                    };
                    if arena[node].label.is_some() {
                        return Err(self.error("duplicate label"));
                    }
                    arena[node].label = Some(self.read_label()?);
                    last = Some(node);
                }
            }
        }

        let root = root.ok_or_else(|| self.error("empty tree"))?;
        self.build(arena, root, start).map(Some)
    }

    /// Renumber the raw arena and hand it to the validating builder
    fn build(&self, arena: Vec<RawNode>, root: usize, start: usize) -> Result<Tree> {
        let at_start = |message: String| CblvError::Newick {
            position: start,
            message,
        };

        let mut num_tips = 0;
        for node in &arena {
            match node.children.len() {
                0 => num_tips += 1,
                2 => {}
                n => {
                    return Err(at_start(format!(
                        "node with {} children, only binary trees are supported",
                        n
                    )))
                }
            }
        }

        let mut index = vec![0; arena.len()];
        let mut next_tip = 1;
        for (id, node) in arena.iter().enumerate() {
            if node.children.is_empty() {
                index[id] = next_tip;
                next_tip += 1;
            }
        }

        let mut next_internal = num_tips + 1;
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if arena[node].children.is_empty() {
                continue;
            }
            index[node] = next_internal;
            next_internal += 1;
            stack.extend(arena[node].children.iter().rev());
        }

        let mut builder = TreeBuilder::new(num_tips);
        for (id, node) in arena.iter().enumerate() {
            if let Some(parent) = node.parent {
                let length = node.length.ok_or_else(|| {
                    at_start(format!(
                        "missing branch length above {}",
                        node.label.as_deref().unwrap_or("unlabelled node")
                    ))
                })?;
                builder.add_child(index[parent], index[id], length);
            }
            if let Some(label) = &node.label {
                builder.set_label(index[id], label.clone());
            }
        }
        builder.build()
    }
}

impl<'a> Iterator for NewickReader<'a> {
    type Item = Result<Tree>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_tree() {
            Ok(tree) => tree.map(Ok),
            Err(err) => {
                self.pos = self.input.len();
                Some(Err(err))
            }
        }
    }
}

/// Parse exactly one Newick tree
pub fn parse_newick(input: &str) -> Result<Tree> {
    let mut reader = NewickReader::new(input);
    let tree = reader
        .read_tree()?
        .ok_or_else(|| reader.error("no tree found"))?;
    reader.skip_blank()?;
    if reader.peek().is_some() {
        return Err(reader.error("trailing content after ';'"));
    }
    Ok(tree)
}

/// Parse every `;`-terminated tree in `input`
pub fn parse_newick_trees(input: &str) -> Result<Vec<Tree>> {
    NewickReader::new(input).collect()
}
