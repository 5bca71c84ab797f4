use serde::Serialize;
use serde_json::Value;

use crate::abstract_site::{ErrorDetails, ErrorLayer, Result, SiteError};

fn make_malformed_literal_error(context: String) -> SiteError {
    SiteError::StickyProblem(ErrorDetails {
        layer: ErrorLayer::DataLayer,
        message: format!("malformed hierarchy literal: {}", context),
    })
}

/// One entry in a class/struct/namespace hierarchy display.  The generator
/// emits each entry as a `[label, link-or-null, children]` triple; we turn
/// the shape of the third slot into an explicit tag, validated once at load
/// time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum HierarchyNode {
    /// Entry with its own documentation page and no children.
    Leaf { label: String, link: String },
    /// Entry with inline children.  A `None` link is a pure grouping node
    /// (base-class placeholder, enum container); those always have children.
    /// A linked node may also have children (derived-class display).
    Group {
        label: String,
        link: Option<String>,
        children: Vec<HierarchyNode>,
    },
    /// Entry whose children live in a separate generated file; Doxygen emits
    /// a bare string naming that file in the children slot (ex the
    /// "namespaceGaps" reference in namespaces_dup.js).  We record the
    /// reference without chasing it.
    External {
        label: String,
        link: Option<String>,
        children_page: String,
    },
}

impl HierarchyNode {
    pub fn label(&self) -> &str {
        match self {
            HierarchyNode::Leaf { label, .. } => label,
            HierarchyNode::Group { label, .. } => label,
            HierarchyNode::External { label, .. } => label,
        }
    }

    pub fn link(&self) -> Option<&str> {
        match self {
            HierarchyNode::Leaf { link, .. } => Some(link),
            HierarchyNode::Group { link, .. } => link.as_deref(),
            HierarchyNode::External { link, .. } => link.as_deref(),
        }
    }

    /// Inline children in display order; empty exactly when the literal's
    /// children slot was null (or an external page reference).
    pub fn children(&self) -> &[HierarchyNode] {
        match self {
            HierarchyNode::Group { children, .. } => children,
            _ => &[],
        }
    }

    fn from_value(value: &Value) -> Result<HierarchyNode> {
        let triple = value.as_array().ok_or_else(|| {
            make_malformed_literal_error(format!("entry is not an array: {}", value))
        })?;
        if triple.len() != 3 {
            return Err(make_malformed_literal_error(format!(
                "entry has {} elements instead of 3",
                triple.len()
            )));
        }

        let label = match triple[0].as_str() {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => {
                return Err(make_malformed_literal_error(format!(
                    "label must be a non-empty string: {}",
                    triple[0]
                )));
            }
        };

        let link = match &triple[1] {
            Value::Null => None,
            Value::String(link) => Some(link.clone()),
            other => {
                return Err(make_malformed_literal_error(format!(
                    "link for [{}] must be a string or null: {}",
                    label, other
                )));
            }
        };

        match &triple[2] {
            Value::Null => match link {
                Some(link) => Ok(HierarchyNode::Leaf { label, link }),
                // A linkless node exists only to group children under it.
                None => Err(make_malformed_literal_error(format!(
                    "grouping node [{}] has neither link nor children",
                    label
                ))),
            },
            Value::String(children_page) => Ok(HierarchyNode::External {
                label,
                link,
                children_page: children_page.clone(),
            }),
            Value::Array(child_values) => {
                if child_values.is_empty() {
                    // The generator never emits `[]`; it emits null.  An empty
                    // array would break the children-empty-iff-null contract.
                    return Err(make_malformed_literal_error(format!(
                        "children of [{}] may not be an empty array",
                        label
                    )));
                }
                let children = child_values
                    .iter()
                    .map(HierarchyNode::from_value)
                    .collect::<Result<Vec<_>>>()?;
                Ok(HierarchyNode::Group {
                    label,
                    link,
                    children,
                })
            }
            other => Err(make_malformed_literal_error(format!(
                "children of [{}] must be an array, string, or null: {}",
                label, other
            ))),
        }
    }
}

/// An ordered forest of hierarchy nodes as loaded from one generated file.
/// Constructed once, all-or-nothing, and never mutated afterwards.  Distinct
/// files (and distinct snapshots of the same file) are distinct forests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HierarchyForest {
    roots: Vec<HierarchyNode>,
}

impl HierarchyForest {
    /// Recursive-descent construction from the already-parsed literal.  Any
    /// shape violation anywhere makes the whole forest fail; there is no
    /// partial-tree recovery for static data.
    pub fn from_value(value: &Value) -> Result<HierarchyForest> {
        let root_values = value.as_array().ok_or_else(|| {
            make_malformed_literal_error(format!("top level is not an array: {}", value))
        })?;
        let roots = root_values
            .iter()
            .map(HierarchyNode::from_value)
            .collect::<Result<Vec<_>>>()?;
        Ok(HierarchyForest { roots })
    }

    /// Assemble a forest from already-validated nodes, ex when concatenating
    /// the roots of a snapshot's configured forest files in file order.
    pub fn from_roots(roots: Vec<HierarchyNode>) -> HierarchyForest {
        HierarchyForest { roots }
    }

    /// Top-level nodes in exactly the input order.
    pub fn roots(&self) -> &[HierarchyNode] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<HierarchyNode> {
        self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// First node with the given label in preorder, if any.
    pub fn find(&self, label: &str) -> Option<&HierarchyNode> {
        preorder(&self.roots).find(|node| node.label() == label)
    }

    pub fn iter_preorder(&self) -> Preorder {
        preorder(&self.roots)
    }
}

/// Depth-first preorder traversal over a node list, children in display
/// order.
pub fn preorder(roots: &[HierarchyNode]) -> Preorder {
    Preorder {
        stack: roots.iter().rev().collect(),
    }
}

pub struct Preorder<'a> {
    stack: Vec<&'a HierarchyNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a HierarchyNode;

    fn next(&mut self) -> Option<&'a HierarchyNode> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Unwrap the `var <name> = <literal>;` assignment the generator emits around
/// the hierarchy literal and parse what's inside.
pub fn parse_hierarchy_js(source: &str) -> Result<HierarchyForest> {
    let literal = strip_var_assignment(source)?;
    let value: Value = serde_json::from_str(literal)?;
    HierarchyForest::from_value(&value)
}

fn strip_var_assignment(source: &str) -> Result<&str> {
    let trimmed = source.trim();
    let rest = trimmed.strip_prefix("var").ok_or_else(|| {
        make_malformed_literal_error("file does not start with a var assignment".to_string())
    })?;
    let eq_pos = rest.find('=').ok_or_else(|| {
        make_malformed_literal_error("var assignment has no '='".to_string())
    })?;
    Ok(rest[eq_pos + 1..].trim().trim_end_matches(';').trim_end())
}
