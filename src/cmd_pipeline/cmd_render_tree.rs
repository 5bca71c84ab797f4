use async_trait::async_trait;
use clap::Args;
use itertools::Itertools;

use super::interface::{PipelineCommand, PipelineValues, TextFile};

use crate::abstract_site::{AbstractSite, ErrorDetails, ErrorLayer, Result, SiteError};
use crate::file_format::hierarchy::HierarchyNode;

/// Render the node list received via input as an indented text tree, one
/// node per line, links in brackets.
#[derive(Debug, Args)]
pub struct RenderTree {
    /// Indent width per nesting level.
    #[clap(long, default_value = "2")]
    pub indent: usize,
}

#[derive(Debug)]
pub struct RenderTreeCommand {
    pub args: RenderTree,
}

impl RenderTreeCommand {
    fn render_into(&self, node: &HierarchyNode, depth: usize, lines: &mut Vec<String>) {
        let padding = " ".repeat(depth * self.args.indent);
        let line = match node {
            HierarchyNode::Leaf { label, link } => format!("{}{} [{}]", padding, label, link),
            HierarchyNode::Group { label, link, .. } => match link {
                Some(link) => format!("{}{} [{}]", padding, label, link),
                None => format!("{}{}", padding, label),
            },
            HierarchyNode::External {
                label,
                children_page,
                ..
            } => format!("{}{} (see {})", padding, label, children_page),
        };
        lines.push(line);
        for child in node.children() {
            self.render_into(child, depth + 1, lines);
        }
    }
}

#[async_trait]
impl PipelineCommand for RenderTreeCommand {
    async fn execute(
        &self,
        _site: &Box<dyn AbstractSite + Send + Sync>,
        input: PipelineValues,
    ) -> Result<PipelineValues> {
        let nl = match input {
            PipelineValues::HierarchyNodeList(nl) => nl,
            _ => {
                return Err(SiteError::StickyProblem(ErrorDetails {
                    layer: ErrorLayer::BadInput,
                    message: "render-tree needs a HierarchyNodeList".to_string(),
                }));
            }
        };

        let mut lines = vec![];
        for node in &nl.nodes {
            self.render_into(node, 0, &mut lines);
        }

        Ok(PipelineValues::TextFile(TextFile {
            mime_type: "text/plain".to_string(),
            contents: lines.iter().join("\n"),
        }))
    }
}
