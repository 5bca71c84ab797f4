use async_trait::async_trait;
use clap::Args;

use super::interface::{HierarchyNodeList, PipelineCommand, PipelineValues};

use crate::abstract_site::{AbstractSite, ErrorDetails, ErrorLayer, Result, SiteError};
use crate::file_format::hierarchy::preorder;

/// Select labeled nodes, with their subtrees, from the node list received via
/// input or from a hierarchy file if first in the pipeline.  Labels that
/// match nothing produce a missing section in the output rather than an
/// error.
#[derive(Debug, Args)]
pub struct HierarchySubtree {
    /// Labels of the nodes to select, in output order.
    pub labels: Vec<String>,

    /// Hierarchy file to load when this is the first pipeline command.
    /// When omitted, every forest file the snapshot's config lists is
    /// loaded.
    #[clap(long)]
    pub file: Option<String>,
}

#[derive(Debug)]
pub struct HierarchySubtreeCommand {
    pub args: HierarchySubtree,
}

#[async_trait]
impl PipelineCommand for HierarchySubtreeCommand {
    async fn execute(
        &self,
        site: &Box<dyn AbstractSite + Send + Sync>,
        input: PipelineValues,
    ) -> Result<PipelineValues> {
        let haystack = match input {
            PipelineValues::HierarchyNodeList(hl) => hl.nodes,
            PipelineValues::Void => match &self.args.file {
                Some(file) => site.fetch_hierarchy(file).await?.into_roots(),
                None => site.fetch_default_hierarchy().await?.into_roots(),
            },
            _ => {
                return Err(SiteError::StickyProblem(ErrorDetails {
                    layer: ErrorLayer::BadInput,
                    message: "hierarchy-subtree needs a Void or HierarchyNodeList".to_string(),
                }));
            }
        };

        let mut nodes = vec![];
        for label in &self.args.labels {
            match preorder(&haystack).find(|node| node.label() == label) {
                Some(node) => nodes.push(node.clone()),
                None => {
                    warn!(label = %label, "no hierarchy node with this label");
                }
            }
        }

        Ok(PipelineValues::HierarchyNodeList(HierarchyNodeList {
            nodes,
        }))
    }
}
