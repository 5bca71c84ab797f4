use async_trait::async_trait;
use clap::Args;

use super::interface::{HierarchyNodeList, PipelineCommand, PipelineValues};

use crate::abstract_site::{AbstractSite, ErrorDetails, ErrorLayer, Result, SiteError};

/// Load a hierarchy forest file and emit its root nodes (each carrying its
/// subtree) in display order.
#[derive(Debug, Args)]
pub struct HierarchyList {
    /// Hierarchy file to load, relative to the snapshot root.  When omitted,
    /// every forest file the snapshot's config lists is loaded, roots
    /// concatenated in file order.
    #[clap(long)]
    pub file: Option<String>,

    /// Only emit roots whose label exactly matches.
    #[clap(long)]
    pub label: Option<String>,
}

#[derive(Debug)]
pub struct HierarchyListCommand {
    pub args: HierarchyList,
}

#[async_trait]
impl PipelineCommand for HierarchyListCommand {
    async fn execute(
        &self,
        site: &Box<dyn AbstractSite + Send + Sync>,
        input: PipelineValues,
    ) -> Result<PipelineValues> {
        match input {
            PipelineValues::Void => {}
            _ => {
                return Err(SiteError::StickyProblem(ErrorDetails {
                    layer: ErrorLayer::BadInput,
                    message: "hierarchy-list needs a Void input".to_string(),
                }));
            }
        }

        let forest = match &self.args.file {
            Some(file) => site.fetch_hierarchy(file).await?,
            None => site.fetch_default_hierarchy().await?,
        };

        let nodes = forest
            .roots()
            .iter()
            .filter(|node| match &self.args.label {
                Some(label) => node.label() == label,
                None => true,
            })
            .cloned()
            .collect();

        Ok(PipelineValues::HierarchyNodeList(HierarchyNodeList {
            nodes,
        }))
    }
}
