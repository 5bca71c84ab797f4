use async_trait::async_trait;
use clap::Args;

use super::interface::{ImplementorRecordList, PipelineCommand, PipelineValues};

use crate::abstract_site::{AbstractSite, ErrorDetails, ErrorLayer, Result, SiteError};
use crate::registry::ImplementorRegistry;

/// Parse every implementor registration in the snapshot in file order,
/// register each record, and emit the drained registry contents.  This is
/// the page-load behavior of the generated site with no renderer installed
/// yet: everything buffers, then the consumer drains exactly once.
#[derive(Debug, Args)]
pub struct ImplementorScan {
    /// Fail the pipeline on the first data-integrity fault instead of
    /// reporting it alongside the records.
    #[clap(long)]
    pub strict: bool,
}

#[derive(Debug)]
pub struct ImplementorScanCommand {
    pub args: ImplementorScan,
}

#[async_trait]
impl PipelineCommand for ImplementorScanCommand {
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
                    message: "implementor-scan needs a Void input".to_string(),
                }));
            }
        }

        let mut registry = ImplementorRegistry::new();
        let mut faults = vec![];

        for rel_path in site.list_trait_impl_files().await? {
            let record = site.fetch_trait_impl(&rel_path).await?;
            if let Err(fault) = registry.register(record) {
                if self.args.strict {
                    return Err(fault);
                }
                match fault {
                    SiteError::StickyProblem(details) => faults.push(details.message),
                    other => faults.push(format!("{:?}", other)),
                }
            }
        }

        Ok(PipelineValues::ImplementorRecordList(
            ImplementorRecordList {
                records: registry.drain(),
                faults,
            },
        ))
    }
}
