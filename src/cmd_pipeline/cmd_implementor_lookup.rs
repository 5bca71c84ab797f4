use async_trait::async_trait;
use clap::Args;

use super::interface::{ImplementorRecordList, PipelineCommand, PipelineValues};

use crate::abstract_site::{AbstractSite, ErrorDetails, ErrorLayer, Result, SiteError};
use crate::file_format::implementors::trait_key_from_path;

/// Return the implementor registration records for one or more traits named
/// by their fully-qualified key, ex `num_traits::ops::bytes::NumBytes`.
/// Traits with no registration file produce a missing list section rather
/// than an error.
#[derive(Debug, Args)]
pub struct ImplementorLookup {
    /// Fully-qualified trait keys to look up.
    pub traits: Vec<String>,
}

#[derive(Debug)]
pub struct ImplementorLookupCommand {
    pub args: ImplementorLookup,
}

#[async_trait]
impl PipelineCommand for ImplementorLookupCommand {
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
                    message: "implementor-lookup needs a Void input".to_string(),
                }));
            }
        }

        let rel_paths = site.list_trait_impl_files().await?;

        let mut records = vec![];
        let mut faults = vec![];
        for trait_key in &self.args.traits {
            let rel_path = rel_paths
                .iter()
                .find(|rel_path| &trait_key_from_path(rel_path) == trait_key);
            match rel_path {
                Some(rel_path) => {
                    let record = site.fetch_trait_impl(rel_path).await?;
                    if let Err(SiteError::StickyProblem(details)) = record.check_fragment_arity()
                    {
                        faults.push(details.message);
                    }
                    records.push(record);
                }
                None => {
                    warn!(trait_key = %trait_key, "no registration file for this trait");
                }
            }
        }

        Ok(PipelineValues::ImplementorRecordList(
            ImplementorRecordList { records, faults },
        ))
    }
}
