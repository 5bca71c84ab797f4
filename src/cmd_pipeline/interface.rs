use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{trace, trace_span, Instrument};

pub use crate::abstract_site::{AbstractSite, Result};
use crate::file_format::hierarchy::HierarchyNode;
use crate::file_format::implementors::ImplementorRecord;

/// The input and output of each pipeline segment
#[derive(Serialize)]
pub enum PipelineValues {
    HierarchyNodeList(HierarchyNodeList),
    ImplementorRecordList(ImplementorRecordList),
    TextFile(TextFile),
    Void,
}

/// An ordered list of hierarchy nodes, each carrying its subtree.  Order is
/// the underlying forest's display order, or the selection order of the
/// command that produced the list.
#[derive(Serialize)]
pub struct HierarchyNodeList {
    pub nodes: Vec<HierarchyNode>,
}

/// Implementor registration records plus any data-integrity faults hit while
/// producing them.  Faults ride along instead of winning: bad pagination
/// metadata means an incomplete-but-displayed listing, never a failure of
/// the surrounding render.
#[derive(Serialize)]
pub struct ImplementorRecordList {
    pub records: Vec<ImplementorRecord>,
    pub faults: Vec<String>,
}

#[derive(Serialize)]
pub struct TextFile {
    pub mime_type: String,
    pub contents: String,
}

/// A command that takes a single input and produces a single output.  At the
/// start of the pipeline, the input may be ignored / expected to be void.
#[async_trait]
pub trait PipelineCommand: Debug {
    async fn execute(
        &self,
        site: &Box<dyn AbstractSite + Send + Sync>,
        input: PipelineValues,
    ) -> Result<PipelineValues>;
}

/// Multiple-use linear pipeline sequence.
pub struct SitePipeline {
    pub site: Box<dyn AbstractSite + Send + Sync>,
    pub commands: Vec<Box<dyn PipelineCommand + Send + Sync>>,
}

impl SitePipeline {
    pub async fn run(&self) -> Result<PipelineValues> {
        let mut cur_values = PipelineValues::Void;

        for cmd in &self.commands {
            let span = trace_span!("run_pipeline_step", cmd = ?cmd);

            match cmd.execute(&self.site, cur_values).instrument(span).await {
                Ok(next_values) => {
                    cur_values = next_values;
                }
                Err(err) => {
                    trace!(err = ?err);
                    return Err(err);
                }
            }
        }

        Ok(cur_values)
    }
}
