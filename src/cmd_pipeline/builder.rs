use clap::Parser;
use tracing::{trace, trace_span};

use crate::abstract_site::{make_local_site, ErrorDetails, ErrorLayer, Result, SiteError};
use crate::cmd_pipeline::parser::{Command, OutputFormat, ToolOpts};
use crate::cmd_pipeline::PipelineCommand;

use super::cmd_hierarchy_list::HierarchyListCommand;
use super::cmd_hierarchy_subtree::HierarchySubtreeCommand;
use super::cmd_implementor_lookup::ImplementorLookupCommand;
use super::cmd_implementor_scan::ImplementorScanCommand;
use super::cmd_render_tree::RenderTreeCommand;
use super::interface::SitePipeline;

pub fn fab_command_from_opts(opts: ToolOpts) -> Result<Box<dyn PipelineCommand + Send + Sync>> {
    match opts.cmd {
        Command::HierarchyList(hl) => Ok(Box::new(HierarchyListCommand { args: hl })),

        Command::HierarchySubtree(hs) => Ok(Box::new(HierarchySubtreeCommand { args: hs })),

        Command::ImplementorLookup(il) => Ok(Box::new(ImplementorLookupCommand { args: il })),

        Command::ImplementorScan(is) => Ok(Box::new(ImplementorScanCommand { args: is })),

        Command::RenderTree(rt) => Ok(Box::new(RenderTreeCommand { args: rt })),
    }
}

/// Build a command pipeline from a shell-y string where we use pipe
/// boundaries to delineate the separate pipeline steps.
///
/// The shell-words module is used to parse `arg_str` into shell words, which
/// we then break into separate sub-commands whenever we see a `|`.  We then
/// pass these sub-commands to the clap parsing `try_parse_from` method,
/// taking care to stuff our binary name into the first arg.  The first
/// segment also decides which snapshot the whole pipeline runs against.
pub fn build_pipeline(bin_name: &str, arg_str: &str) -> Result<(SitePipeline, OutputFormat)> {
    let span = trace_span!("build_pipeline", arg_str);
    let _span_guard = span.enter();

    let all_args = match shell_words::split(arg_str) {
        Ok(parsed) => parsed,
        Err(err) => {
            return Err(SiteError::StickyProblem(ErrorDetails {
                layer: ErrorLayer::BadInput,
                message: err.to_string(),
            }));
        }
    };

    let mut site = None;
    let mut output_format = None;
    let mut first_time = true;

    let mut commands: Vec<Box<dyn PipelineCommand + Send + Sync>> = vec![];

    for arg_slices in all_args.split(|v| v == "|") {
        let mut fake_args = vec![bin_name.to_string()];
        fake_args.extend(arg_slices.iter().cloned());

        let opts = match ToolOpts::try_parse_from(fake_args) {
            Ok(opts) => opts,
            Err(err) => {
                return Err(SiteError::StickyProblem(ErrorDetails {
                    layer: ErrorLayer::BadInput,
                    message: err.to_string(),
                }));
            }
        };

        if first_time {
            let local_site = make_local_site(&opts.config, &opts.snapshot)?;
            trace!(snapshot = local_site.snapshot_name());
            site = Some(local_site);
            output_format = Some(opts.output_format.clone());
            first_time = false;
        }

        trace!(cmd = ?opts.cmd);
        commands.push(fab_command_from_opts(opts)?);
    }

    match (site, output_format) {
        (Some(site), Some(output_format)) => Ok((SitePipeline { site, commands }, output_format)),
        _ => Err(SiteError::StickyProblem(ErrorDetails {
            layer: ErrorLayer::BadInput,
            message: "empty pipeline".to_string(),
        })),
    }
}
