use clap::{Parser, Subcommand, ValueEnum};

use super::cmd_hierarchy_list::HierarchyList;
use super::cmd_hierarchy_subtree::HierarchySubtree;
use super::cmd_implementor_lookup::ImplementorLookup;
use super::cmd_implementor_scan::ImplementorScan;
use super::cmd_render_tree::RenderTree;

#[derive(Clone, Debug, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    Pretty,
    /// Un-pretty-printed JSON.
    Concise,
}

#[derive(Debug, Parser)]
pub struct ToolOpts {
    /// Path to the config.json describing the available documentation
    /// snapshots, or directly to the root directory of a single generated
    /// snapshot.
    #[clap(long, default_value = "config.json", env = "DOCNAV_CONFIG")]
    pub config: String,

    /// The name of the snapshot to use.  When left empty we fall back to the
    /// config's default_snapshot, or to the only snapshot if there is exactly
    /// one.
    #[clap(long, default_value = "", env = "DOCNAV_SNAPSHOT")]
    pub snapshot: String,

    #[clap(long, short, value_enum, ignore_case = true, default_value = "concise")]
    pub output_format: OutputFormat,

    #[clap(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    HierarchyList(HierarchyList),
    HierarchySubtree(HierarchySubtree),
    ImplementorLookup(ImplementorLookup),
    ImplementorScan(ImplementorScan),
    RenderTree(RenderTree),
}
