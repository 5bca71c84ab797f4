pub mod builder;
pub mod interface;
pub mod parser;

mod cmd_hierarchy_list;
mod cmd_hierarchy_subtree;
mod cmd_implementor_lookup;
mod cmd_implementor_scan;
mod cmd_render_tree;

pub use builder::build_pipeline;
pub use interface::{PipelineCommand, PipelineValues};
