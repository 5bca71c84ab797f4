extern crate serde;
extern crate serde_json;

extern crate clap;
extern crate itertools;
#[macro_use]
extern crate lazy_static;
extern crate lexical_sort;
#[macro_use]
extern crate tracing;
extern crate tracing_subscriber;

pub mod file_format;

pub mod abstract_site;
pub mod cmd_pipeline;
pub mod logging;
pub mod registry;
