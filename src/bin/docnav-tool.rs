use std::env::args_os;

use serde::Serialize;
use serde_json::{to_string, to_string_pretty};

use docnav_tools::cmd_pipeline::{builder::build_pipeline, parser::OutputFormat, PipelineValues};
use docnav_tools::logging::init_logging;

fn print_json<T: Serialize>(payload: &T, output_format: &OutputFormat) {
    let rendered = match output_format {
        OutputFormat::Concise => to_string(payload),
        OutputFormat::Pretty => to_string_pretty(payload),
    };
    if let Ok(rendered) = rendered {
        println!("{}", rendered);
    }
}

#[tokio::main]
async fn main() {
    init_logging();

    let os_args: Vec<String> = args_os()
        .map(|os| os.into_string().unwrap_or("".to_string()))
        .collect();
    if os_args.len() < 2 {
        eprintln!("Usage: {} 'CMD ARGS... | CMD ARGS...'", os_args[0]);
        std::process::exit(1);
    }

    let (pipeline, output_format) = match build_pipeline(&os_args[0], &os_args[1]) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            panic!("You did not specify a good pipeline!\n {:?}", err);
        }
    };

    let values = match pipeline.run().await {
        Ok(values) => values,
        Err(err) => {
            println!("Pipeline Error!");
            println!("{:?}", err);
            return;
        }
    };

    match values {
        PipelineValues::Void => {
            println!("Void result.");
        }
        PipelineValues::TextFile(tf) => {
            println!("{}", tf.contents);
        }
        PipelineValues::HierarchyNodeList(hl) => {
            print_json(&hl, &output_format);
        }
        PipelineValues::ImplementorRecordList(il) => {
            print_json(&il, &output_format);
        }
    }
}
