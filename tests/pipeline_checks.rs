use std::fs;
use std::path::Path;

use docnav_tools::cmd_pipeline::{build_pipeline, PipelineValues};

const HIERARCHY_JS: &str = r#"var hierarchy =
[
    [ "CPUMoniData", "structCPUMoniData.html", null ],
    [ "std::exception", null, [
      [ "Gaps::FatalException", "classGaps_1_1FatalException.html", null ]
    ] ],
    [ "FromTofPacket< MtbMoniData >", "structFromTofPacket.html", [
      [ "MtbMoniData", "structMtbMoniData.html", null ]
    ] ],
    [ "TofPacket", "structTofPacket.html", null ]
];"#;

const NUM_BYTES_JS: &str = r#"(function() {
    var implementors = Object.fromEntries([["argmin",[]],["ndarray_rand",[]],["num",[]],["num_traits",[]]]);
    if (window.register_implementors) {
        window.register_implementors(implementors);
    } else {
        window.pending_implementors = implementors;
    }
})()
//{"start":57,"fragment_lengths":[13,20,11,18]}"#;

const ALIASABLE_WEIGHT_JS: &str = r#"(function() {
    var implementors = Object.fromEntries([["ndarray_rand",[]],["rand_distr",[]]]);
    if (window.register_implementors) {
        window.register_implementors(implementors);
    } else {
        window.pending_implementors = implementors;
    }
})()
//{"start":57,"fragment_lengths":[19,18]}"#;

// Two modules but only one fragment length: a reportable fault, not a parse
// failure.
const BROKEN_JS: &str = r#"(function() {
    var implementors = Object.fromEntries([["alpha",[]],["beta",[]]]);
    window.pending_implementors = implementors;
})()
//{"start":57,"fragment_lengths":[11]}"#;

fn write_snapshot(root: &Path) {
    fs::write(root.join("hierarchy.js"), HIERARCHY_JS).unwrap();

    let trait_impl = root.join("trait.impl");
    for (rel_path, contents) in [
        ("num_traits/ops/bytes/trait.NumBytes.js", NUM_BYTES_JS),
        (
            "rand_distr/weighted_alias/trait.AliasableWeight.js",
            ALIASABLE_WEIGHT_JS,
        ),
        ("broken/trait.Broken.js", BROKEN_JS),
    ] {
        let full_path = trait_impl.join(rel_path);
        fs::create_dir_all(full_path.parent().unwrap()).unwrap();
        fs::write(full_path, contents).unwrap();
    }
}

async fn run_pipeline(arg_str: &str) -> PipelineValues {
    let (pipeline, _output_format) = build_pipeline("docnav-tool", arg_str).unwrap();
    pipeline.run().await.unwrap()
}

#[tokio::test]
async fn test_hierarchy_list_preserves_root_order() {
    let snapshot_dir = tempfile::tempdir().unwrap();
    write_snapshot(snapshot_dir.path());

    let arg_str = format!(
        "--config {} hierarchy-list",
        snapshot_dir.path().display()
    );
    let nodes = match run_pipeline(&arg_str).await {
        PipelineValues::HierarchyNodeList(hl) => hl.nodes,
        _ => panic!("expected a HierarchyNodeList"),
    };
    let labels: Vec<&str> = nodes.iter().map(|n| n.label()).collect();
    assert_eq!(
        labels,
        vec![
            "CPUMoniData",
            "std::exception",
            "FromTofPacket< MtbMoniData >",
            "TofPacket"
        ]
    );
}

#[tokio::test]
async fn test_hierarchy_list_covers_all_configured_forest_files() {
    let snapshot_dir = tempfile::tempdir().unwrap();
    write_snapshot(snapshot_dir.path());
    fs::write(
        snapshot_dir.path().join("namespaces_dup.js"),
        r#"var namespaces_dup =
[
    [ "Gaps", "namespaceGaps.html", null ],
    [ "std", null, "namespacestd.js" ]
];"#,
    )
    .unwrap();

    // Without --file, roots come from every configured forest file, in file
    // order.  (write_snapshot alone leaves namespaces_dup.js absent, which
    // the other tests rely on being fine.)
    let arg_str = format!("--config {} hierarchy-list", snapshot_dir.path().display());
    let nodes = match run_pipeline(&arg_str).await {
        PipelineValues::HierarchyNodeList(hl) => hl.nodes,
        _ => panic!("expected a HierarchyNodeList"),
    };
    let labels: Vec<&str> = nodes.iter().map(|n| n.label()).collect();
    assert_eq!(
        labels,
        vec![
            "CPUMoniData",
            "std::exception",
            "FromTofPacket< MtbMoniData >",
            "TofPacket",
            "Gaps",
            "std"
        ]
    );

    // Naming a file limits the listing to that forest alone.
    let arg_str = format!(
        "--config {} hierarchy-list --file namespaces_dup.js",
        snapshot_dir.path().display()
    );
    let nodes = match run_pipeline(&arg_str).await {
        PipelineValues::HierarchyNodeList(hl) => hl.nodes,
        _ => panic!("expected a HierarchyNodeList"),
    };
    let labels: Vec<&str> = nodes.iter().map(|n| n.label()).collect();
    assert_eq!(labels, vec!["Gaps", "std"]);
}

#[tokio::test]
async fn test_subtree_then_render() {
    let snapshot_dir = tempfile::tempdir().unwrap();
    write_snapshot(snapshot_dir.path());

    let arg_str = format!(
        "--config {} hierarchy-subtree std::exception | render-tree",
        snapshot_dir.path().display()
    );
    let text_file = match run_pipeline(&arg_str).await {
        PipelineValues::TextFile(tf) => tf,
        _ => panic!("expected a TextFile"),
    };
    assert_eq!(text_file.mime_type, "text/plain");
    assert_eq!(
        text_file.contents,
        "std::exception\n  Gaps::FatalException [classGaps_1_1FatalException.html]"
    );
}

#[tokio::test]
async fn test_implementor_lookup_by_trait_key() {
    let snapshot_dir = tempfile::tempdir().unwrap();
    write_snapshot(snapshot_dir.path());

    let arg_str = format!(
        "--config {} implementor-lookup num_traits::ops::bytes::NumBytes",
        snapshot_dir.path().display()
    );
    let result = match run_pipeline(&arg_str).await {
        PipelineValues::ImplementorRecordList(il) => il,
        _ => panic!("expected an ImplementorRecordList"),
    };
    assert!(result.faults.is_empty());
    assert_eq!(result.records.len(), 1);
    let record = &result.records[0];
    assert_eq!(record.trait_key, "num_traits::ops::bytes::NumBytes");
    assert_eq!(record.start, 57);
    assert_eq!(record.fragment_lengths, vec![13, 20, 11, 18]);
    let modules: Vec<&str> = record
        .implementors
        .iter()
        .map(|mi| mi.module.as_str())
        .collect();
    assert_eq!(modules, vec!["argmin", "ndarray_rand", "num", "num_traits"]);
}

#[tokio::test]
async fn test_implementor_scan_reports_faults_and_keeps_records() {
    let snapshot_dir = tempfile::tempdir().unwrap();
    write_snapshot(snapshot_dir.path());

    let arg_str = format!(
        "--config {} implementor-scan",
        snapshot_dir.path().display()
    );
    let result = match run_pipeline(&arg_str).await {
        PipelineValues::ImplementorRecordList(il) => il,
        _ => panic!("expected an ImplementorRecordList"),
    };

    // Registration order is the natural lexical file order, and the faulty
    // record is kept as-is alongside its reported fault.
    let keys: Vec<&str> = result.records.iter().map(|r| r.trait_key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "broken::Broken",
            "num_traits::ops::bytes::NumBytes",
            "rand_distr::weighted_alias::AliasableWeight"
        ]
    );
    assert_eq!(result.faults.len(), 1);
    assert!(result.faults[0].contains("broken::Broken"), "{}", result.faults[0]);
}

#[tokio::test]
async fn test_implementor_scan_strict_fails_on_fault() {
    let snapshot_dir = tempfile::tempdir().unwrap();
    write_snapshot(snapshot_dir.path());

    let arg_str = format!(
        "--config {} implementor-scan --strict",
        snapshot_dir.path().display()
    );
    let (pipeline, _) = build_pipeline("docnav-tool", &arg_str).unwrap();
    assert!(pipeline.run().await.is_err());
}

#[tokio::test]
async fn test_snapshots_are_selected_not_merged() {
    let index_dir = tempfile::tempdir().unwrap();
    let v1_dir = index_dir.path().join("v1");
    let v2_dir = index_dir.path().join("v2");
    fs::create_dir_all(&v1_dir).unwrap();
    fs::create_dir_all(&v2_dir).unwrap();
    fs::write(
        v1_dir.join("hierarchy.js"),
        r#"var hierarchy = [["OnlyV1","v1.html",null]];"#,
    )
    .unwrap();
    fs::write(
        v2_dir.join("hierarchy.js"),
        r#"var hierarchy = [["OnlyV2","v2.html",null],["LTB","structLTB.html",null]];"#,
    )
    .unwrap();

    let config_path = index_dir.path().join("config.json");
    let config = serde_json::json!({
        "default_snapshot": "v1",
        "snapshots": {
            "v1": { "nav_path": v1_dir.to_str().unwrap() },
            "v2": { "nav_path": v2_dir.to_str().unwrap() },
        },
    });
    fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let labels_for = |snapshot_arg: &str| {
        let arg_str = format!(
            "--config {}{} hierarchy-list",
            config_path.display(),
            snapshot_arg
        );
        async move {
            match run_pipeline(&arg_str).await {
                PipelineValues::HierarchyNodeList(hl) => hl
                    .nodes
                    .iter()
                    .map(|n| n.label().to_string())
                    .collect::<Vec<_>>(),
                _ => panic!("expected a HierarchyNodeList"),
            }
        }
    };

    // The default snapshot answers when none is named.
    assert_eq!(labels_for("").await, vec!["OnlyV1"]);
    // Naming the other snapshot answers from it alone; nothing leaks across.
    assert_eq!(labels_for(" --snapshot v2").await, vec!["OnlyV2", "LTB"]);
}
