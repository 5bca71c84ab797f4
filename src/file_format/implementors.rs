use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::abstract_site::{ErrorDetails, ErrorLayer, Result, SiteError};

fn make_malformed_literal_error(context: String) -> SiteError {
    SiteError::StickyProblem(ErrorDetails {
        layer: ErrorLayer::DataLayer,
        message: format!("malformed implementor literal: {}", context),
    })
}

/// A single rendered impl on an implementor's documentation page: the
/// identifier text plus the URL fragment of the section where it lives.
/// Empty across the supplied snapshots but the format carries them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub text: String,
    pub link: String,
}

/// One implementing module and its rendered impl fragments, in the order the
/// generator wrote them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModuleImplementors {
    pub module: String,
    pub fragments: Vec<Fragment>,
}

/// One trait.impl registration: which modules implement the trait, plus the
/// lazy-loading pagination hints (`start` byte offset and per-module
/// `fragment_lengths`) that let the front end splice demand-loaded
/// implementor lists into the combined payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImplementorRecord {
    pub trait_key: String,
    pub implementors: Vec<ModuleImplementors>,
    pub start: u64,
    pub fragment_lengths: Vec<u64>,
}

impl ImplementorRecord {
    /// The pagination hints must cover each module exactly once, in order.
    /// A mismatch is a data-integrity fault to report; the record itself is
    /// kept as-is for diagnostic display, never truncated or padded.
    pub fn check_fragment_arity(&self) -> Result<()> {
        if self.fragment_lengths.len() != self.implementors.len() {
            return Err(SiteError::StickyProblem(ErrorDetails {
                layer: ErrorLayer::DataLayer,
                message: format!(
                    "fragment arity mismatch for [{}]: {} modules but {} fragment lengths",
                    self.trait_key,
                    self.implementors.len(),
                    self.fragment_lengths.len()
                ),
            }));
        }
        Ok(())
    }
}

/// Derive the fully-qualified trait key from a registration file's path
/// relative to the trait.impl directory, ex:
/// "num_traits/ops/bytes/trait.NumBytes.js" -> "num_traits::ops::bytes::NumBytes".
pub fn trait_key_from_path(rel_path: &str) -> String {
    let no_ext = rel_path.strip_suffix(".js").unwrap_or(rel_path);
    no_ext
        .split('/')
        .map(|segment| segment.strip_prefix("trait.").unwrap_or(segment))
        .collect::<Vec<_>>()
        .join("::")
}

const PAYLOAD_MARKER: &str = "Object.fromEntries(";
const META_MARKER: &str = "//";

/// Sibling comment-encoded metadata record at the end of each registration
/// file.
#[derive(Debug, Deserialize)]
struct ImplementorMeta {
    start: u64,
    fragment_lengths: Vec<u64>,
}

/// Parse one trait.impl registration file as rustdoc emits it: an IIFE
/// wrapping `Object.fromEntries([[module, [fragments...]], ...])` followed by
/// a `//{"start":N,"fragment_lengths":[...]}` comment line.
///
/// The fragment arity invariant is deliberately NOT enforced here; the
/// registry reports it at registration time while keeping the record.
pub fn parse_implementors_js(source: &str, trait_key: &str) -> Result<ImplementorRecord> {
    let payload = extract_payload(source)?;
    let entries: Value = serde_json::from_str(payload)?;
    let implementors = parse_entries(&entries)?;
    let meta = extract_meta(source)?;

    Ok(ImplementorRecord {
        trait_key: trait_key.to_string(),
        implementors,
        start: meta.start,
        fragment_lengths: meta.fragment_lengths,
    })
}

/// Slice out the JSON array argument of `Object.fromEntries(...)`.  Fragment
/// text is arbitrary rendered code, so we cannot just look for the last `]`;
/// we scan for the matching bracket while honoring JSON string syntax.
fn extract_payload(source: &str) -> Result<&str> {
    let marker_pos = source.find(PAYLOAD_MARKER).ok_or_else(|| {
        make_malformed_literal_error("no Object.fromEntries payload".to_string())
    })?;
    let array_start = marker_pos + PAYLOAD_MARKER.len();
    let bytes = source.as_bytes();
    if bytes.get(array_start) != Some(&b'[') {
        return Err(make_malformed_literal_error(
            "payload does not start with an array".to_string(),
        ));
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, b) in bytes[array_start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if *b == b'\\' {
                escaped = true;
            } else if *b == b'"' {
                in_string = false;
            }
            continue;
        }
        match *b {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&source[array_start..array_start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    Err(make_malformed_literal_error(
        "unterminated payload array".to_string(),
    ))
}

fn extract_meta(source: &str) -> Result<ImplementorMeta> {
    // The metadata comment is the last non-empty line of the file.
    let meta_line = source
        .lines()
        .rev()
        .map(|line| line.trim())
        .find(|line| !line.is_empty())
        .unwrap_or("");
    let meta_json = meta_line.strip_prefix(META_MARKER).ok_or_else(|| {
        make_malformed_literal_error("missing metadata comment".to_string())
    })?;
    Ok(serde_json::from_str(meta_json)?)
}

fn parse_entries(entries: &Value) -> Result<Vec<ModuleImplementors>> {
    let rows = entries.as_array().ok_or_else(|| {
        make_malformed_literal_error(format!("payload is not an array: {}", entries))
    })?;

    let mut seen_modules = HashSet::new();
    let mut implementors = vec![];
    for row in rows {
        let pair = row.as_array().filter(|pair| pair.len() == 2).ok_or_else(|| {
            make_malformed_literal_error(format!(
                "module entry is not a [name, fragments] pair: {}",
                row
            ))
        })?;
        let module = match pair[0].as_str() {
            Some(module) if !module.is_empty() => module.to_string(),
            _ => {
                return Err(make_malformed_literal_error(format!(
                    "module name must be a non-empty string: {}",
                    pair[0]
                )));
            }
        };
        if !seen_modules.insert(module.clone()) {
            return Err(make_malformed_literal_error(format!(
                "duplicate module name: {}",
                module
            )));
        }
        let fragments = parse_fragments(&module, &pair[1])?;
        implementors.push(ModuleImplementors { module, fragments });
    }
    Ok(implementors)
}

fn parse_fragments(module: &str, value: &Value) -> Result<Vec<Fragment>> {
    let rows = value.as_array().ok_or_else(|| {
        make_malformed_literal_error(format!(
            "fragments of [{}] are not an array: {}",
            module, value
        ))
    })?;

    let mut fragments = vec![];
    for row in rows {
        // rustdoc emits [text, link] with an occasional trailing element we
        // have no consumer for.
        let cells = row.as_array().filter(|cells| cells.len() >= 2).ok_or_else(|| {
            make_malformed_literal_error(format!(
                "fragment of [{}] is not a [text, link] entry: {}",
                module, row
            ))
        })?;
        match (cells[0].as_str(), cells[1].as_str()) {
            (Some(text), Some(link)) => fragments.push(Fragment {
                text: text.to_string(),
                link: link.to_string(),
            }),
            _ => {
                return Err(make_malformed_literal_error(format!(
                    "fragment of [{}] has non-string cells: {}",
                    module, row
                )));
            }
        }
    }
    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verbatim rustdoc output for a trait with no rendered fragments.
    const NUM_BYTES_JS: &str = r#"(function() {
    var implementors = Object.fromEntries([["argmin",[]],["ndarray_rand",[]],["num",[]],["num_traits",[]]]);
    if (window.register_implementors) {
        window.register_implementors(implementors);
    } else {
        window.pending_implementors = implementors;
    }
})()
//{"start":57,"fragment_lengths":[13,20,11,18]}"#;

    fn module_names(record: &ImplementorRecord) -> Vec<&str> {
        record
            .implementors
            .iter()
            .map(|mi| mi.module.as_str())
            .collect()
    }

    #[test]
    fn test_parse_real_registration() {
        let record =
            parse_implementors_js(NUM_BYTES_JS, "num_traits::ops::bytes::NumBytes").unwrap();
        assert_eq!(record.trait_key, "num_traits::ops::bytes::NumBytes");
        assert_eq!(
            module_names(&record),
            vec!["argmin", "ndarray_rand", "num", "num_traits"]
        );
        assert!(record.implementors.iter().all(|mi| mi.fragments.is_empty()));
        assert_eq!(record.start, 57);
        assert_eq!(record.fragment_lengths, vec![13, 20, 11, 18]);
        assert!(record.check_fragment_arity().is_ok());
    }

    #[test]
    fn test_parse_is_deterministic() {
        let key = "num_traits::ops::bytes::NumBytes";
        assert_eq!(
            parse_implementors_js(NUM_BYTES_JS, key).unwrap(),
            parse_implementors_js(NUM_BYTES_JS, key).unwrap()
        );
    }

    #[test]
    fn test_nonempty_fragments() {
        let source = r#"(function() {
    var implementors = Object.fromEntries([["mycrate",[["impl Frob for Widget[]", "impl-Frob-for-Widget"]]]]);
    if (window.register_implementors) {
        window.register_implementors(implementors);
    } else {
        window.pending_implementors = implementors;
    }
})()
//{"start":57,"fragment_lengths":[42]}"#;
        let record = parse_implementors_js(source, "mycrate::Frob").unwrap();
        assert_eq!(record.implementors.len(), 1);
        // Brackets inside the fragment text must not confuse the scanner.
        assert_eq!(
            record.implementors[0].fragments,
            vec![Fragment {
                text: "impl Frob for Widget[]".to_string(),
                link: "impl-Frob-for-Widget".to_string(),
            }]
        );
    }

    #[test]
    fn test_arity_mismatch_reported_but_record_kept() {
        let source = r#"(function() {
    var implementors = Object.fromEntries([["a",[]],["b",[]]]);
    window.pending_implementors = implementors;
})()
//{"start":57,"fragment_lengths":[9]}"#;
        let record = parse_implementors_js(source, "x::Y").unwrap();
        // Parsing keeps the record as-is; the fault only surfaces on check.
        assert_eq!(module_names(&record), vec!["a", "b"]);
        assert_eq!(record.fragment_lengths, vec![9]);
        let err = record.check_fragment_arity().unwrap_err();
        match err {
            SiteError::StickyProblem(details) => {
                assert!(details.message.contains("2 modules but 1"), "{}", details.message);
            }
            other => panic!("expected a sticky problem, got {:?}", other),
        }
    }

    #[test]
    fn test_trait_key_from_path() {
        assert_eq!(
            trait_key_from_path("num_traits/ops/bytes/trait.NumBytes.js"),
            "num_traits::ops::bytes::NumBytes"
        );
        assert_eq!(
            trait_key_from_path("rand_distr/weighted_alias/trait.AliasableWeight.js"),
            "rand_distr::weighted_alias::AliasableWeight"
        );
        assert_eq!(trait_key_from_path("trait.Foo.js"), "Foo");
    }

    #[test]
    fn test_missing_payload_or_meta_is_fatal() {
        assert!(parse_implementors_js("window.pending_implementors = 1;", "x").is_err());
        assert!(parse_implementors_js(
            "(function() { var implementors = Object.fromEntries([[\"a\",[]]]); })()",
            "x"
        )
        .is_err());
    }

    #[test]
    fn test_duplicate_module_is_fatal() {
        let source = r#"(function() {
    var implementors = Object.fromEntries([["a",[]],["a",[]]]);
})()
//{"start":57,"fragment_lengths":[9,9]}"#;
        assert!(parse_implementors_js(source, "x::Y").is_err());
    }

    #[test]
    fn test_unterminated_payload_is_fatal() {
        let source = "var implementors = Object.fromEntries([[\"a\",[]]";
        assert!(parse_implementors_js(source, "x").is_err());
    }
}
