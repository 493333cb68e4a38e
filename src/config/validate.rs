// src/config/validate.rs

use crate::config::model::{PipelineParams, RawEntry};
use crate::errors::{Result, StitchesError};
use crate::pipeline::resource::Resource;
use crate::pipeline::task::TaskDescriptor;

/// A `[[tasks]]` entry after validation.
#[derive(Debug, Clone)]
pub enum Entry {
    Task(TaskDescriptor),
    Pipeline { name: String, params: PipelineParams },
}

/// Turn a raw entry into a task descriptor or a sub-pipeline call.
///
/// `pipeline` and `reference` locate the entry for diagnostics; the reference
/// also becomes the task's identity.
pub fn validate_entry(raw: RawEntry, pipeline: &str, reference: &str) -> Result<Entry> {
    let config_error = |message: String| StitchesError::Config {
        pipeline: pipeline.to_string(),
        reference: reference.to_string(),
        message,
    };

    match (raw.task, raw.pipeline) {
        (Some(_), Some(_)) => Err(config_error(
            "entry declares both `task` and `pipeline`".to_string(),
        )),
        (None, Some(name)) => {
            let params = match raw.params {
                Some(map) => serde_json::from_value(serde_json::Value::Object(map))
                    .map_err(|e| config_error(format!("invalid pipeline params: {e}")))?,
                None => PipelineParams::default(),
            };
            Ok(Entry::Pipeline { name, params })
        }
        (Some(kind), None) => {
            if kind.trim().is_empty() {
                return Err(config_error("task kind is empty".to_string()));
            }

            let parse_all = |specs: &[String]| -> Result<Vec<Resource>> {
                specs
                    .iter()
                    .map(|spec| {
                        Resource::parse(spec).map_err(|source| StitchesError::Resource {
                            pipeline: pipeline.to_string(),
                            reference: reference.to_string(),
                            source,
                        })
                    })
                    .collect()
            };

            Ok(Entry::Task(TaskDescriptor::new(
                kind,
                raw.message.unwrap_or_default(),
                raw.params.unwrap_or_default(),
                parse_all(&raw.inputs)?,
                parse_all(&raw.outputs)?,
                parse_all(&raw.removes)?,
                raw.always,
                pipeline,
                reference,
            )))
        }
        (None, None) => Err(config_error(
            "entry is missing its `task` kind".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_kind_reports_location() {
        let raw = RawEntry {
            message: Some("orphan".into()),
            ..RawEntry::default()
        };
        match validate_entry(raw, "main.toml", "2/1") {
            Err(StitchesError::Config { pipeline, reference, message }) => {
                assert_eq!(pipeline, "main.toml");
                assert_eq!(reference, "2/1");
                assert!(message.contains("missing"));
            }
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn bad_resource_is_a_resource_error() {
        let raw = RawEntry {
            task: Some("script".into()),
            inputs: vec!["nope/x".into()],
            ..RawEntry::default()
        };
        assert!(matches!(
            validate_entry(raw, "main.toml", "0"),
            Err(StitchesError::Resource { .. })
        ));
    }

    #[test]
    fn pipeline_entry_params_are_typed() {
        let mut params = crate::pipeline::task::Params::new();
        params.insert("mapset".into(), serde_json::json!("soils"));
        params.insert("vars".into(), serde_json::json!({"year": 2020}));
        let raw = RawEntry {
            pipeline: Some("sub.toml".into()),
            params: Some(params),
            ..RawEntry::default()
        };
        match validate_entry(raw, "main.toml", "0").unwrap() {
            Entry::Pipeline { name, params } => {
                assert_eq!(name, "sub.toml");
                assert_eq!(params.mapset.as_deref(), Some("soils"));
                assert_eq!(params.vars["year"], serde_json::json!(2020));
            }
            other => panic!("expected a pipeline entry, got {other:?}"),
        }
    }
}
