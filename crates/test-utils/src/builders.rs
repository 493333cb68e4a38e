#![allow(dead_code)]

use serde::Serialize;
use serde_json::{Map, Value};

/// Builder for pipeline documents, rendered to TOML text.
#[derive(Debug, Default, Serialize)]
pub struct PipelineBuilder {
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mapset: Option<String>,
    tasks: Vec<EntryBuilder>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn database(mut self, database: &str) -> Self {
        self.database = Some(database.to_string());
        self
    }

    pub fn location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    pub fn mapset(mut self, mapset: &str) -> Self {
        self.mapset = Some(mapset.to_string());
        self
    }

    pub fn with(mut self, entry: EntryBuilder) -> Self {
        self.tasks.push(entry);
        self
    }

    pub fn build(self) -> String {
        toml::to_string(&self).expect("pipeline builder produced unserializable TOML")
    }
}

/// Builder for one `[[tasks]]` entry.
#[derive(Debug, Default, Serialize)]
pub struct EntryBuilder {
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pipeline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    inputs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    outputs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    removes: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    always: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Map<String, Value>>,
}

impl EntryBuilder {
    /// A task entry of the given kind.
    pub fn task(kind: &str) -> Self {
        Self {
            task: Some(kind.to_string()),
            ..Self::default()
        }
    }

    /// A sub-pipeline entry.
    pub fn pipeline(name: &str) -> Self {
        Self {
            pipeline: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn input(mut self, spec: &str) -> Self {
        self.inputs.push(spec.to_string());
        self
    }

    pub fn output(mut self, spec: &str) -> Self {
        self.outputs.push(spec.to_string());
        self
    }

    pub fn remove(mut self, spec: &str) -> Self {
        self.removes.push(spec.to_string());
        self
    }

    pub fn always(mut self) -> Self {
        self.always = true;
        self
    }

    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Template variable for a sub-pipeline entry (`params.vars.<key>`).
    pub fn var(mut self, key: &str, value: impl Into<Value>) -> Self {
        let params = self.params.get_or_insert_with(Map::new);
        let vars = params
            .entry("vars")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(vars) = vars {
            vars.insert(key.to_string(), value.into());
        }
        self
    }
}
