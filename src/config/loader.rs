// src/config/loader.rs

use std::path::{Path, PathBuf};

use minijinja::Environment;

use crate::config::model::RawPipeline;
use crate::errors::{Result, StitchesError};
use crate::pipeline::task::{Params, Scope};

/// File name of the persisted history inside a mapset directory.
pub const STATE_FILE_NAME: &str = "stitches.state.json";

/// Build the template environment used to render pipeline documents.
///
/// Templates are looked up by name relative to `root` (the directory of the
/// root pipeline). `basename` and `dirname` filters are available.
pub fn template_environment(root: impl AsRef<Path>) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(minijinja::path_loader(root.as_ref()));
    register_filters(&mut env);
    env
}

/// Install the path filters pipelines commonly use.
pub fn register_filters(env: &mut Environment<'_>) {
    env.add_filter("basename", basename);
    env.add_filter("dirname", dirname);
}

fn basename(value: String) -> String {
    Path::new(&value)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn dirname(value: String) -> String {
    Path::new(&value)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Parse a rendered pipeline document.
pub fn parse_pipeline(name: &str, text: &str) -> Result<RawPipeline> {
    toml::from_str(text).map_err(|source| StitchesError::Document {
        pipeline: name.to_string(),
        source,
    })
}

/// Split a pipeline path into the template root directory and the root
/// template name.
pub fn split_pipeline_path(path: &Path) -> Result<(PathBuf, String)> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| StitchesError::TemplateNotFound(path.display().to_string()))?;

    let root = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };

    Ok((root, name))
}

/// Where history lives when no explicit path is given.
///
/// With a database and location known the file sits inside the mapset
/// directory (`PERMANENT` when unset); otherwise it sits next to the root
/// pipeline as a hidden file.
pub fn default_state_path(scope: &Scope, pipeline_root: &Path) -> PathBuf {
    match (&scope.database, &scope.location) {
        (Some(database), Some(location)) => PathBuf::from(database)
            .join(location)
            .join(scope.mapset.as_deref().unwrap_or("PERMANENT"))
            .join(STATE_FILE_NAME),
        _ => pipeline_root.join(format!(".{STATE_FILE_NAME}")),
    }
}

/// Parse `--vars "name=value other=value"` into template variables.
pub fn parse_vars(spec: &str) -> std::result::Result<Params, String> {
    let mut vars = Params::new();
    for pair in spec.split_whitespace() {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("invalid variable \"{pair}\" (expected name=value)"))?;
        vars.insert(
            name.to_string(),
            serde_json::Value::String(value.to_string()),
        );
    }
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scope_and_tasks() {
        let raw = parse_pipeline(
            "main.toml",
            r#"
gisdbase = "db"
mapset = "soils"

[[tasks]]
task = "script"
params = { cmd = ["echo", "hi"] }

[[tasks]]
pipeline = "sub.toml"
"#,
        )
        .unwrap();

        assert_eq!(raw.database.as_deref(), Some("db"));
        assert_eq!(raw.location, None);
        assert_eq!(raw.mapset.as_deref(), Some("soils"));
        assert_eq!(raw.tasks.len(), 2);
        assert_eq!(raw.tasks[1].pipeline.as_deref(), Some("sub.toml"));
    }

    #[test]
    fn malformed_document_names_the_pipeline() {
        match parse_pipeline("broken.toml", "[[tasks]\ntask =") {
            Err(StitchesError::Document { pipeline, .. }) => assert_eq!(pipeline, "broken.toml"),
            other => panic!("expected Document error, got {other:?}"),
        }
    }

    #[test]
    fn state_path_follows_scope() {
        let scope = Scope {
            database: Some("/data".into()),
            location: Some("nz".into()),
            mapset: None,
        };
        assert_eq!(
            default_state_path(&scope, Path::new("/p")),
            PathBuf::from("/data/nz/PERMANENT/stitches.state.json")
        );
        assert_eq!(
            default_state_path(&Scope::default(), Path::new("/p")),
            PathBuf::from("/p/.stitches.state.json")
        );
    }

    #[test]
    fn vars_are_name_value_pairs() {
        let vars = parse_vars("year=2020 region=nz").unwrap();
        assert_eq!(vars["year"], serde_json::json!("2020"));
        assert_eq!(vars["region"], serde_json::json!("nz"));
        assert!(parse_vars("oops").is_err());
    }

    #[test]
    fn path_filters() {
        let mut env = Environment::new();
        register_filters(&mut env);
        let out = env
            .render_str("{{ p | basename }} {{ p | dirname }}", minijinja::context! { p => "a/b/c.tif" })
            .unwrap();
        assert_eq!(out, "c.tif a/b");
    }
}
