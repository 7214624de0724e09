//! Resolution of inline, factory and path config sources.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kiln_config::{
    BundleMode, ConfigError, ConfigFactory, ConfigResolver, ConfigSource, Devtool, FactoryArgs,
    LoadedModule, Mode, ModuleLoader, Result, Target,
};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Records requested paths and answers with a canned module.
struct RecordingLoader {
    requested: Mutex<Vec<PathBuf>>,
    respond: fn() -> Result<LoadedModule>,
}

impl RecordingLoader {
    fn new(respond: fn() -> Result<LoadedModule>) -> Arc<Self> {
        Arc::new(Self {
            requested: Mutex::new(Vec::new()),
            respond,
        })
    }
}

#[async_trait]
impl ModuleLoader for RecordingLoader {
    async fn load(&self, path: &Path) -> Result<LoadedModule> {
        self.requested.lock().unwrap().push(path.to_path_buf());
        (self.respond)()
    }
}

struct AsyncFactory;

#[async_trait]
impl ConfigFactory for AsyncFactory {
    async fn create(&self, _env: &Value, args: &FactoryArgs) -> Result<Value> {
        tokio::task::yield_now().await;
        Ok(json!({ "mode": args.mode.as_str(), "target": "web" }))
    }
}

#[tokio::test]
async fn inline_values_resolve_directly() {
    let resolver = ConfigResolver::new("/project", Mode::Development);
    let config = resolver
        .resolve(&ConfigSource::Inline(json!({ "devtool": "eval-source-map" })))
        .await
        .unwrap();
    assert_eq!(config.devtool, Some(Devtool::EvalSourceMap));
}

#[tokio::test]
async fn paths_load_relative_to_the_project_root() {
    let loader = RecordingLoader::new(|| Ok(LoadedModule::Value(json!({ "target": "web" }))));
    let resolver = ConfigResolver::with_loader("/project", Mode::Production, loader.clone());

    let config = resolver
        .resolve(&ConfigSource::Path("./config/../webpack.renderer.json".into()))
        .await
        .unwrap();

    assert_eq!(config.target, Some(Target::Web));
    assert_eq!(
        *loader.requested.lock().unwrap(),
        vec![PathBuf::from("/project/webpack.renderer.json")]
    );
}

#[tokio::test]
async fn a_loaded_module_may_be_a_factory() {
    let loader =
        RecordingLoader::new(|| Ok(LoadedModule::Factory(Arc::new(AsyncFactory) as Arc<dyn ConfigFactory>)));
    let resolver = ConfigResolver::with_loader("/project", Mode::Production, loader);

    let config = resolver
        .resolve(&ConfigSource::Path("webpack.main.json".into()))
        .await
        .unwrap();
    assert_eq!(config.mode, Some(BundleMode::Production));
}

#[tokio::test]
async fn load_failures_propagate() {
    let loader = RecordingLoader::new(|| {
        Err(ConfigError::LoadFailed {
            path: PathBuf::from("/project/missing.json"),
            message: "No such file".into(),
        })
    });
    let resolver = ConfigResolver::with_loader("/project", Mode::Development, loader);

    let err = resolver
        .resolve(&ConfigSource::Path("missing.json".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::LoadFailed { .. }));
}

#[tokio::test]
async fn async_factories_are_awaited_with_the_mode() {
    let resolver = ConfigResolver::new("/project", Mode::Development);
    let config = resolver
        .resolve(&ConfigSource::factory(AsyncFactory))
        .await
        .unwrap();
    assert_eq!(config.mode, Some(BundleMode::Development));
}

#[tokio::test]
async fn fs_loader_reads_json_and_toml() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("webpack.main.json"),
        r#"{ "entry": "./src/main.ts" }"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("webpack.renderer.toml"),
        "devtool = \"source-map\"\n[resolve]\nextensions = [\".ts\"]\n",
    )
    .unwrap();

    let resolver = ConfigResolver::new(dir.path(), Mode::Production);

    let main = resolver
        .resolve(&ConfigSource::Path("webpack.main.json".into()))
        .await
        .unwrap();
    assert!(main.entry.is_some());

    let renderer = resolver
        .resolve(&ConfigSource::Path("webpack.renderer.toml".into()))
        .await
        .unwrap();
    assert_eq!(renderer.devtool, Some(Devtool::SourceMap));
    assert_eq!(renderer.extra["resolve"]["extensions"], json!([".ts"]));
}

#[tokio::test]
async fn fs_loader_reports_missing_files() {
    let dir = TempDir::new().unwrap();
    let resolver = ConfigResolver::new(dir.path(), Mode::Production);

    let err = resolver
        .resolve(&ConfigSource::Path("nope.json".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::LoadFailed { .. }));
}

#[tokio::test]
async fn fs_loader_shares_the_file_parser() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    std::fs::write(dir.path().join("webpack.yaml"), "entry: ./a.ts").unwrap();
    let resolver = ConfigResolver::new(dir.path(), Mode::Production);

    let err = resolver
        .resolve(&ConfigSource::Path("broken.json".into()))
        .await
        .unwrap_err();
    assert!(
        matches!(&err, ConfigError::LoadFailed { message, .. } if message.contains("Invalid JSON")),
        "unexpected error: {err}"
    );

    let err = resolver
        .resolve(&ConfigSource::Path("webpack.yaml".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "yaml"));
}

#[tokio::test]
async fn non_string_bundler_values_resolve() {
    let resolver = ConfigResolver::new("/project", Mode::Production);
    let config = resolver
        .resolve(&ConfigSource::Inline(json!({
            "devtool": false,
            "mode": "none",
            "target": ["web", "es2020"]
        })))
        .await
        .unwrap();

    assert_eq!(config.devtool, Some(Devtool::DISABLED));
    assert_eq!(config.mode, Some(BundleMode::None));
    assert_eq!(
        config.target,
        Some(Target::Many(vec!["web".into(), "es2020".into()]))
    );
}
