//! Hooks used when the compiled output is packaged.

use regex::Regex;
use serde_json::Value;

use crate::error::{BuildError, Result};

/// Decides which project files stay out of the packaged application.
///
/// Paths are relative to the project root and start with a separator,
/// e.g. `/.webpack/main/index.js`.
#[derive(Debug, Clone)]
pub struct PackagerIgnore {
    keep: Regex,
    main_stats: Option<Regex>,
    renderer_stats: Option<Regex>,
    drop_source_maps: bool,
    source_map: Regex,
}

impl PackagerIgnore {
    pub fn new(
        output: &str,
        json_stats: bool,
        renderer_json_stats: bool,
        package_source_maps: bool,
    ) -> Result<Self> {
        let output = regex::escape(output);
        let stats = |process: &str| {
            compile(&format!(
                r"[/\\]{output}[/\\]{process}[/\\]stats(-[^/\\]+)?\.json$"
            ))
        };

        Ok(Self {
            keep: compile(&format!(r"^[/\\]{output}($|[/\\]).*$"))?,
            main_stats: json_stats.then(|| stats("main")).transpose()?,
            renderer_stats: renderer_json_stats.then(|| stats("renderer")).transpose()?,
            drop_source_maps: !package_source_maps,
            source_map: compile(r"[^/\\]+\.js\.map$")?,
        })
    }

    pub fn is_ignored(&self, file: &str) -> bool {
        if file.is_empty() {
            return false;
        }

        let matches = |pattern: &Option<Regex>| pattern.as_ref().is_some_and(|re| re.is_match(file));
        if matches(&self.main_stats) || matches(&self.renderer_stats) {
            return true;
        }

        if self.drop_source_maps && self.source_map.is_match(file) {
            return true;
        }

        !self.keep.is_match(file)
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| BuildError::Bundler(format!("invalid ignore pattern: {e}")))
}

/// Check the project manifest before it is copied into the package.
///
/// `main` must point into `<output>/main`. The packaging tool's own
/// settings under `config.forge` are stripped from the returned manifest.
pub fn check_package_main(mut package_json: Value, output: &str) -> Result<Value> {
    let expected = format!("{output}/main");
    let main = package_json.get("main").and_then(Value::as_str);

    if !main.is_some_and(|main| main.ends_with(&expected)) {
        return Err(BuildError::PackageMain {
            output: output.to_string(),
            main: main.map_or_else(|| "undefined".to_string(), |m| format!("{m:?}")),
        });
    }

    if let Some(config) = package_json.get_mut("config").and_then(Value::as_object_mut) {
        config.remove("forge");
    }

    Ok(package_json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_the_output_dir_is_kept() {
        let ignore = PackagerIgnore::new(".webpack", false, false, false).unwrap();
        assert!(!ignore.is_ignored("/.webpack"));
        assert!(!ignore.is_ignored("/.webpack/main/index.js"));
        assert!(ignore.is_ignored("/src/main.ts"));
        assert!(ignore.is_ignored("/node_modules/electron/index.js"));
        assert!(ignore.is_ignored("/.webpackish/main/index.js"));
        assert!(!ignore.is_ignored(""));
    }

    #[test]
    fn output_name_is_matched_literally() {
        let ignore = PackagerIgnore::new(".webpack", false, false, true).unwrap();
        assert!(ignore.is_ignored("/xwebpack/main/index.js"));
    }

    #[test]
    fn source_maps_follow_the_flag() {
        let dropping = PackagerIgnore::new(".webpack", false, false, false).unwrap();
        let keeping = PackagerIgnore::new(".webpack", false, false, true).unwrap();
        assert!(dropping.is_ignored("/.webpack/main/index.js.map"));
        assert!(!keeping.is_ignored("/.webpack/main/index.js.map"));
    }

    #[test]
    fn stats_files_follow_their_flags() {
        let ignore = PackagerIgnore::new(".webpack", true, false, true).unwrap();
        assert!(ignore.is_ignored("/.webpack/main/stats-main.json"));
        assert!(!ignore.is_ignored("/.webpack/renderer/stats-main_window.json"));

        let ignore = PackagerIgnore::new(".webpack", false, true, true).unwrap();
        assert!(ignore.is_ignored("/.webpack/renderer/stats.json"));
        assert!(!ignore.is_ignored("/.webpack/main/stats-main.json"));
    }

    #[test]
    fn package_main_must_point_at_the_output() {
        let err = check_package_main(json!({ "main": "src/index.js" }), ".webpack").unwrap_err();
        assert!(err.to_string().contains("\".webpack/main\""));
        assert!(err.to_string().contains("\"src/index.js\""));

        let err = check_package_main(json!({ "name": "app" }), ".webpack").unwrap_err();
        assert!(err.to_string().ends_with("Instead, it is undefined"));
    }

    #[test]
    fn forge_config_is_stripped() {
        let manifest = check_package_main(
            json!({
                "main": ".webpack/main",
                "config": { "forge": { "plugins": [] }, "other": 1 }
            }),
            ".webpack",
        )
        .unwrap();
        assert_eq!(manifest["config"], json!({ "other": 1 }));
    }
}
