use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "qa-gate.yaml";

/// Environment variable naming an explicit config file (skips discovery)
pub const CONFIG_ENV: &str = "QA_GATE_CONFIG";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn signatures(groups: &[&[&str]]) -> Vec<Signature> {
    groups.iter().map(|group| strings(group)).collect()
}

/// Substrings that must all occur in one record for a command to count as run
pub type Signature = Vec<String>;

/// Path rules used by the classifiers (Nx monorepo layout by default)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PathRules {
    pub source_suffixes: Vec<String>,
    pub library_roots: Vec<String>,
    pub app_roots: Vec<String>,
    /// UI library directories
    pub ui_roots: Vec<String>,
    /// Admin component directory
    pub admin_ui_roots: Vec<String>,
    /// Any path containing one of these is a test file, whatever its suffix
    pub test_markers: Vec<String>,
    /// Substrings that disqualify a path from being source code
    pub excluded: Vec<String>,
}

impl Default for PathRules {
    fn default() -> Self {
        Self {
            source_suffixes: strings(&[".ts"]),
            library_roots: strings(&["/libs/"]),
            app_roots: strings(&["/apps/"]),
            ui_roots: strings(&["/libs/ui/"]),
            admin_ui_roots: strings(&["/libs/admin/src/lib/components/"]),
            test_markers: strings(&[".spec.ts", ".test.ts", "/__tests__/"]),
            excluded: strings(&[
                ".spec.ts",
                ".test.ts",
                "/__tests__/",
                "vitest.config.ts",
                "jest.config.ts",
            ]),
        }
    }
}

/// Text markers the scanner looks for in serialized records
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Markers {
    /// Keys that mark a record as carrying a tool invocation
    pub tool_keys: Vec<String>,
    /// Tool names that write files; one must co-occur with a tool key
    pub write_tools: Vec<String>,
    /// Must co-occur with a reviewer keyword for the review to count
    pub role_marker: String,
    pub code_reviewer: String,
    pub test_reviewer: String,
    pub accessibility_reviewer: String,
    pub lint: Vec<Signature>,
    pub build: Vec<Signature>,
    pub unit_tests: Vec<Signature>,
    /// Matched case-insensitively anywhere in a record
    pub e2e: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            tool_keys: strings(&[r#""tool_name""#, r#""name""#]),
            write_tools: strings(&["Write", "Edit"]),
            role_marker: "subagent_type".to_string(),
            code_reviewer: "code-quality".to_string(),
            test_reviewer: "test-reviewer".to_string(),
            accessibility_reviewer: "a11y-auditor".to_string(),
            lint: signatures(&[&["nx", "lint"]]),
            build: signatures(&[&["nx", "build"]]),
            unit_tests: signatures(&[&["nx", "test"], &["vitest"], &["npm run test"]]),
            e2e: "e2e".to_string(),
        }
    }
}

/// Per-rule switches; a disabled rule never reports a missing action
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Require {
    pub code_review: bool,
    pub lint_or_build: bool,
    pub unit_tests: bool,
    pub e2e: bool,
    pub test_review: bool,
    pub accessibility_review: bool,
}

impl Default for Require {
    fn default() -> Self {
        Self {
            code_review: true,
            lint_or_build: true,
            unit_tests: true,
            e2e: true,
            test_review: true,
            accessibility_review: true,
        }
    }
}

/// Resolved gate configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub paths: PathRules,
    pub markers: Markers,
    pub require: Require,
}

fn validate_config(config: &GateConfig, config_path: &Path) -> Result<()> {
    if config.paths.source_suffixes.iter().all(|s| s.is_empty()) {
        bail!(
            "Invalid config at {}: 'paths.source_suffixes' must not be empty",
            config_path.display()
        );
    }
    if config.markers.role_marker.is_empty() {
        bail!(
            "Invalid config at {}: 'markers.role_marker' must not be empty",
            config_path.display()
        );
    }
    let reviewers = [
        ("code_reviewer", &config.markers.code_reviewer),
        ("test_reviewer", &config.markers.test_reviewer),
        ("accessibility_reviewer", &config.markers.accessibility_reviewer),
    ];
    for (field, keyword) in reviewers {
        if keyword.is_empty() {
            bail!(
                "Invalid config at {}: 'markers.{}' must not be empty",
                config_path.display(),
                field
            );
        }
    }
    Ok(())
}

/// Loads and validates a qa-gate.yaml config file.
/// Fields left out keep their built-in defaults.
pub fn load_config(config_path: &Path) -> Result<GateConfig> {
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

    // An empty file deserializes to null; treat it as "all defaults"
    if content.trim().is_empty() {
        return Ok(GateConfig::default());
    }

    let config: GateConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;

    validate_config(&config, config_path)?;
    Ok(config)
}

/// Finds the nearest qa-gate.yaml by walking up from `start_dir`.
/// Stops at the repository root (a directory containing `.git`) or the filesystem root.
pub fn find_nearest_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.is_file() {
            return Some(config_path);
        }

        if current.join(".git").exists() {
            return None;
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Resolve the config for a hook run.
///
/// `$QA_GATE_CONFIG` wins, then the nearest qa-gate.yaml above `cwd`. A config
/// that cannot be loaded is logged and replaced by the defaults.
pub fn resolve(cwd: Option<&str>, env_path: Option<PathBuf>) -> GateConfig {
    let config_path = env_path.or_else(|| cwd.and_then(|dir| find_nearest_config(Path::new(dir))));

    let Some(config_path) = config_path else {
        tracing::debug!("no {CONFIG_FILENAME} found, using defaults");
        return GateConfig::default();
    };

    match load_config(&config_path) {
        Ok(config) => {
            tracing::debug!("loaded config from {}", config_path.display());
            config
        }
        Err(e) => {
            tracing::warn!("ignoring config, using defaults: {e:#}");
            GateConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_partial_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(CONFIG_FILENAME);
        fs::write(
            &config_path,
            r#"
markers:
  unit_tests:
    - [cargo, test]
    - [nextest]
require:
  e2e: false
"#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(
            config.markers.unit_tests,
            vec![
                vec!["cargo".to_string(), "test".to_string()],
                vec!["nextest".to_string()],
            ]
        );
        assert_eq!(config.markers.code_reviewer, "code-quality");
        assert_eq!(config.markers.lint, Markers::default().lint);
        assert!(!config.require.e2e);
        assert!(config.require.code_review);
        assert_eq!(config.paths, PathRules::default());
    }

    #[test]
    fn test_load_config_empty_file_is_default() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "").unwrap();

        assert_eq!(load_config(&config_path).unwrap(), GateConfig::default());
    }

    #[test]
    fn test_unit_test_signature_must_be_a_list() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "markers:\n  unit_tests:\n    - cargo test\n").unwrap();

        assert!(load_config(&config_path).is_err());
    }

    #[test]
    fn test_default_markers_follow_nx_workspace() {
        let markers = Markers::default();
        assert_eq!(markers.code_reviewer, "code-quality");
        assert_eq!(markers.test_reviewer, "test-reviewer");
        assert_eq!(markers.accessibility_reviewer, "a11y-auditor");
        assert_eq!(markers.unit_tests.len(), 3);

        let paths = PathRules::default();
        assert_eq!(paths.source_suffixes, vec![".ts".to_string()]);
        assert!(paths.excluded.contains(&"vitest.config.ts".to_string()));
        assert!(paths.excluded.contains(&"jest.config.ts".to_string()));
    }

    #[test]
    fn test_load_config_empty_suffixes_fails() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "paths:\n  source_suffixes: []\n").unwrap();

        assert!(load_config(&config_path).is_err());
    }

    #[test]
    fn test_load_config_empty_reviewer_fails() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "markers:\n  test_reviewer: \"\"\n").unwrap();

        let err = load_config(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("test_reviewer"));
    }

    #[test]
    fn test_load_config_bad_yaml_fails() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "require: [not, a, map]\n").unwrap();

        assert!(load_config(&config_path).is_err());
    }

    #[test]
    fn test_find_nearest_config_walks_up() {
        let temp = TempDir::new().unwrap();
        let repo_root = temp.path();
        fs::create_dir_all(repo_root.join(".git")).unwrap();
        let subdir = repo_root.join("src/lib");
        fs::create_dir_all(&subdir).unwrap();
        fs::write(repo_root.join(CONFIG_FILENAME), "{}").unwrap();

        let found = find_nearest_config(&subdir);
        assert_eq!(found, Some(repo_root.join(CONFIG_FILENAME)));
    }

    #[test]
    fn test_find_nearest_config_prefers_nested() {
        let temp = TempDir::new().unwrap();
        let repo_root = temp.path();
        fs::create_dir_all(repo_root.join(".git")).unwrap();
        let pkg_dir = repo_root.join("packages/web");
        let src_dir = pkg_dir.join("src");
        fs::create_dir_all(&src_dir).unwrap();
        fs::write(repo_root.join(CONFIG_FILENAME), "{}").unwrap();
        fs::write(pkg_dir.join(CONFIG_FILENAME), "{}").unwrap();

        let found = find_nearest_config(&src_dir);
        assert_eq!(found, Some(pkg_dir.join(CONFIG_FILENAME)));
    }

    #[test]
    fn test_find_nearest_config_stops_at_repo_root() {
        let temp = TempDir::new().unwrap();
        // Config above the repo must not be picked up
        fs::write(temp.path().join(CONFIG_FILENAME), "{}").unwrap();
        let repo_root = temp.path().join("repo");
        fs::create_dir_all(repo_root.join(".git")).unwrap();
        let subdir = repo_root.join("src");
        fs::create_dir_all(&subdir).unwrap();

        assert!(find_nearest_config(&subdir).is_none());
    }

    #[test]
    fn test_resolve_invalid_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "markers:\n  role_marker: \"\"\n").unwrap();

        let config = resolve(None, Some(config_path));
        assert_eq!(config, GateConfig::default());
    }

    #[test]
    fn test_resolve_env_path_wins() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME), "require:\n  e2e: false\n").unwrap();
        let explicit = temp.path().join("other.yaml");
        fs::write(&explicit, "require:\n  unit_tests: false\n").unwrap();

        let config = resolve(temp.path().to_str(), Some(explicit));
        assert!(config.require.e2e);
        assert!(!config.require.unit_tests);
    }

    #[test]
    fn test_resolve_without_cwd_is_default() {
        assert_eq!(resolve(None, None), GateConfig::default());
    }
}
