//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a fixture workspace holding everything the CLI reads:
//! a project configuration, module definitions, a resource folder and a
//! version catalog.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_minimal_config()
//!         .with_module("core", modules::CORE);
//!     fixture.command().arg("validate").arg("-m").arg(fixture.module_path("core"));
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{configs, modules};
    pub use super::TestFixture;
}

/// Project configuration snippets.
#[allow(dead_code)]
pub mod configs {
    /// Only the required key.
    pub const MINIMAL: &str = "project-name: shop\n";

    /// Four-space indentation and pnpm.
    pub const PNPM: &str = r#"
project-name: shop
indentation: 4
package-manager: pnpm
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "project-name: [unclosed\n";
}

/// Module definition snippets, written to `modules/<name>.yaml`.
#[allow(dead_code)]
pub mod modules {
    /// Core module: README template, main entry point, lodash and a build script.
    pub const CORE: &str = r#"
slug: core
source: core
gitignore:
  - comment: Build output
    patterns: [dist/]
dependencies:
  - name: lodash
    ecosystem: common
scripts:
  build: tsc
files:
  - source: README.md
    template: true
  - source: main.ts
    to: src/main.ts
"#;

    /// Feature module patching the core entry point.
    pub const ROUTER: &str = r#"
slug: router
dependencies:
  - name: rxjs
    ecosystem: common
replacements:
  - path: src/main.ts
    after: "bootstrap();"
    payload: "registerRouter();"
"#;

    /// Feature module patching text inserted by the router module.
    pub const STORE: &str = r#"
slug: store
replacements:
  - path: src/main.ts
    after: "registerRouter();"
    payload: "registerStore();"
"#;

    /// Module whose file source does not exist.
    pub const BROKEN: &str = r#"
slug: broken
files:
  - source: missing.txt
"#;

    /// Module declaring a conflicting build script.
    pub const CONFLICTING_BUILD: &str = r#"
slug: webpack
scripts:
  build: webpack
"#;
}

/// A fixture workspace in a temporary directory.
///
/// Layout:
/// - `seedwright.yaml`
/// - `modules/<name>.yaml`
/// - `resources/...`
/// - `catalog/<tag>.json`
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a workspace with empty resource and catalog folders.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("resources")
            .create_dir_all()
            .expect("Failed to create resources dir");
        temp_dir
            .child("catalog")
            .create_dir_all()
            .expect("Failed to create catalog dir");
        Self { temp_dir }
    }

    /// Add a `seedwright.yaml` configuration file with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.with_file("seedwright.yaml", content)
    }

    /// Add the minimal valid configuration.
    pub fn with_minimal_config(self) -> Self {
        self.with_config(configs::MINIMAL)
    }

    /// Add a module definition as `modules/<name>.yaml`.
    pub fn with_module(self, name: &str, content: &str) -> Self {
        let path = format!("modules/{}.yaml", name);
        self.with_file(&path, content)
    }

    /// Add a resource file under `resources/`.
    pub fn with_resource(self, path: &str, content: &str) -> Self {
        let path = format!("resources/{}", path);
        self.with_file(&path, content)
    }

    /// Add a catalog file `catalog/<tag>.json`.
    pub fn with_catalog(self, tag: &str, package_json: &str) -> Self {
        let path = format!("catalog/{}.json", tag);
        self.with_file(&path, package_json)
    }

    /// Resources and catalog used by [`modules::CORE`] and friends.
    #[allow(dead_code)]
    pub fn with_core_resources(self) -> Self {
        self.with_resource("core/README.md.jinja", "# {{ projectName }}\n")
            .with_resource("core/main.ts", "bootstrap();\n")
            .with_catalog(
                "common",
                r#"{"dependencies": {"lodash": "4.17.21", "rxjs": "7.8.2"}}"#,
            )
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the config file.
    #[allow(dead_code)]
    pub fn config_path(&self) -> PathBuf {
        self.path().join("seedwright.yaml")
    }

    /// Get the path of a module definition added with [`Self::with_module`].
    pub fn module_path(&self, name: &str) -> PathBuf {
        self.path().join("modules").join(format!("{}.yaml", name))
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command running in this workspace.
    ///
    /// Resource and catalog folders are passed through the environment so
    /// tests only need to add `-m` arguments. Colors are disabled.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("seedwright");
        cmd.current_dir(self.path())
            .env_remove("SEEDWRIGHT_CONFIG")
            .env_remove("RUST_LOG")
            .env("SEEDWRIGHT_RESOURCES", self.path().join("resources"))
            .env("SEEDWRIGHT_CATALOG", self.path().join("catalog"))
            .env("NO_COLOR", "1");
        cmd
    }

    /// Create a command for `subcommand` with `-m` for each named module.
    #[allow(dead_code)]
    pub fn command_with_modules(&self, subcommand: &str, names: &[&str]) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg(subcommand);
        for name in names {
            cmd.arg("-m").arg(self.module_path(name));
        }
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_layout() {
        let fixture = TestFixture::new().with_minimal_config();
        assert!(fixture.config_path().exists());
        assert!(fixture.path().join("resources").is_dir());
        assert!(fixture.path().join("catalog").is_dir());
    }

    #[test]
    fn test_fixture_with_module() {
        let fixture = TestFixture::new().with_module("core", modules::CORE);
        assert!(fixture.module_path("core").exists());
    }

    #[test]
    fn test_module_snippets_are_valid_yaml() {
        for snippet in [
            modules::CORE,
            modules::ROUTER,
            modules::STORE,
            modules::BROKEN,
            modules::CONFLICTING_BUILD,
        ] {
            let result: Result<serde_yaml::Value, _> = serde_yaml::from_str(snippet);
            assert!(result.is_ok(), "invalid YAML: {}", snippet);
        }
    }
}
