//! Shared helpers for `pkl-builtins-gen` integration tests.
//!
//! A [`FakeProject`] is a temporary project root with the fixed
//! `pkl/builtins` and `scripts` layout and a stand-in `pkl` executable. The
//! stand-in logs every invocation to `calls.log`, exits 11 from `format` (as
//! the real formatter does), and answers `eval` from files under
//! `responses/`.

use std::os::unix::fs::PermissionsExt;

use camino::{Utf8Path, Utf8PathBuf};
use pkl_builtins_gen::GenConfig;
use tempfile::TempDir;

const FAKE_PKL: &str = r#"#!/bin/sh
printf '%s\n' "$*" >> calls.log
case "$1" in
  format)
    exit 11
    ;;
  eval)
    stem=$(basename "$2" .pkl)
    if [ -f "responses/$stem.exit" ]; then
      echo "pkl: cannot evaluate $2" >&2
      exit "$(cat "responses/$stem.exit")"
    fi
    if [ -f "responses/$stem.sleep" ]; then
      exec sleep "$(cat "responses/$stem.sleep")"
    fi
    cat "responses/$stem.json"
    ;;
esac
"#;

/// Temporary project root wired to a fake `pkl` executable.
pub struct FakeProject {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl FakeProject {
    /// Creates the layout, an empty fragment directory, and the fake tool.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .expect("tempdir path is UTF-8");
        for sub in ["pkl/builtins", "scripts", "responses", "bin"] {
            std::fs::create_dir_all(root.join(sub)).expect("create project dir");
        }
        std::fs::write(root.join("scripts/reflect.pkl"), "// reflection script\n")
            .expect("write reflect script");

        let pkl = root.join("bin/pkl");
        std::fs::write(&pkl, FAKE_PKL).expect("write fake pkl");
        std::fs::set_permissions(&pkl, std::fs::Permissions::from_mode(0o755))
            .expect("make fake pkl executable");

        Self { _dir: dir, root }
    }

    /// Project root.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Path of the fake `pkl` executable.
    pub fn pkl(&self) -> Utf8PathBuf {
        self.root.join("bin/pkl")
    }

    /// Configuration pointing the generator at this project.
    pub fn config(&self) -> GenConfig {
        GenConfig {
            root: self.root.clone(),
            pkl: self.pkl().into_string(),
            ..GenConfig::default()
        }
    }

    /// Adds a fragment whose reflection yields `reflection`.
    pub fn add_fragment(&self, file_name: &str, reflection: &str) {
        std::fs::write(self.root.join("pkl/builtins").join(file_name), "// fragment\n")
            .expect("write fragment");
        std::fs::write(self.response(file_name, "json"), reflection).expect("write response");
    }

    /// Adds a fragment declaring one property with the given annotations.
    pub fn add_builtin(&self, file_name: &str, property: &str, annotations: &serde_json::Value) {
        let mut properties = serde_json::Map::new();
        properties.insert(
            property.to_owned(),
            serde_json::json!({ "annotations": annotations }),
        );
        let reflection = serde_json::json!({
            "moduleClass": { "name": "ModuleClass", "properties": properties }
        });
        self.add_fragment(file_name, &reflection.to_string());
    }

    /// Makes reflection of `file_name` exit with `code`.
    pub fn fail_reflection(&self, file_name: &str, code: i32) {
        std::fs::write(self.response(file_name, "exit"), code.to_string())
            .expect("write exit code");
    }

    /// Makes reflection of `file_name` sleep for `seconds`.
    pub fn stall_reflection(&self, file_name: &str, seconds: u64) {
        std::fs::write(self.response(file_name, "sleep"), seconds.to_string())
            .expect("write sleep duration");
    }

    /// Lines logged by the fake tool, one per invocation.
    pub fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.root.join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    /// Reads a file relative to the root.
    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.root.join(relative)).expect("read generated file")
    }

    fn response(&self, file_name: &str, kind: &str) -> Utf8PathBuf {
        let stem = file_name.strip_suffix(".pkl").unwrap_or(file_name);
        self.root.join("responses").join(format!("{stem}.{kind}"))
    }
}
