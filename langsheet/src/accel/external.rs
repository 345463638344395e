//! External acceleration module.
//!
//! A compiled converter executable driven over stdin/stdout:
//!
//! - `<module> --entry-points` prints a JSON array of exposed functions.
//! - `<module> convert --options <json>` reads the source bytes on stdin and
//!   prints a [`ConversionResult`] as JSON.

use std::{
    env,
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    thread,
};

use super::{AccelerationOptions, Accelerator, ConversionResult, ENTRY_POINT, LoadStrategy};

/// File name of the packaged module, without the platform suffix.
pub const MODULE_NAME: &str = "langsheet-accel";

fn module_file_name() -> String {
    format!("{}{}", MODULE_NAME, env::consts::EXE_SUFFIX)
}

/// Locations checked when no module path is configured: next to the running
/// binary, then under `dist/accel` in the working directory.
pub fn default_candidates() -> Vec<PathBuf> {
    let file = module_file_name();
    let mut candidates = Vec::new();
    if let Some(dir) = env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf)) {
        candidates.push(dir.join(&file));
        candidates.push(dir.join("accel").join(&file));
    }
    if let Ok(cwd) = env::current_dir() {
        candidates.push(cwd.join("dist").join("accel").join(&file));
    }
    candidates
}

/// Strategy that locates the module executable and asks it what it exposes.
#[derive(Debug, Clone)]
pub struct ExternalModule {
    candidates: Vec<PathBuf>,
}

impl Default for ExternalModule {
    fn default() -> Self {
        Self::new()
    }
}

impl ExternalModule {
    pub fn new() -> Self {
        Self::with_candidates(default_candidates())
    }

    pub fn with_candidates(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    fn resolve(&self, module_path: Option<&Path>) -> Result<PathBuf, String> {
        if let Some(path) = module_path {
            let path = if path.is_dir() {
                path.join(module_file_name())
            } else {
                path.to_path_buf()
            };
            return if path.is_file() {
                Ok(path)
            } else {
                Err(format!("no module at {}", path.display()))
            };
        }

        self.candidates
            .iter()
            .find(|candidate| candidate.is_file())
            .cloned()
            .ok_or_else(|| {
                let searched: Vec<String> = self
                    .candidates
                    .iter()
                    .map(|c| c.display().to_string())
                    .collect();
                format!("{} not found (searched: {})", MODULE_NAME, searched.join(", "))
            })
    }
}

impl LoadStrategy for ExternalModule {
    fn name(&self) -> &'static str {
        "external"
    }

    fn load(&self, module_path: Option<&Path>) -> Result<Box<dyn Accelerator>, String> {
        let path = self.resolve(module_path)?;
        let entry_points = probe_entry_points(&path)?;
        Ok(Box::new(ExternalAccelerator {
            name: path.display().to_string(),
            path,
            entry_points,
        }))
    }
}

fn probe_entry_points(path: &Path) -> Result<Vec<String>, String> {
    let output = Command::new(path)
        .arg("--entry-points")
        .stdin(Stdio::null())
        .output()
        .map_err(|e| format!("failed to run {}: {}", path.display(), e))?;
    if !output.status.success() {
        return Err(format!(
            "{} --entry-points exited with {}",
            path.display(),
            output.status
        ));
    }
    serde_json::from_slice(&output.stdout)
        .map_err(|e| format!("unreadable entry point list from {}: {}", path.display(), e))
}

#[derive(Debug)]
pub struct ExternalAccelerator {
    name: String,
    path: PathBuf,
    entry_points: Vec<String>,
}

impl ExternalAccelerator {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run(&self, bytes: &[u8], options: &AccelerationOptions) -> Result<ConversionResult, String> {
        let options = serde_json::to_string(options).map_err(|e| e.to_string())?;
        let mut child = Command::new(&self.path)
            .arg(ENTRY_POINT)
            .arg("--options")
            .arg(options)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to start {}: {}", self.name, e))?;

        // Feed stdin from a second thread so a chatty module cannot deadlock
        // on a full stdout pipe.
        let stdin = child.stdin.take();
        let output = thread::scope(|scope| {
            scope.spawn(move || {
                if let Some(mut stdin) = stdin {
                    // A module that exits early closes the pipe; its exit
                    // status tells the story.
                    let _ = stdin.write_all(bytes);
                }
            });
            child.wait_with_output()
        })
        .map_err(|e| format!("failed to wait for {}: {}", self.name, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            return Err(if stderr.is_empty() {
                format!("{} exited with {}", self.name, output.status)
            } else {
                format!("{} exited with {}: {}", self.name, output.status, stderr)
            });
        }
        serde_json::from_slice(&output.stdout)
            .map_err(|e| format!("unreadable result from {}: {}", self.name, e))
    }
}

impl Accelerator for ExternalAccelerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn entry_points(&self) -> Vec<String> {
        self.entry_points.clone()
    }

    fn convert(&self, bytes: &[u8], options: &AccelerationOptions) -> ConversionResult {
        self.run(bytes, options)
            .unwrap_or_else(ConversionResult::failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{formats::SourceFormat, layout::SheetLayout, tree::KeyMode};

    fn options() -> AccelerationOptions {
        AccelerationOptions::new(
            &SheetLayout::new(),
            &["en".to_string()],
            KeyMode::Nested,
            SourceFormat::Csv,
        )
    }

    #[test]
    fn test_missing_module_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let strategy = ExternalModule::with_candidates(Vec::new());
        let err = strategy
            .load(Some(&dir.path().join("nope")))
            .unwrap_err();
        assert!(err.contains("no module at"));
    }

    #[test]
    fn test_no_candidates_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let strategy = ExternalModule::with_candidates(vec![dir.path().join(module_file_name())]);
        let err = strategy.load(None).unwrap_err();
        assert!(err.contains("not found"));
        assert!(err.contains(MODULE_NAME));
    }

    #[test]
    fn test_default_candidates_use_module_name() {
        for candidate in default_candidates() {
            assert_eq!(
                candidate.file_name().and_then(|n| n.to_str()),
                Some(module_file_name().as_str())
            );
        }
    }

    #[cfg(unix)]
    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    // One test drives every script so no other test forks while a script is
    // still open for writing.
    #[cfg(unix)]
    #[test]
    fn test_external_module_protocol() {
        let dir = tempfile::TempDir::new().unwrap();
        let working = script(
            dir.path(),
            "working",
            r#"if [ "$1" = "--entry-points" ]; then echo '["convert"]'; exit 0; fi
[ "$1" = "convert" ] || exit 3
cat > /dev/null
echo '{"success":true,"translations":{"en":{"hello":"Hello"}}}'
"#,
        );
        let failing = script(
            dir.path(),
            "failing",
            r#"if [ "$1" = "--entry-points" ]; then echo '["convert"]'; exit 0; fi
echo "sheet is corrupt" >&2
exit 1
"#,
        );
        let wrong_exports = script(
            dir.path(),
            "wrong_exports",
            r#"echo '["process_excel"]'
"#,
        );

        let strategy = ExternalModule::with_candidates(Vec::new());

        let accelerator = strategy.load(Some(&working)).unwrap();
        assert_eq!(accelerator.entry_points(), vec!["convert".to_string()]);
        let translations = accelerator
            .convert(b"key,en\nhello,Hello\n", &options())
            .into_result()
            .unwrap();
        assert_eq!(translations["en"], serde_json::json!({"hello": "Hello"}));

        let accelerator = strategy.load(Some(&failing)).unwrap();
        let result = accelerator.convert(b"", &options());
        assert!(!result.success);
        assert!(result.error.unwrap().contains("sheet is corrupt"));

        let accelerator = strategy.load(Some(&wrong_exports)).unwrap();
        assert_eq!(accelerator.entry_points(), vec!["process_excel".to_string()]);
    }
}
