use crate::core::license::inject_license;
use crate::domain::model::{
    CompileReport, CompileRequest, CompiledArtifact, LicenseInjection, ARTIFACT_EXTENSION,
};
use crate::domain::ports::{CompilerBackend, ConfigProvider, Storage};
use crate::utils::error::{CompileError, Result};
use crate::utils::validation::validate_file_name_component;
use std::path::{Path, PathBuf};

pub struct Orchestrator<S: Storage, B: CompilerBackend, C: ConfigProvider> {
    storage: S,
    backend: B,
    config: C,
}

impl<S: Storage, B: CompilerBackend, C: ConfigProvider> Orchestrator<S, B, C> {
    pub fn new(storage: S, backend: B, config: C) -> Self {
        Self {
            storage,
            backend,
            config,
        }
    }

    /// Runs one compilation and folds every outcome into a report.
    pub async fn compile(&self, request: &CompileRequest) -> CompileReport {
        let mut warnings = Vec::new();
        match self.execute(request, &mut warnings).await {
            Ok(artifact) => {
                tracing::info!("✅ Compilation successful: {}", artifact.filename);
                CompileReport::succeeded(artifact, warnings)
            }
            Err(e) => {
                tracing::error!("❌ {} ({:?})", e, e.kind());
                tracing::debug!("💡 Suggestion: {}", e.recovery_suggestion());
                CompileReport::failed(&e, warnings)
            }
        }
    }

    async fn execute(
        &self,
        request: &CompileRequest,
        warnings: &mut Vec<String>,
    ) -> Result<CompiledArtifact> {
        validate_file_name_component("product_id", &request.product_id)?;
        let source = self.resolve_source(&request.source_path).await?;

        let compiled_dir = PathBuf::from(self.config.compiled_path());
        self.storage.create_dir_all(&compiled_dir).await?;

        let filename = output_file_name(&source, &request.product_id)?;
        let output_path = compiled_dir.join(&filename);

        let compile_source = match request.license_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => {
                let injection = inject_license(&self.storage, &source, key).await;
                if let LicenseInjection::Skipped { reason, .. } = &injection {
                    warnings.push(format!(
                        "License injection skipped, compiling without license: {}",
                        reason
                    ));
                }
                injection.compile_source().clone()
            }
            None => source,
        };

        let output = self
            .backend
            .compile(&compile_source, self.config.timeout())
            .await?;

        if !output.success {
            tracing::debug!("Compiler stdout: {}", output.stdout);
            return Err(CompileError::CompilerFailed {
                exit_code: output.exit_code,
                diagnostics: output.diagnostics(),
            });
        }

        let produced = compile_source.with_extension(ARTIFACT_EXTENSION);
        if !self.storage.exists(&produced).await {
            return Err(CompileError::MissingOutput { expected: produced });
        }

        self.storage.move_file(&produced, &output_path).await?;
        tracing::debug!(
            "Moved {} to {}",
            produced.display(),
            output_path.display()
        );

        Ok(CompiledArtifact {
            path: output_path,
            filename,
        })
    }

    /// Relative paths that do not exist as given are looked up under the
    /// input storage directory.
    async fn resolve_source(&self, requested: &Path) -> Result<PathBuf> {
        if self.storage.exists(requested).await {
            return Ok(requested.to_path_buf());
        }

        if requested.is_relative() {
            let stored = Path::new(self.config.ea_storage_path()).join(requested);
            if self.storage.exists(&stored).await {
                tracing::debug!("Resolved {} to {}", requested.display(), stored.display());
                return Ok(stored);
            }
        }

        Err(CompileError::NotFound {
            path: requested.to_path_buf(),
        })
    }
}

/// `<source-stem>_<product_id>.ex5`
pub fn output_file_name(source: &Path, product_id: &str) -> Result<String> {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CompileError::InvalidRequest {
            field: "source_file".to_string(),
            reason: format!("cannot derive a file stem from {}", source.display()),
        })?;
    Ok(format!("{}_{}.{}", stem, product_id, ARTIFACT_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalStorage;
    use crate::domain::model::CompilerOutput;
    use crate::utils::error::ErrorKind;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Clone, Copy)]
    enum Behavior {
        WriteArtifact,
        SucceedWithoutArtifact,
        Fail,
        TimeOut,
    }

    #[derive(Clone)]
    struct MockCompiler {
        behavior: Behavior,
        calls: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl MockCompiler {
        fn new(behavior: Behavior) -> Self {
            Self {
                behavior,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn calls(&self) -> Vec<PathBuf> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompilerBackend for MockCompiler {
        async fn compile(&self, source: &Path, timeout: Duration) -> Result<CompilerOutput> {
            self.calls.lock().unwrap().push(source.to_path_buf());
            match self.behavior {
                Behavior::WriteArtifact => {
                    std::fs::write(source.with_extension("ex5"), b"EX5")?;
                    Ok(CompilerOutput {
                        exit_code: Some(0),
                        success: true,
                        ..Default::default()
                    })
                }
                Behavior::SucceedWithoutArtifact => Ok(CompilerOutput {
                    exit_code: Some(0),
                    success: true,
                    ..Default::default()
                }),
                Behavior::Fail => Ok(CompilerOutput {
                    exit_code: Some(1),
                    success: false,
                    stdout: String::new(),
                    stderr: "'Foo' - undeclared identifier".to_string(),
                }),
                Behavior::TimeOut => Err(CompileError::Timeout {
                    seconds: timeout.as_secs(),
                }),
            }
        }
    }

    struct MockConfig {
        ea_storage_path: String,
        compiled_path: String,
    }

    impl MockConfig {
        fn new(root: &Path) -> Self {
            Self {
                ea_storage_path: root.join("ea_files").display().to_string(),
                compiled_path: root.join("out").join("compiled").display().to_string(),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn compiler_path(&self) -> &str {
            "metaeditor64"
        }

        fn ea_storage_path(&self) -> &str {
            &self.ea_storage_path
        }

        fn compiled_path(&self) -> &str {
            &self.compiled_path
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(60)
        }
    }

    fn write_source(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "#property strict\n\nint OnInit() { return 0; }\n").unwrap();
        path
    }

    fn orchestrator(
        root: &Path,
        compiler: MockCompiler,
    ) -> Orchestrator<LocalStorage, MockCompiler, MockConfig> {
        Orchestrator::new(LocalStorage::new(), compiler, MockConfig::new(root))
    }

    #[tokio::test]
    async fn test_compile_without_license_uses_original_source() {
        let dir = TempDir::new().unwrap();
        let source = write_source(dir.path(), "strategy.mq5");
        let compiler = MockCompiler::new(Behavior::WriteArtifact);
        let orchestrator = orchestrator(dir.path(), compiler.clone());

        let report = orchestrator
            .compile(&CompileRequest::new(&source, "42"))
            .await;

        assert!(report.success, "{:?}", report);
        assert_eq!(compiler.calls(), vec![source.clone()]);
        assert_eq!(report.filename.as_deref(), Some("strategy_42.ex5"));

        let expected = dir.path().join("out/compiled/strategy_42.ex5");
        assert_eq!(report.compiled_path, Some(expected.display().to_string()));
        assert!(expected.exists());
        assert!(!dir.path().join("strategy.ex5").exists());
    }

    #[tokio::test]
    async fn test_compile_with_license_compiles_derived_source() {
        let dir = TempDir::new().unwrap();
        let source = write_source(dir.path(), "strategy.mq5");
        let before = std::fs::read_to_string(&source).unwrap();
        let compiler = MockCompiler::new(Behavior::WriteArtifact);
        let orchestrator = orchestrator(dir.path(), compiler.clone());

        let request = CompileRequest::new(&source, "7").with_license_key("EA-KEY");
        let report = orchestrator.compile(&request).await;

        assert!(report.success, "{:?}", report);
        assert!(report.warnings.is_empty());
        let licensed = dir.path().join("licensed_strategy.mq5");
        assert_eq!(compiler.calls(), vec![licensed.clone()]);
        assert!(std::fs::read_to_string(&licensed)
            .unwrap()
            .contains("string LICENSE_KEY = \"EA-KEY\";"));
        assert_eq!(std::fs::read_to_string(&source).unwrap(), before);
        assert_eq!(report.filename.as_deref(), Some("strategy_7.ex5"));
        assert!(dir.path().join("out/compiled/strategy_7.ex5").exists());
    }

    #[tokio::test]
    async fn test_missing_source_fails_before_spawn() {
        let dir = TempDir::new().unwrap();
        let compiler = MockCompiler::new(Behavior::WriteArtifact);
        let orchestrator = orchestrator(dir.path(), compiler.clone());

        let report = orchestrator
            .compile(&CompileRequest::new(dir.path().join("nope.mq5"), "42"))
            .await;

        assert!(!report.success);
        assert_eq!(report.error_kind, Some(ErrorKind::NotFound));
        assert!(compiler.calls().is_empty());
    }

    #[tokio::test]
    async fn test_compiler_failure_surfaces_diagnostics() {
        let dir = TempDir::new().unwrap();
        let source = write_source(dir.path(), "strategy.mq5");
        let orchestrator = orchestrator(dir.path(), MockCompiler::new(Behavior::Fail));

        let report = orchestrator.compile(&CompileRequest::new(&source, "42")).await;

        assert!(!report.success);
        assert_eq!(report.error_kind, Some(ErrorKind::CompilerFailed));
        assert!(report
            .error
            .unwrap()
            .contains("'Foo' - undeclared identifier"));
    }

    #[tokio::test]
    async fn test_success_exit_code_does_not_imply_success_result() {
        let dir = TempDir::new().unwrap();
        let source = write_source(dir.path(), "strategy.mq5");
        let orchestrator = orchestrator(
            dir.path(),
            MockCompiler::new(Behavior::SucceedWithoutArtifact),
        );

        let report = orchestrator.compile(&CompileRequest::new(&source, "42")).await;

        assert!(!report.success);
        assert_eq!(report.error_kind, Some(ErrorKind::MissingOutput));
        assert!(report
            .error
            .unwrap()
            .starts_with("Compiled file not found after successful compilation"));
    }

    #[tokio::test]
    async fn test_timeout_is_distinct_from_compiler_failure() {
        let dir = TempDir::new().unwrap();
        let source = write_source(dir.path(), "strategy.mq5");
        let orchestrator = orchestrator(dir.path(), MockCompiler::new(Behavior::TimeOut));

        let report = orchestrator.compile(&CompileRequest::new(&source, "42")).await;

        assert!(!report.success);
        assert_eq!(report.error_kind, Some(ErrorKind::Timeout));
        assert_eq!(report.message, "Compilation process took too long");
    }

    #[tokio::test]
    async fn test_relative_source_resolves_under_storage_dir() {
        let dir = TempDir::new().unwrap();
        let storage_dir = dir.path().join("ea_files");
        std::fs::create_dir_all(&storage_dir).unwrap();
        let stored = write_source(&storage_dir, "grid_bot_unique_name.mq5");
        let compiler = MockCompiler::new(Behavior::WriteArtifact);
        let orchestrator = orchestrator(dir.path(), compiler.clone());

        let report = orchestrator
            .compile(&CompileRequest::new("grid_bot_unique_name.mq5", "3"))
            .await;

        assert!(report.success, "{:?}", report);
        assert_eq!(compiler.calls(), vec![stored]);
    }

    #[tokio::test]
    async fn test_injection_failure_degrades_with_warning() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("binary.mq5");
        std::fs::write(&source, [0xff, 0xfe, 0xfd]).unwrap();
        let compiler = MockCompiler::new(Behavior::WriteArtifact);
        let orchestrator = orchestrator(dir.path(), compiler.clone());

        let request = CompileRequest::new(&source, "42").with_license_key("EA-KEY");
        let report = orchestrator.compile(&request).await;

        assert!(report.success, "{:?}", report);
        assert_eq!(compiler.calls(), vec![source]);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("License injection skipped"));
    }

    #[tokio::test]
    async fn test_unsafe_product_id_is_rejected() {
        let dir = TempDir::new().unwrap();
        let source = write_source(dir.path(), "strategy.mq5");
        let compiler = MockCompiler::new(Behavior::WriteArtifact);
        let orchestrator = orchestrator(dir.path(), compiler.clone());

        let report = orchestrator
            .compile(&CompileRequest::new(&source, "../../escape"))
            .await;

        assert!(!report.success);
        assert_eq!(report.error_kind, Some(ErrorKind::InvalidRequest));
        assert!(compiler.calls().is_empty());
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(
            output_file_name(Path::new("/eas/strategy.mq5"), "42").unwrap(),
            "strategy_42.ex5"
        );
        assert_eq!(
            output_file_name(Path::new("my.bot.mq5"), "p1").unwrap(),
            "my.bot_p1.ex5"
        );
    }
}
