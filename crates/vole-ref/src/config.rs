use vole_core::DType;

// Engine configuration

/// Settings for a [`RefEngine`](crate::RefEngine).
#[derive(Debug, Clone)]
pub struct RefEngineConfig {
    /// Element type assumed when sizing algorithm workspaces (default: F32).
    pub dtype: DType,
    /// Largest workspace, in bytes, a profiled algorithm may ask for.
    /// Algorithms above it are reported as `AllocFailed`. `None` = unlimited.
    pub workspace_limit: Option<usize>,
    /// Worker threads are named `<prefix>-<node id>`.
    pub thread_name_prefix: String,
}

impl Default for RefEngineConfig {
    fn default() -> Self {
        Self {
            dtype: DType::F32,
            workspace_limit: None,
            thread_name_prefix: "vole-ref".to_string(),
        }
    }
}

impl RefEngineConfig {
    pub fn with_dtype(mut self, dtype: DType) -> Self {
        self.dtype = dtype;
        self
    }

    /// Cap the workspace any profiled algorithm may use.
    pub fn with_workspace_limit(mut self, bytes: usize) -> Self {
        self.workspace_limit = Some(bytes);
        self
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }
}
