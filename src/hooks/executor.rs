use crate::error::{ReleaseError, Result};
use crate::hooks::HookContext;
use std::path::Path;
use std::process::Command;
use tracing::{info, instrument, warn};

/// Runs configured hook commands through `sh -c`
pub struct HookExecutor;

impl HookExecutor {
    /// Execute a hook command with the given context
    ///
    /// The command runs in `workdir` with GIT_RELEASE_* variables set from
    /// the context. Exit code 0 is success; anything else is a failure.
    ///
    /// # Returns
    /// * `Ok(stdout)` if the command succeeds
    /// * `Err(ReleaseError::Hook)` if it cannot start or exits non-zero
    #[instrument(skip(context, workdir), fields(hook = %context.hook_type))]
    pub fn execute(command: &str, context: &HookContext, workdir: &Path) -> Result<String> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command).current_dir(workdir);

        for (key, value) in context.to_env_vars() {
            cmd.env(key, value);
        }

        let output = cmd.output().map_err(|e| {
            ReleaseError::hook(format!(
                "Failed to execute {} hook `{}`: {}",
                context.hook_type, command, e
            ))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReleaseError::hook(format!(
                "{} hook `{}` failed with exit code {}\nStdout: {}\nStderr: {}",
                context.hook_type,
                command,
                output.status.code().unwrap_or(-1),
                stdout.trim_end(),
                stderr.trim_end()
            )));
        }

        info!("hook succeeded");
        Ok(stdout)
    }

    /// Try to execute a hook, logging errors but not failing
    ///
    /// Used for post_release, where the release already exists and a hook
    /// failure must not fail it retroactively. Returns the failure as a
    /// warning message.
    pub fn execute_permissive(
        command: &str,
        context: &HookContext,
        workdir: &Path,
    ) -> Option<String> {
        match Self::execute(command, context, workdir) {
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "permissive hook failed");
                Some(e.to_string())
            }
        }
    }
}
