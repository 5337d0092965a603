//! Starts a program in the focused workspace's recorded directory.
//!
//! Order matters: the program is looked up on `$PATH` first, then the record
//! is resolved and checked, and only then is the directory changed and the
//! process image replaced.

use std::env;
use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::context::Context;
use crate::error::{Result, WswdError};
use crate::session;

/// Finds `program` the way a shell would.
///
/// Names containing `/` are taken as paths; anything else is searched in
/// `search_path`, where an empty component means the current directory.
/// Relative results are anchored at `cwd` so a later directory change does
/// not invalidate them.
pub fn find_program(program: &OsStr, search_path: Option<&OsStr>, cwd: &Path) -> Option<PathBuf> {
    let anchor = |candidate: PathBuf| {
        if candidate.is_absolute() {
            candidate
        } else {
            cwd.join(candidate)
        }
    };

    if program.is_empty() {
        return None;
    }
    if program.as_bytes().contains(&b'/') {
        let candidate = anchor(PathBuf::from(program));
        return is_executable(&candidate).then_some(candidate);
    }

    env::split_paths(search_path?)
        .map(|dir| {
            if dir.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                dir
            }
        })
        .map(|dir| anchor(dir.join(program)))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// A resolved program launch, ready to replace the current process.
#[derive(Debug, Clone)]
pub struct DispatchPlan {
    program: OsString,
    executable: PathBuf,
    args: Vec<OsString>,
    workdir: Option<PathBuf>,
}

impl DispatchPlan {
    /// Resolves `program` against the process `$PATH` and the focused record.
    pub fn prepare(ctx: &Context, program: OsString, args: Vec<OsString>) -> Result<Self> {
        let search_path = env::var_os("PATH");
        let cwd = env::current_dir().map_err(|e| WswdError::io("get working directory", e))?;
        Self::prepare_with(ctx, program, args, search_path.as_deref(), &cwd)
    }

    /// Like [`DispatchPlan::prepare`] with an explicit search path and base directory.
    pub fn prepare_with(
        ctx: &Context,
        program: OsString,
        args: Vec<OsString>,
        search_path: Option<&OsStr>,
        cwd: &Path,
    ) -> Result<Self> {
        let executable = find_program(&program, search_path, cwd)
            .ok_or_else(|| WswdError::ProgramNotFound(program.to_string_lossy().into_owned()))?;

        let workdir = session::resolve(ctx.store(), ctx.focused())?;
        if let Some(dir) = &workdir {
            session::check_enterable(dir)?;
        }

        tracing::debug!(
            program = %executable.display(),
            workdir = ?workdir,
            "Dispatch prepared"
        );
        Ok(DispatchPlan {
            program,
            executable,
            args,
            workdir,
        })
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    fn base_command(&self) -> Command {
        let mut command = Command::new(&self.executable);
        command.arg0(&self.program).args(&self.args);
        command
    }

    /// Equivalent child-process command, running in the recorded directory.
    pub fn command(&self) -> Command {
        let mut command = self.base_command();
        if let Some(dir) = &self.workdir {
            command.current_dir(dir);
        }
        command
    }

    /// Enters the recorded directory and replaces the current process.
    ///
    /// Only returns if the directory change or the exec itself failed.
    pub fn exec(self) -> WswdError {
        if let Some(dir) = &self.workdir {
            if let Err(source) = env::set_current_dir(dir) {
                return WswdError::DirectoryUnavailable {
                    path: dir.clone(),
                    source,
                };
            }
        }
        let source = self.base_command().exec();
        WswdError::ExecFailed {
            program: self.program.to_string_lossy().into_owned(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Workspace, WorkspaceId};
    use crate::StorageConfig;
    use std::fs;
    use tempfile::tempdir;

    fn make_executable(path: &Path) {
        fs::write(path, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn context(store_dir: &Path, focused: u64) -> Context {
        let workspaces = vec![Workspace {
            id: WorkspaceId(focused),
            name: "1".to_string(),
            focused: true,
        }];
        Context::new(&StorageConfig::with_root(store_dir.to_path_buf()), &workspaces).unwrap()
    }

    #[test]
    fn finds_program_on_search_path() {
        let temp = tempdir().unwrap();
        let bin_a = temp.path().join("a");
        let bin_b = temp.path().join("b");
        fs::create_dir_all(&bin_a).unwrap();
        fs::create_dir_all(&bin_b).unwrap();
        make_executable(&bin_b.join("tool"));

        let search = env::join_paths([&bin_a, &bin_b]).unwrap();
        let found = find_program(OsStr::new("tool"), Some(&search), Path::new("/"));
        assert_eq!(found, Some(bin_b.join("tool")));
    }

    #[test]
    fn first_search_path_match_wins() {
        let temp = tempdir().unwrap();
        let bin_a = temp.path().join("a");
        let bin_b = temp.path().join("b");
        fs::create_dir_all(&bin_a).unwrap();
        fs::create_dir_all(&bin_b).unwrap();
        make_executable(&bin_a.join("tool"));
        make_executable(&bin_b.join("tool"));

        let search = env::join_paths([&bin_a, &bin_b]).unwrap();
        let found = find_program(OsStr::new("tool"), Some(&search), Path::new("/"));
        assert_eq!(found, Some(bin_a.join("tool")));
    }

    #[test]
    fn skips_files_without_execute_bit() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("tool"), "").unwrap();
        let found = find_program(
            OsStr::new("tool"),
            Some(temp.path().as_os_str()),
            Path::new("/"),
        );
        assert_eq!(found, None);
    }

    #[test]
    fn relative_program_path_is_anchored_at_cwd() {
        let temp = tempdir().unwrap();
        make_executable(&temp.path().join("tool"));
        let found = find_program(OsStr::new("./tool"), None, temp.path());
        assert_eq!(found, Some(temp.path().join("./tool")));
        assert!(found.unwrap().is_absolute());
    }

    #[test]
    fn missing_program_fails_before_directory_check() {
        let temp = tempdir().unwrap();
        let ctx = context(&temp.path().join("store"), 1);
        ctx.store()
            .write(WorkspaceId(1), &temp.path().join("vanished"))
            .unwrap();

        let err = DispatchPlan::prepare_with(
            &ctx,
            OsString::from("no-such-program"),
            Vec::new(),
            Some(OsStr::new("")),
            temp.path(),
        )
        .unwrap_err();
        assert!(matches!(err, WswdError::ProgramNotFound(name) if name == "no-such-program"));
    }

    #[test]
    fn vanished_record_directory_is_fatal() {
        let temp = tempdir().unwrap();
        let ctx = context(&temp.path().join("store"), 1);
        let vanished = temp.path().join("vanished");
        ctx.store().write(WorkspaceId(1), &vanished).unwrap();

        let err = DispatchPlan::prepare_with(
            &ctx,
            OsString::from("/bin/sh"),
            Vec::new(),
            None,
            temp.path(),
        )
        .unwrap_err();
        assert!(matches!(err, WswdError::DirectoryUnavailable { path, .. } if path == vanished));
    }

    #[test]
    fn runs_in_recorded_directory() {
        let temp = tempdir().unwrap();
        let project = temp.path().join("project");
        fs::create_dir_all(&project).unwrap();
        let ctx = context(&temp.path().join("store"), 3);
        ctx.set(&project).unwrap();

        let plan = DispatchPlan::prepare_with(
            &ctx,
            OsString::from("sh"),
            vec!["-c".into(), "pwd".into()],
            Some(OsStr::new("/bin:/usr/bin")),
            temp.path(),
        )
        .unwrap();
        assert_eq!(plan.workdir(), Some(project.as_path()));

        let output = plan.command().output().unwrap();
        assert!(output.status.success());
        let printed = String::from_utf8(output.stdout).unwrap();
        assert_eq!(
            fs::canonicalize(printed.trim()).unwrap(),
            fs::canonicalize(&project).unwrap()
        );
    }

    #[test]
    fn runs_without_record_in_current_directory() {
        let temp = tempdir().unwrap();
        let ctx = context(&temp.path().join("store"), 3);

        let plan = DispatchPlan::prepare_with(
            &ctx,
            OsString::from("sh"),
            vec!["-c".into(), "exit 0".into()],
            Some(OsStr::new("/bin:/usr/bin")),
            temp.path(),
        )
        .unwrap();
        assert_eq!(plan.workdir(), None);
        assert!(plan.command().status().unwrap().success());
    }
}
