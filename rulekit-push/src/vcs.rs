//! Version-control seam.
//!
//! [`VersionControl`] is everything push needs from git hosting. [`GhCli`]
//! implements it by shelling out to the GitHub CLI (`gh`) for cloning,
//! authentication and pull requests, and to `git` for local operations.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{io_err, PushError};

pub const GH_REMEDIATION: &str = "Install the GitHub CLI: https://cli.github.com";
pub const GIT_REMEDIATION: &str = "Install git: https://git-scm.com/downloads";
pub const AUTH_REMEDIATION: &str = "Run `gh auth login` and try again.";

/// A pull request to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub title: String,
    pub body: String,
    /// Branch holding the changes.
    pub head: String,
    /// Target branch; the repository default when `None`.
    pub base: Option<String>,
}

/// Operations push performs against the template repository.
pub trait VersionControl {
    /// Fail fast when the tooling is missing or not authenticated.
    fn ensure_ready(&self) -> Result<(), PushError>;

    /// Shallow-clone `repo` into `dest`, which must not exist yet.
    fn clone_shallow(&self, repo: &str, dest: &Path) -> Result<(), PushError>;

    fn create_branch(&self, repo_dir: &Path, branch: &str) -> Result<(), PushError>;

    /// Whether the working tree differs from the checked-out commit.
    fn has_changes(&self, repo_dir: &Path) -> Result<bool, PushError>;

    /// Stage everything and commit.
    fn commit_all(&self, repo_dir: &Path, message: &str) -> Result<(), PushError>;

    fn push_branch(&self, repo_dir: &Path, branch: &str) -> Result<(), PushError>;

    /// Open `pr` and return its URL.
    fn open_pull_request(&self, repo_dir: &Path, pr: &PullRequest) -> Result<String, PushError>;
}

// ---------------------------------------------------------------------------
// GhCli
// ---------------------------------------------------------------------------

/// [`VersionControl`] backed by the `gh` and `git` executables.
#[derive(Debug, Clone)]
pub struct GhCli {
    gh: PathBuf,
    git: PathBuf,
}

impl GhCli {
    /// Locate `gh` and `git` on `PATH`.
    pub fn locate() -> Result<Self, PushError> {
        let gh = which::which("gh").map_err(|_| PushError::ToolMissing {
            tool: "gh",
            remediation: GH_REMEDIATION,
        })?;
        let git = which::which("git").map_err(|_| PushError::ToolMissing {
            tool: "git",
            remediation: GIT_REMEDIATION,
        })?;
        Ok(Self { gh, git })
    }

    fn gh(&self, args: &[&str], cwd: Option<&Path>) -> Result<String, PushError> {
        run(&self.gh, args, cwd)
    }

    fn git(&self, repo_dir: &Path, args: &[&str]) -> Result<String, PushError> {
        run(&self.git, args, Some(repo_dir))
    }
}

impl VersionControl for GhCli {
    fn ensure_ready(&self) -> Result<(), PushError> {
        match self.gh(&["auth", "status"], None) {
            Ok(_) => Ok(()),
            Err(PushError::Command { stderr, .. }) => {
                tracing::debug!(%stderr, "gh auth status failed");
                Err(PushError::NotAuthenticated {
                    remediation: AUTH_REMEDIATION,
                })
            }
            Err(err) => Err(err),
        }
    }

    fn clone_shallow(&self, repo: &str, dest: &Path) -> Result<(), PushError> {
        let dest = dest.to_string_lossy().into_owned();
        self.gh(&["repo", "clone", repo, dest.as_str(), "--", "--depth", "1"], None)?;
        Ok(())
    }

    fn create_branch(&self, repo_dir: &Path, branch: &str) -> Result<(), PushError> {
        self.git(repo_dir, &["checkout", "-b", branch])?;
        Ok(())
    }

    fn has_changes(&self, repo_dir: &Path) -> Result<bool, PushError> {
        let status = self.git(repo_dir, &["status", "--porcelain"])?;
        Ok(!status.trim().is_empty())
    }

    fn commit_all(&self, repo_dir: &Path, message: &str) -> Result<(), PushError> {
        self.git(repo_dir, &["add", "--all"])?;
        self.git(repo_dir, &["commit", "--message", message])?;
        Ok(())
    }

    fn push_branch(&self, repo_dir: &Path, branch: &str) -> Result<(), PushError> {
        self.git(repo_dir, &["push", "--set-upstream", "origin", branch])?;
        Ok(())
    }

    fn open_pull_request(&self, repo_dir: &Path, pr: &PullRequest) -> Result<String, PushError> {
        let mut args = vec![
            "pr",
            "create",
            "--title",
            pr.title.as_str(),
            "--body",
            pr.body.as_str(),
            "--head",
            pr.head.as_str(),
        ];
        if let Some(base) = &pr.base {
            args.extend(["--base", base.as_str()]);
        }
        let stdout = self.gh(&args, Some(repo_dir))?;
        Ok(stdout
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or_default()
            .trim()
            .to_string())
    }
}

/// Run `program` with `args`, returning trimmed stdout on success.
fn run(program: &Path, args: &[&str], cwd: Option<&Path>) -> Result<String, PushError> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    tracing::debug!(program = %program.display(), ?args, "running");
    let output = cmd.output().map_err(|e| io_err(program, e))?;

    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
    }

    Err(PushError::Command {
        program: program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string()),
        args: args.join(" "),
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}
