//! Terminal rendering of session results.

use colored::Colorize;

use crate::infrastructure::git::WorkingTreeStatus;

/// Render a working tree status the way `git status` groups it.
pub fn render_status(status: &WorkingTreeStatus) -> String {
    let mut out = String::new();

    match &status.current_branch {
        Some(branch) => out.push_str(&format!("On branch {}\n", branch.bold())),
        None => out.push_str("Not currently on any branch\n"),
    }

    if status.is_clean() {
        out.push_str("nothing to commit, working tree clean\n");
        return out;
    }

    if !status.staged.is_empty() {
        out.push_str("\nChanges staged for commit:\n");
        for path in &status.staged {
            out.push_str(&format!("  {}\n", path.green()));
        }
    }

    if !status.modified.is_empty() || !status.deleted.is_empty() {
        out.push_str("\nChanges not staged for commit:\n");
        for path in &status.modified {
            out.push_str(&format!("  modified: {}\n", path.yellow()));
        }
        for path in &status.deleted {
            out.push_str(&format!("  deleted:  {}\n", path.yellow()));
        }
    }

    if !status.untracked.is_empty() {
        out.push_str("\nUntracked files:\n");
        for path in &status.untracked {
            out.push_str(&format!("  {}\n", path.red()));
        }
    }

    out
}
