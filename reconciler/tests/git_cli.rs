mod utils;
use utils::body;

use std::path::Path;
use std::process::Command;

/// Runs git in `dir` with a throwaway identity; panics on failure.
fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
        .args(["-c", "commit.gpgsign=false", "-c", "tag.gpgsign=false"])
        .args(args)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A repository with one commit, a lightweight tag `v1`, an annotated tag
/// `v2` and a branch `v3`, or `None` when git isn't installed.
fn sample_repo() -> Option<(tempfile::TempDir, String)> {
    stakesign_utils::find_executable("git")?;
    let dir = tempfile::TempDir::new().unwrap();
    git(dir.path(), &["init", "-q"]);
    std::fs::write(dir.path().join("README"), "hello\n").unwrap();
    std::fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();
    git(dir.path(), &["add", "README", ".gitignore"]);
    git(dir.path(), &["commit", "-q", "-m", "initial"]);
    git(dir.path(), &["tag", "v1"]);
    git(dir.path(), &["tag", "-a", "v2", "-m", "release v2"]);
    git(dir.path(), &["branch", "v3"]);
    let head = git(dir.path(), &["rev-parse", "HEAD"]);
    Some((dir, head))
}

#[cfg(test)]
mod git_cli_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reconciler::logic::verify_git;
    use reconciler::GitCli;
    use serde_json::json;
    use stakesign_defs::{GitObject, RepositoryIndex, Resolution, SignError};

    #[tokio::test]
    async fn test_resolve_tags_and_branches() {
        let (dir, head) = match sample_repo() {
            Some(repo) => repo,
            None => return,
        };
        let repo = GitCli::new(dir.path());

        match repo.resolve("v1").await.unwrap() {
            Resolution::Resolved(resolved) => {
                assert_eq!(resolved.object, GitObject::Commit { id: head.clone() });
                assert_eq!(resolved.reference.unwrap().name, "refs/tags/v1");
            }
            other => panic!("unexpected {:?}", other),
        }

        match repo.resolve("v2").await.unwrap() {
            Resolution::Resolved(resolved) => match resolved.object {
                GitObject::Tag { id, name, target } => {
                    assert_eq!(name, "v2");
                    assert_eq!(target, head);
                    assert_ne!(id, head);
                }
                other => panic!("expected annotated tag, got {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }

        match repo.resolve("v3").await.unwrap() {
            Resolution::Resolved(resolved) => {
                assert_eq!(resolved.reference.unwrap().name, "refs/heads/v3")
            }
            other => panic!("unexpected {:?}", other),
        }

        match repo.resolve(&head).await.unwrap() {
            Resolution::Resolved(resolved) => assert!(resolved.reference.is_none()),
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(repo.resolve("v9").await.unwrap(), Resolution::Unresolved);
        assert_eq!(repo.head().await.unwrap(), head);
    }

    #[tokio::test]
    async fn test_tag_and_branch_collision_is_ambiguous() {
        let (dir, _) = match sample_repo() {
            Some(repo) => repo,
            None => return,
        };
        git(dir.path(), &["branch", "v1"]);
        let repo = GitCli::new(dir.path());
        assert_eq!(repo.resolve("v1").await.unwrap(), Resolution::Ambiguous);
    }

    #[tokio::test]
    async fn test_tags_to_blobs_and_trees_conflict() {
        let (dir, head) = match sample_repo() {
            Some(repo) => repo,
            None => return,
        };
        let blob = git(dir.path(), &["rev-parse", "HEAD:README"]);
        let tree = git(dir.path(), &["rev-parse", "HEAD^{tree}"]);
        git(dir.path(), &["tag", "rel", &blob]);
        git(dir.path(), &["tag", "-a", "snapshot", "-m", "tree only", &tree]);
        let repo = GitCli::new(dir.path());

        match repo.resolve("rel").await.unwrap() {
            Resolution::Resolved(resolved) => {
                assert_eq!(
                    resolved.object,
                    GitObject::Other {
                        id: blob.clone(),
                        kind: "blob".to_string()
                    }
                );
                assert_eq!(resolved.reference.unwrap().name, "refs/tags/rel");
            }
            other => panic!("unexpected {:?}", other),
        }
        match repo.resolve("snapshot").await.unwrap() {
            Resolution::Resolved(resolved) => {
                assert!(matches!(resolved.object, GitObject::Other { ref kind, .. } if kind == "tag"))
            }
            other => panic!("unexpected {:?}", other),
        }

        for tag in ["rel", "snapshot"] {
            let manifest = body(&[json!({"commit": head, "tag": tag})]);
            for ignore_missing in [false, true] {
                match verify_git(&repo, "HEAD", &manifest, ignore_missing).await {
                    Err(SignError::Conflict(msg)) => assert!(msg.contains("refs/tags/")),
                    other => panic!("expected conflict for {}, got {:?}", tag, other),
                }
            }
        }
    }

    #[tokio::test]
    async fn test_dirty_ignores_ignored_paths() {
        let (dir, _) = match sample_repo() {
            Some(repo) => repo,
            None => return,
        };
        let repo = GitCli::new(dir.path());
        assert!(!repo.is_dirty().await.unwrap());

        std::fs::write(dir.path().join("build.log"), "noise\n").unwrap();
        assert!(!repo.is_dirty().await.unwrap());

        std::fs::write(dir.path().join("README"), "changed\n").unwrap();
        assert!(repo.is_dirty().await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_against_real_repository() {
        let (dir, head) = match sample_repo() {
            Some(repo) => repo,
            None => return,
        };
        let repo = GitCli::new(dir.path());
        let tag_object = git(dir.path(), &["rev-parse", "v2"]);
        let manifest = body(&[
            json!({"commit": head, "tag": "v1"}),
            json!({"commit": head, "tag": "v2", "tagObject": tag_object}),
        ]);

        let result = verify_git(&repo, "v2", &manifest, false).await.unwrap();
        assert_eq!(
            result.verified,
            vec![format!(
                "Verified: local revision v2 = signed tag v1 (commit {})",
                head
            )]
        );

        let hijacked = body(&[json!({"commit": head, "tag": "v3"})]);
        assert!(matches!(
            verify_git(&repo, "HEAD", &hijacked, false).await,
            Err(SignError::Conflict(_))
        ));
    }
}
