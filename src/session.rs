//! Per-session workspace directories and their expiry.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CaptionError, CaptionResult};

/// How long a session's working data survives after its last write.
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// Cadence of the background expiry sweep.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Strip anything that could escape the workspace root from a client id.
///
/// Dots are dropped too, so `..` cannot survive sanitization.
pub fn sanitize_session_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect()
}

/// Resolve (and create) the directory for a session id under `root`.
pub fn session_dir(root: &Path, session_id: &str) -> CaptionResult<PathBuf> {
    let safe = sanitize_session_id(session_id);
    if safe.is_empty() {
        return Err(CaptionError::InvalidSessionId);
    }

    let dir = root.join(safe);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Delete session directories whose newest file is older than `ttl`.
///
/// Returns the number of sessions removed.
pub fn cleanup_expired(root: &Path, ttl: Duration) -> CaptionResult<usize> {
    if !root.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let dir = entry.path();
        let Some(age) = session_age(&dir) else {
            continue;
        };
        if age >= ttl {
            tracing::info!(session = %dir.display(), "removing expired session");
            std::fs::remove_dir_all(&dir)?;
            removed += 1;
        }
    }

    Ok(removed)
}

/// Time since the newest write anywhere in the session directory.
fn session_age(dir: &Path) -> Option<Duration> {
    let mut newest = std::fs::metadata(dir).ok()?.modified().ok()?;
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
                if modified > newest {
                    newest = modified;
                }
            }
        }
    }
    newest.elapsed().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_traversal_attempts() {
        assert_eq!(sanitize_session_id("abc-123_X"), "abc-123_X");
        assert_eq!(sanitize_session_id("../../etc"), "etc");
        assert_eq!(sanitize_session_id("a/b\\c"), "abc");
        assert_eq!(sanitize_session_id(".."), "");
    }

    #[test]
    fn test_session_dir_rejects_empty_ids() {
        let root = tempfile::tempdir().unwrap();
        assert!(matches!(
            session_dir(root.path(), "../.."),
            Err(CaptionError::InvalidSessionId)
        ));
    }

    #[test]
    fn test_session_dir_is_created_under_root() {
        let root = tempfile::tempdir().unwrap();
        let dir = session_dir(root.path(), "session-1").unwrap();
        assert!(dir.is_dir());
        assert_eq!(dir.parent().unwrap(), root.path());

        // Same id resolves to the same directory.
        assert_eq!(session_dir(root.path(), "session-1").unwrap(), dir);
    }

    #[test]
    fn test_cleanup_removes_only_expired_sessions() {
        let root = tempfile::tempdir().unwrap();
        let stale = session_dir(root.path(), "stale").unwrap();
        std::fs::write(stale.join("video.mp4"), b"data").unwrap();

        // Everything is "expired" against a zero TTL, nothing against a long one.
        assert_eq!(cleanup_expired(root.path(), Duration::from_secs(3600)).unwrap(), 0);
        assert!(stale.exists());

        assert_eq!(cleanup_expired(root.path(), Duration::ZERO).unwrap(), 1);
        assert!(!stale.exists());
    }

    #[test]
    fn test_cleanup_on_missing_root_is_a_noop() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("nope");
        assert_eq!(cleanup_expired(&missing, Duration::ZERO).unwrap(), 0);
    }
}
