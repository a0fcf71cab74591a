use crate::core_fs::error::FsError;
use log::{debug, warn};
use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};

/// An absolute path that is known to live under the sandbox root.
///
/// Only [`Sandbox::resolve`] can build one, so holding a `ResolvedPath` is
/// proof that the containment check already ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: PathBuf,
}

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Confines client supplied paths to a directory subtree.
#[derive(Debug)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Creates the root directory if needed and pins it to its canonical form.
    /// Only used at startup, so the error is a plain I/O one for the caller
    /// to put in context.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;
        let root = root.canonicalize()?;
        debug!("Sandbox root is {:?}", root);

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `input` against the session's logical `current_dir`.
    ///
    /// An empty input names the current directory, a leading `/` anchors the
    /// input at the sandbox root, anything else is relative to `current_dir`.
    /// The joined path is normalized first and then has its symbolic links
    /// resolved; the root prefix is checked after each step, so no path that
    /// only escapes through `..` or a link is ever handed out.
    pub fn resolve(&self, current_dir: &str, input: &str) -> Result<ResolvedPath, FsError> {
        if input.contains('\0') || current_dir.contains('\0') {
            warn!("Rejected path containing a NUL byte");
            return Err(FsError::InvalidPath);
        }

        let current = current_dir.trim_start_matches('/');
        let joined = if input.is_empty() {
            self.root.join(current)
        } else if input.starts_with('/') {
            self.root.join(input.trim_start_matches('/'))
        } else {
            self.root.join(current).join(input)
        };

        let normalized = normalize_lexically(&joined);
        if !normalized.starts_with(&self.root) {
            warn!("Path is outside of the allowed area: {:?}", normalized);
            return Err(FsError::InvalidPath);
        }

        let resolved = resolve_links(&normalized)?;
        if !resolved.starts_with(&self.root) {
            warn!("Path escapes the allowed area through a link: {:?}", resolved);
            return Err(FsError::InvalidPath);
        }

        Ok(ResolvedPath { path: resolved })
    }

    /// The client facing form of `path`: `/` joined components below the root.
    pub fn logical_path(&self, path: &ResolvedPath) -> String {
        let relative = match path.as_path().strip_prefix(&self.root) {
            Ok(relative) => relative,
            Err(_) => return "/".to_string(),
        };

        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        format!("/{}", parts.join("/"))
    }
}

/// Folds `.` and `..` without touching the filesystem. `..` at the top stays put.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Canonicalizes the deepest ancestor of `path` that exists and re-appends
/// the missing tail, so targets that do not exist yet (STOR) still get their
/// links resolved.
fn resolve_links(path: &Path) -> Result<PathBuf, FsError> {
    let mut existing = path;
    let mut missing: Vec<OsString> = Vec::new();

    loop {
        match existing.canonicalize() {
            Ok(mut real) => {
                for part in missing.iter().rev() {
                    real.push(part);
                }
                return Ok(real);
            }
            Err(_) if std::fs::symlink_metadata(existing).is_ok() => {
                // Present but unresolvable, e.g. a dangling link
                warn!("Cannot resolve {:?}", existing);
                return Err(FsError::InvalidPath);
            }
            Err(_) => match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    missing.push(name.to_os_string());
                    existing = parent;
                }
                _ => return Ok(path.to_path_buf()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sandbox() -> (TempDir, Sandbox) {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("pub/docs")).unwrap();
        fs::write(temp_dir.path().join("pub/readme.txt"), b"hi").unwrap();
        let sandbox = Sandbox::new(temp_dir.path()).unwrap();
        (temp_dir, sandbox)
    }

    #[test]
    fn test_empty_input_is_current_dir() {
        let (_tmp, sandbox) = sandbox();
        let resolved = sandbox.resolve("/pub", "").unwrap();
        assert_eq!(resolved.as_path(), sandbox.root().join("pub"));
        assert_eq!(sandbox.logical_path(&resolved), "/pub");
    }

    #[test]
    fn test_relative_and_rooted_inputs() {
        let (_tmp, sandbox) = sandbox();

        let relative = sandbox.resolve("/pub", "readme.txt").unwrap();
        assert_eq!(relative.as_path(), sandbox.root().join("pub/readme.txt"));

        let rooted = sandbox.resolve("/pub", "/pub/docs").unwrap();
        assert_eq!(rooted.as_path(), sandbox.root().join("pub/docs"));

        // Extra leading separators are all stripped
        let rooted = sandbox.resolve("/", "//pub").unwrap();
        assert_eq!(rooted.as_path(), sandbox.root().join("pub"));
    }

    #[test]
    fn test_dot_segments_are_folded() {
        let (_tmp, sandbox) = sandbox();
        let resolved = sandbox.resolve("/", "./pub/docs/../readme.txt").unwrap();
        assert_eq!(resolved.as_path(), sandbox.root().join("pub/readme.txt"));

        let top = sandbox.resolve("/pub", "..").unwrap();
        assert_eq!(top.as_path(), sandbox.root());
        assert_eq!(sandbox.logical_path(&top), "/");
    }

    #[test]
    fn test_traversal_is_rejected() {
        let (_tmp, sandbox) = sandbox();
        for input in ["../../etc", "..", "pub/../../x", "/../etc/passwd", "docs/../../../"] {
            assert!(
                matches!(sandbox.resolve("/", input), Err(FsError::InvalidPath)),
                "{} should be rejected",
                input
            );
        }
        assert!(matches!(
            sandbox.resolve("/pub", "../../etc"),
            Err(FsError::InvalidPath)
        ));
    }

    #[test]
    fn test_sibling_with_common_prefix_is_rejected() {
        let (tmp, sandbox) = sandbox();
        let name = tmp.path().file_name().unwrap().to_string_lossy().into_owned();
        let sibling = format!("../{}-evil/file", name);
        assert!(matches!(
            sandbox.resolve("/", &sibling),
            Err(FsError::InvalidPath)
        ));
    }

    #[test]
    fn test_missing_target_still_resolves() {
        let (_tmp, sandbox) = sandbox();
        let resolved = sandbox.resolve("/pub", "new/dir/file.bin").unwrap();
        assert_eq!(resolved.as_path(), sandbox.root().join("pub/new/dir/file.bin"));
    }

    #[test]
    fn test_root_under_a_file_fails_at_startup() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("plain"), b"x").unwrap();
        assert!(Sandbox::new(tmp.path().join("plain/root")).is_err());
    }

    #[test]
    fn test_nul_byte_is_rejected() {
        let (_tmp, sandbox) = sandbox();
        assert!(matches!(
            sandbox.resolve("/", "file\0.txt"),
            Err(FsError::InvalidPath)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_is_rejected_after_resolution() {
        let (tmp, sandbox) = sandbox();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret"), b"nope").unwrap();
        std::os::unix::fs::symlink(outside.path(), tmp.path().join("pub/escape")).unwrap();

        // Lexically this stays inside the root, only link resolution exposes it
        assert!(matches!(
            sandbox.resolve("/pub", "escape/secret"),
            Err(FsError::InvalidPath)
        ));
        assert!(matches!(
            sandbox.resolve("/pub", "escape/not-yet-there"),
            Err(FsError::InvalidPath)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_rejected() {
        let (tmp, sandbox) = sandbox();
        std::os::unix::fs::symlink("/nonexistent/target", tmp.path().join("pub/dangling"))
            .unwrap();
        assert!(matches!(
            sandbox.resolve("/pub", "dangling"),
            Err(FsError::InvalidPath)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_inside_root_is_allowed() {
        let (tmp, sandbox) = sandbox();
        std::os::unix::fs::symlink(tmp.path().join("pub/docs"), tmp.path().join("docs-link"))
            .unwrap();
        let resolved = sandbox.resolve("/", "docs-link").unwrap();
        assert_eq!(resolved.as_path(), sandbox.root().join("pub/docs"));
    }
}
