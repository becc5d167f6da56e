use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

use crate::Folder;

/// Root segment Canvas prefixes onto every course folder's `full_name`.
pub const COURSE_FILES_ROOT: &str = "course files";

fn ends_with_separator(path: &str) -> bool {
    path.ends_with('/') || path.ends_with(std::path::MAIN_SEPARATOR)
}

/// Maps remote folder names onto local directories by swapping the remote root
/// segment for a local destination.
#[derive(Debug, Clone)]
pub struct FolderPathResolver {
    root_segment: String,
}

impl FolderPathResolver {
    pub fn new(root_segment: impl Into<String>) -> Self {
        Self {
            root_segment: root_segment.into(),
        }
    }

    pub fn root_segment(&self) -> &str {
        &self.root_segment
    }

    pub fn resolve(&self, folder: &Folder, destination_root: &str) -> String {
        self.resolve_name(&folder.full_name, destination_root)
    }

    /// Pure string rewrite of a `full_name`; never touches the filesystem.
    pub fn resolve_name(&self, full_name: &str, destination_root: &str) -> String {
        let Some(rest) = full_name.strip_prefix(self.root_segment.as_str()) else {
            return Utf8Path::new(destination_root)
                .join(full_name)
                .into_string();
        };

        // A name like "course filesXYZ" is not under the root segment.
        if !rest.is_empty() && !rest.starts_with('/') {
            return Utf8Path::new(destination_root)
                .join(full_name)
                .into_string();
        }

        if ends_with_separator(destination_root) {
            let tail = rest.strip_prefix('/').unwrap_or(rest);
            format!("{destination_root}{tail}")
        } else {
            format!("{destination_root}{rest}")
        }
    }
}

impl Default for FolderPathResolver {
    fn default() -> Self {
        Self::new(COURSE_FILES_ROOT)
    }
}

/// A display name is written as a single path component below its folder.
/// Reject anything that would land elsewhere.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

/// True when `path` lies at or below `root` without stepping back out.
///
/// Purely lexical: `root/a/../b` is rejected even though it stays under
/// `root`, and symlinks are not followed.
pub fn is_contained(root: &Utf8Path, path: &Utf8Path) -> bool {
    match path.strip_prefix(root) {
        Ok(rest) => rest
            .components()
            .all(|c| matches!(c, Utf8Component::Normal(_) | Utf8Component::CurDir)),
        Err(_) => false,
    }
}

/// Candidate path for the `attempt`-th write of `original` (1-based).
///
/// Attempt 1 is the original path; later attempts insert `_v{attempt}` before
/// the extension: `notes.pdf`, `notes_v2.pdf`, `notes_v3.pdf`, ...
pub fn versioned_path(original: &Utf8Path, attempt: u32) -> Utf8PathBuf {
    if attempt <= 1 {
        return original.to_path_buf();
    }
    let stem = original.file_stem().unwrap_or_default();
    let file_name = match original.extension() {
        Some(ext) => format!("{stem}_v{attempt}.{ext}"),
        None => format!("{stem}_v{attempt}"),
    };
    original.with_file_name(file_name)
}
