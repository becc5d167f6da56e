use camino::{Utf8Path, Utf8PathBuf};

use crate::METADATA_FILENAME;

pub fn metadata_path(root: &Utf8Path) -> Utf8PathBuf {
    root.join(METADATA_FILENAME)
}
