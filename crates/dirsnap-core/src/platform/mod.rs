/// Platform layer — the directory-listing capability and the
/// extended-length path handling it depends on.

pub mod list_dir;
pub mod long_path;

pub use list_dir::{ChildEntry, ListDir, OsLister};
pub use long_path::{display_form, normalize_root};
