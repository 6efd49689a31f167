/// Analysis modules — pure algorithms over the flat scan result.

pub mod aggregate;
pub mod top_dirs;
pub mod top_files;

pub use aggregate::aggregate;
pub use top_dirs::top_dirs;
pub use top_files::top_files;
