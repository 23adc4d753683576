//! Page composition: loading the source, transplanting pages, painting
//! margins and assembling the output document.

mod assembler;
mod backend;
mod options;
mod painter;
mod transplant;

pub use assembler::{assemble, Assembly};
pub use backend::{DocumentInfo, PageInfo, SourceDocument, SourcePage};
pub use options::{AssembleMode, AssembleOptions, CancelToken, PagePolicy, ProgressCallback};
pub use painter::{fill_operations, paint};
pub use transplant::{transplant, NewPage};
