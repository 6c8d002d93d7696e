pub mod entities;
pub mod ingest;
pub mod project;
pub mod runs;
pub mod symbols;
pub mod util;

pub use entities::*;
pub use ingest::*;
pub use project::*;
pub use runs::*;
pub use symbols::*;
pub use util::*;
