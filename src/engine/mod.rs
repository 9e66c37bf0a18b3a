mod conflict;
mod error;
mod index;

pub use conflict::{conflicts, sort_bucket, ConflictSet};
pub use error::{EngineError, ErrorKind};
pub use index::{Schedule, ScheduleIndex};
