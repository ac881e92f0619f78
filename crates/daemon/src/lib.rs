pub mod clock;
pub mod error;
pub mod handle;
pub mod lister;
pub mod sink;
pub mod status;
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ListError, SinkError};
pub use handle::TrackerHandle;
pub use lister::{ProcessLister, SysinfoLister};
pub use sink::{HttpSessionSink, LocalSessionSink, OpenedSession, SessionSink};
pub use tracker::{ActiveGame, CurrentStatus, SessionEvent, SessionTracker};
