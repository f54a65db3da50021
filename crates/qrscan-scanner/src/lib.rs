mod camera;
mod capture;
mod decode;
mod detector;
mod error;
mod frame;
mod session;
mod sink;

#[cfg(feature = "screen-capture")]
mod screen;

pub use camera::{Camera, FacingMode, FeedTrack, TrackSettings, VideoConstraints, VideoStream, VideoTrack};
pub use capture::FrameDirCamera;
pub use decode::{RqrrDetector, RqrrProvider};
pub use detector::{BoundingBox, CodeDetector, DetectedCode, DetectorProvider};
pub use error::{AcquireError, DetectorError, ScanError, SinkError};
pub use frame::{Frame, FrameClock, FrameTicker, IntervalClock};
pub use session::{PendingScan, ScannerBackend, ScannerSession, SessionState};
pub use sink::{VideoMetadata, VideoSink};

#[cfg(feature = "screen-capture")]
pub use screen::ScreenCamera;
