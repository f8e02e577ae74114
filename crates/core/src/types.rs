/// Frame indices are 0-based and strictly increasing within a stream.
pub type FrameIndex = u64;

/// Joint angles are expressed in degrees.
pub type Degrees = f64;
