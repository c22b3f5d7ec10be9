//! Traits for the frame producers and detectors that feed the trackers.

use crate::error::{Result, TrackError};
use crate::rect::Rect;
use crate::tracker::{Frame, FrameView};

/// A detected box offered as a tracking seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seed {
    pub rect: Rect,
    /// Detection confidence score
    pub score: f32,
}

impl Seed {
    pub fn new(rect: Rect, score: f32) -> Self {
        Self { rect, score }
    }
}

/// Trait for object detection backends that provide initial boxes.
///
/// Implement this trait to seed the trackers from any detection model.
///
/// # Example
///
/// ```ignore
/// use csktrack_rs::{FrameView, Seed, SeedSource};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl SeedSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, frame: FrameView<'_>) -> Result<Vec<Seed>, Self::Error> {
///         // Run inference and return boxes
///         Ok(vec![])
///     }
/// }
/// ```
pub trait SeedSource {
    /// Error type for detection failures.
    type Error;

    /// Run detection on one grayscale frame.
    fn detect(&mut self, frame: FrameView<'_>) -> std::result::Result<Vec<Seed>, Self::Error>;
}

/// Trait for anything that yields grayscale frames one at a time.
pub trait FrameSource {
    /// Error type for acquisition failures.
    type Error;

    /// Next frame, or `None` at the end of the stream.
    fn next_frame(&mut self) -> std::result::Result<Option<Frame>, Self::Error>;
}

impl FrameSource for std::vec::IntoIter<Frame> {
    type Error = std::convert::Infallible;

    fn next_frame(&mut self) -> std::result::Result<Option<Frame>, Self::Error> {
        Ok(self.next())
    }
}

/// Convert a row-major 8-bit luma buffer into a [`Frame`].
pub fn frame_from_luma(bytes: &[u8], width: usize, height: usize) -> Result<Frame> {
    let expected = width * height;
    if bytes.len() != expected {
        return Err(TrackError::InvalidFrame {
            expected,
            got: bytes.len(),
        });
    }
    Frame::from_shape_vec((height, width), bytes.to_vec()).map_err(|_| TrackError::InvalidFrame {
        expected,
        got: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_from_luma() {
        let bytes: Vec<u8> = (0..12).collect();
        let frame = frame_from_luma(&bytes, 4, 3).unwrap();
        assert_eq!(frame.dim(), (3, 4));
        assert_eq!(frame[[1, 2]], 6);
    }

    #[test]
    fn test_frame_from_luma_rejects_wrong_length() {
        assert_eq!(
            frame_from_luma(&[0; 10], 4, 3),
            Err(TrackError::InvalidFrame {
                expected: 12,
                got: 10
            })
        );
    }

    #[test]
    fn test_vec_frame_source() {
        let mut source = vec![Frame::zeros((2, 2)), Frame::zeros((2, 2))].into_iter();
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_none());
    }
}
