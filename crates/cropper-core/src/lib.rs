//! Cropper Core - image cropper geometry and gesture engine
//!
//! This crate turns gestures on a zoomable, pannable image into a bounded view
//! transform, keeps an optional crop frame consistent with that transform and
//! projects the on-screen result into a crop rectangle in source pixels.
//!
//! Rendering, gesture recognition, measurement and the native crop are left
//! to the host; see [`services`] for the collaborator traits and
//! [`cropper::ImageCropper`] for the entry point.

pub mod animation;
pub mod cell;
pub mod config;
pub mod cropper;
pub mod display;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod gesture;
pub mod layout;
pub mod limits;
pub mod projector;
pub mod services;
pub mod source;
pub mod statements;

pub use animation::{AnimationConfig, SpringConfig, TimingConfig};
pub use cell::SharedValue;
pub use config::CropperConfig;
pub use cropper::{ImageCropper, SourceRequest};
pub use display::{FitMode, ImageStyle};
pub use error::{ConfigError, CropError, SourceError};
pub use frame::{FrameConfig, FrameEdit, FrameHandle, FramePoints, GridLines, PointConfig, PointType};
pub use geometry::{CropRectangle, FrameRect, NormalizedRect, Point, Size, ViewTransform};
pub use gesture::{GestureState, PanEvent, PinchEvent, TapEvent};
pub use layout::Rect;
pub use limits::{compute_limits, Limits, ScaleBounds};
pub use projector::{compute_crop_rectangle, CropProjector, CropState, CroppedImage};
pub use services::{CropDataHandler, CropPrimitive, Element, ImageSizeSource, LayoutMeasurer, PassThrough};
pub use source::FsImageSource;
pub use statements::{ImageError, ImageStatus, StateChange, Statements, StatementsPatch};
