//! Runtime side of the orrery: the control surface, the animation scheduler,
//! the camera state machine, and the frame driver that ties them to a
//! renderer.

pub mod animation;
pub mod camera;
pub mod control;
pub mod frame;
pub mod input;

pub use animation::{AnimationScheduler, REFERENCE_FPS};
pub use camera::{CameraRig, CameraSettings, CameraTarget};
pub use control::{ControlField, ControlLimits, ControlState, ControlSurface, ControlValue};
pub use frame::{FrameClock, FrameDriver, FrameStats, MAX_FRAME_TIME};
pub use input::{EventError, InputEvent, InputIgnored, KeyAction, KeyBindings};
