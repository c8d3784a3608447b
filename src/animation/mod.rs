pub mod interpolation;
pub mod tweening;

// Re-export commonly used types for convenience
pub use interpolation::{EasingFunction, Interpolatable};
pub use tweening::Tween;
