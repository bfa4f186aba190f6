pub mod plane;
pub mod position;
pub mod rhumb;

pub use plane::LocalFrame;
pub use position::GeoPosition;
pub use rhumb::{bearing, find_position, range_nm};
