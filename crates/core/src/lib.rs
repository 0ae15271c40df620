#![forbid(unsafe_code)]

pub mod model;
pub mod time;
pub mod tracker;
pub mod validation;

pub use time::Clock;
pub use tracker::{Advance, LessonState, TrackerError};
pub use validation::{CodeCheck, CodeValidationTable, InputRule, QuizScore};
