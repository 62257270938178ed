mod routine;
pub use routine::*;

mod exercise;
pub use exercise::*;

mod routine_stub;
pub use routine_stub::*;

mod routine_run;
pub use routine_run::*;

mod exercise_stub;
pub use exercise_stub::*;

mod exercise_run;
pub use exercise_run::*;
