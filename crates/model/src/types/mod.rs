mod timestamp;
pub use timestamp::*;

mod units;
pub use units::*;

mod uuid;
pub use uuid::*;
