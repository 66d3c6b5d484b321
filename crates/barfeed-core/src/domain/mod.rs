mod bar;
mod interval;
mod symbol;
mod timestamp;

pub use bar::Bar;
pub use interval::Interval;
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
