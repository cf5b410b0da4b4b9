pub mod derived;
pub mod hourly;
pub mod location;
pub mod meta;
