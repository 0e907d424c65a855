pub mod fixture;
pub mod noop;

pub use fixture::FixtureDelegate;
pub use noop::NoopDelegate;
