pub mod detail;
pub mod new_and_now;

pub use detail::Detail;
pub use new_and_now::NewAndNow;
