mod guest_password;
mod korean_time;

pub use guest_password::{hash_guest_password, verify_guest_password};
pub use korean_time::{format_event_date, format_order_date, kst};
