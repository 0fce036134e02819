pub mod assignment;
pub mod attendance;
pub mod budget;
pub mod work;
pub mod worker;
