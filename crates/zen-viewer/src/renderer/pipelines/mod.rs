pub mod ink;
pub mod particles;
