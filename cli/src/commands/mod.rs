pub mod prepare;
pub mod verify;
