pub mod bake;
pub mod extract;
pub mod inspect;
pub mod verify;
