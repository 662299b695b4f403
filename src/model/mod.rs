pub mod card;
pub mod mapping;
