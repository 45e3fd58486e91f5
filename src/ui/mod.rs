pub mod input;
pub mod palette;
pub mod plain;
pub mod surface;
pub mod terminal;
