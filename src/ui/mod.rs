pub mod render;
pub mod slash;
pub mod terminal;

pub use self::terminal::WrenTerminal;
