mod command;
pub mod keypad;

pub use command::{Command, HELP};
pub use keypad::{KeyPadController, NO_HIGHLIGHT};
