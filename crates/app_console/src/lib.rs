mod console;
mod input;

pub use console::Console;
