//! The `boards` command: detection result plus compiled-in backends

use pinwire_core::detect;

use crate::boards;

pub fn run_boards() {
    match detect::detect_board() {
        Ok(model) => println!("Detected board: {model}"),
        Err(e) => println!("Detected board: none ({e})"),
    }

    println!();
    println!("Backends in this build:");
    for info in boards::available_boards() {
        let name = info.name;
        let description = info.description;
        println!("  {name:8} - {description}");
    }
}
