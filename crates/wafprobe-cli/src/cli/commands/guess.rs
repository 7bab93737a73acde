//! `wafprobe guess <bytes>` – match a size against common limits.

use wafprobe_core::report;

use crate::cli::console::group_thousands;

pub fn run_guess(size: u64) {
    let guess = report::guess_limit(size);
    println!("{} bytes: {}", group_thousands(size), guess.label);
}
