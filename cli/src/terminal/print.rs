use colored::*;

pub const TOTAL_WIDTH: usize = 64;

pub fn header(msg: &str, quiet: u8) {
    if quiet > 0 {
        return;
    }

    let formatted = format!("⟦ {} ⟧", msg);
    let dash_count = TOTAL_WIDTH.saturating_sub(formatted.chars().count());
    let left = dash_count / 2;
    let right = dash_count - left;

    println!(
        "{}{}{}",
        "─".repeat(left).bright_black(),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right).bright_black()
    );
}

pub fn status_line(msg: &str) {
    println!("{} {}", ">".bright_black(), msg);
}

pub fn tree_head(idx: usize, name: &str) {
    println!(
        "{} {}",
        format!("[{idx}]").bright_black(),
        name.bright_green()
    );
}

pub fn tree(details: Vec<(String, ColoredString)>) {
    let key_width = details.iter().map(|(key, _)| key.len()).max().unwrap_or(0);

    for (i, (key, value)) in details.iter().enumerate() {
        let branch = if i + 1 == details.len() {
            "└─"
        } else {
            "├─"
        };
        println!(
            " {} {}{}{} {}",
            branch.bright_black(),
            key,
            ".".repeat(key_width.saturating_sub(key.len()) + 1).bright_black(),
            ":".bright_black(),
            value
        );
    }
}
