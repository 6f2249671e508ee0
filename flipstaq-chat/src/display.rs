//! Terminal Output Helpers

use console::style;

/// Prints a success line.
pub fn success(text: &str) {
    println!("{} {}", style("✓").green().bold(), text);
}

/// Prints an informational line.
pub fn info(text: &str) {
    println!("{} {}", style("·").dim(), text);
}

/// Prints a warning line.
pub fn warning(text: &str) {
    println!("{} {}", style("!").yellow().bold(), text);
}

/// Prints an inbound chat message.
pub fn message(sender: &str, content: &str) {
    println!("{} {}", style(format!("<{}>", sender)).cyan(), content);
}

/// Prints a presence change.
pub fn presence(username: &str, user_id: &str, online: bool) {
    let name = if username.is_empty() { user_id } else { username };
    let state = if online {
        style("online").green()
    } else {
        style("offline").dim()
    };
    println!("{} {} is {}", style("·").dim(), name, state);
}

/// Prints a typing notice.
pub fn typing(name: &str) {
    println!("{} {} is typing…", style("·").dim(), name);
}
