//! Terminal output for the listener and balance commands.
use colored::Colorize;
use solwatch_core::Address;
use solwatch_protocol::AccountNotification;

const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Render a lamport amount with its SOL equivalent.
pub fn format_lamports(lamports: u64) -> String {
    let sol = lamports / LAMPORTS_PER_SOL;
    let fraction = lamports % LAMPORTS_PER_SOL;
    if fraction == 0 {
        format!("{} lamports ({} SOL)", lamports, sol)
    } else {
        let fraction = format!("{:09}", fraction);
        format!(
            "{} lamports ({}.{} SOL)",
            lamports,
            sol,
            fraction.trim_end_matches('0')
        )
    }
}

/// Header line printed before a notification payload.
pub fn notification_header(notification: &AccountNotification) -> String {
    format!(
        "{} (connection {})",
        notification.address, notification.connection
    )
}

/// Print the balance of an account.
pub fn balance(address: &Address, lamports: u64) {
    println!("{} {}", address.to_string().bold(), format_lamports(lamports));
}

/// Print a notification header and the pretty printed payload.
pub fn notification(notification: &AccountNotification) {
    println!("{}", notification_header(notification).cyan());
    match serde_json::to_string_pretty(&notification.params) {
        Ok(params) => println!("{}", params),
        Err(_) => println!("{}", notification.params),
    }
}

/// Print a change of the watched address.
pub fn watching(address: Option<&Address>) {
    match address {
        Some(address) => println!("{} {}", "watching".dimmed(), address),
        None => println!("{}", "stopped watching".dimmed()),
    }
}

/// Print input that could not be used.
pub fn invalid(msg: impl AsRef<str>) {
    eprintln!("{} {}", "invalid:".yellow(), msg.as_ref());
}

/// Print that the listener has shut down.
pub fn closed() {
    println!("{}", "listener closed".green());
}
