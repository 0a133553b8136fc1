//! Colored output helpers for the CLI.

use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the S.A.G.E banner
    pub fn banner(&self) {
        if self.colored {
            println!(
                r#"
   {}
   {}
   {}
   {}
"#,
                " ____    _    ____ _____ ".bright_cyan().bold(),
                "/ ___|  / \\  / ___| ____|".bright_cyan().bold(),
                "\\___ \\ / _ \\| |  _|  _|  ".cyan().bold(),
                "|____/_/   \\_\\____|_____|".blue().bold(),
            );
            println!(
                "   {} {}\n",
                "Sourced Answer Generation Engine".bright_white().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
        } else {
            println!(
                r#"
 ____    _    ____ _____
/ ___|  / \  / ___| ____|
\___ \ / _ \| |  _|  _|
|____/_/   \_\____|_____|
"#
            );
            println!(
                "   Sourced Answer Generation Engine v{}\n",
                env!("CARGO_PKG_VERSION")
            );
        }
    }

    /// Print a progress step
    pub fn step(&self, message: &str) {
        if self.colored {
            println!("{} {}", "==>".bright_blue().bold(), message.bold());
        } else {
            println!("==> {}", message);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("{} {}", "✓".bright_green().bold(), message);
        } else {
            println!("[ok] {}", message);
        }
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        if self.colored {
            println!("{} {}", "!".bright_yellow().bold(), message);
        } else {
            println!("[warn] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("{} {}", "✗".bright_red().bold(), message);
        } else {
            eprintln!("[error] {}", message);
        }
    }

    /// Print an indented key/value detail line
    pub fn detail(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {} {}", format!("{}:", key).dimmed(), value);
        } else {
            println!("    {}: {}", key, value);
        }
    }
}
