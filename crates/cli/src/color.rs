// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use bw_core::JobState;
use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use std::io::IsTerminal;

pub mod codes {
    /// Section headers: steel blue
    pub const HEADER: u8 = 74;
    /// Commands and literals: light grey
    pub const LITERAL: u8 = 250;
    /// Secondary text: dark grey
    pub const MUTED: u8 = 240;
    pub const GOOD: u8 = 108;
    pub const BAD: u8 = 167;
    pub const WAITING: u8 = 179;
}

/// Priority: `NO_COLOR=1` disables, `COLOR=1` forces, else TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// clap help styles in the project palette.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    let fg = |code| Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))));
    Styles::styled()
        .header(fg(codes::HEADER))
        .literal(fg(codes::LITERAL))
        .placeholder(fg(codes::MUTED))
}

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

pub fn muted(text: &str) -> String {
    paint(codes::MUTED, text)
}

/// Job state label colored by outcome.
pub fn state(state: JobState) -> String {
    let code = match state {
        JobState::Pending | JobState::Processing => codes::WAITING,
        JobState::Done => codes::GOOD,
        JobState::Failed => codes::BAD,
    };
    paint(code, &state.to_string())
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
