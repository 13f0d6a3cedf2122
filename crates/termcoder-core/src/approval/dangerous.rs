//! Dangerous command interceptor
//!
//! Screens shell commands against a fixed table of catastrophic patterns
//! before they reach the permission gate or the shell. A match blocks the
//! command in every permission mode, yolo included.
//!
//! This is NOT a security boundary. The patterns are trivially bypassed with
//! variable expansion, quoting tricks, base64-encoded payloads or a script
//! file. The table only exists to catch typos, copy-paste accidents and
//! hallucinated commands such as `rm -rf /`.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// A single entry of the pattern table
#[derive(Debug, Clone, Copy)]
pub struct DangerousPattern {
    /// Regular expression, matched case-insensitively anywhere in the command
    pub pattern: &'static str,
    /// Explanation shown to the model and the user when the pattern matches
    pub explanation: &'static str,
}

/// The pattern table, in match order
pub const DANGEROUS_PATTERNS: &[DangerousPattern] = &[
    // System destruction
    DangerousPattern {
        pattern: r"rm\s+(-[a-zA-Z]*)*\s*-rf\s+/",
        explanation: "Recursively deletes the entire filesystem starting from root - would destroy the operating system and all data",
    },
    DangerousPattern {
        pattern: r"rm\s+(-[a-zA-Z]*)*\s*-rf\s+/\*",
        explanation: "Deletes everything in the root directory - equivalent to wiping the entire system",
    },
    DangerousPattern {
        pattern: r"rm\s+(-[a-zA-Z]*)*\s*-rf\s+~",
        explanation: "Recursively deletes your entire home folder - all your personal files, configs, and data",
    },
    DangerousPattern {
        pattern: r"mkfs\.",
        explanation: "Formats a filesystem - would erase all data on the target disk/partition",
    },
    DangerousPattern {
        pattern: r"dd\s+.*if=/dev/(zero|random|urandom).*of=/dev/[a-z]",
        explanation: "Overwrites an entire disk with zeros/random data - complete data destruction",
    },
    DangerousPattern {
        pattern: r">\s*/dev/[a-z]d[a-z]",
        explanation: "Redirects output to overwrite a raw disk device - destroys all data",
    },
    DangerousPattern {
        pattern: r"shred\s+.*(/dev/[a-z]|/boot|/etc|/usr|/var)",
        explanation: "Securely wipes system-critical locations - unrecoverable destruction",
    },
    // Fork bomb
    DangerousPattern {
        pattern: r":\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:",
        explanation: "Fork bomb - spawns infinite processes until the system crashes from resource exhaustion",
    },
    // Permission disasters
    DangerousPattern {
        pattern: r"chmod\s+(-[a-zA-Z]*\s+)*777\s+/",
        explanation: "Makes the entire filesystem world-readable/writable - catastrophic security vulnerability",
    },
    DangerousPattern {
        pattern: r"chmod\s+(-[a-zA-Z]*\s+)*000\s+/",
        explanation: "Removes all permissions from the entire filesystem - system becomes unusable",
    },
    DangerousPattern {
        pattern: r"chmod\s+.*-R\s+.*\s+/\s*$",
        explanation: "Recursively changes permissions on root filesystem - can break the entire system",
    },
    DangerousPattern {
        pattern: r"chown\s+.*-R\s+.*\s+/\s*$",
        explanation: "Recursively changes ownership of root filesystem - can break the entire system",
    },
    // System control
    DangerousPattern {
        pattern: r"\bshutdown\b",
        explanation: "Shuts down the computer",
    },
    DangerousPattern {
        pattern: r"\breboot\b",
        explanation: "Reboots the computer",
    },
    DangerousPattern {
        pattern: r"\bpoweroff\b",
        explanation: "Powers off the computer",
    },
    DangerousPattern {
        pattern: r"\bhalt\b",
        explanation: "Halts the system",
    },
    DangerousPattern {
        pattern: r"\binit\s+[06]\b",
        explanation: "Changes system runlevel to shutdown (0) or reboot (6)",
    },
    DangerousPattern {
        pattern: r"kill\s+-9\s+-1",
        explanation: "Sends SIGKILL to ALL processes - crashes the entire system immediately",
    },
    // Security-critical files
    DangerousPattern {
        pattern: r">\s*/etc/passwd",
        explanation: "Overwrites the user database - locks everyone out of the system",
    },
    DangerousPattern {
        pattern: r">\s*/etc/shadow",
        explanation: "Overwrites the password database - breaks all authentication",
    },
    DangerousPattern {
        pattern: r"rm\s+.*(/etc/passwd|/etc/shadow|/etc/sudoers)",
        explanation: "Deletes critical authentication files - breaks system security",
    },
    // Network/firewall
    DangerousPattern {
        pattern: r"iptables\s+-F",
        explanation: "Flushes all firewall rules - removes network security protections",
    },
    DangerousPattern {
        pattern: r"ufw\s+disable",
        explanation: "Disables the firewall entirely - exposes system to network attacks",
    },
];

static COMPILED: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    DANGEROUS_PATTERNS
        .iter()
        .filter_map(|entry| {
            match RegexBuilder::new(entry.pattern).case_insensitive(true).build() {
                Ok(re) => Some((re, entry.explanation)),
                Err(e) => {
                    tracing::error!(pattern = entry.pattern, "Invalid dangerous pattern: {}", e);
                    None
                }
            }
        })
        .collect()
});

/// Outcome of screening a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DangerCheck {
    Safe,
    Dangerous { explanation: &'static str },
}

impl DangerCheck {
    pub fn is_dangerous(&self) -> bool {
        matches!(self, DangerCheck::Dangerous { .. })
    }
}

/// Stateless matcher over [`DANGEROUS_PATTERNS`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DangerousCommandInterceptor;

impl DangerousCommandInterceptor {
    pub fn new() -> Self {
        Self
    }

    /// Screen a command; the first matching pattern wins
    pub fn check(&self, command: &str) -> DangerCheck {
        COMPILED
            .iter()
            .find(|(re, _)| re.is_match(command))
            .map(|(_, explanation)| DangerCheck::Dangerous { explanation })
            .unwrap_or(DangerCheck::Safe)
    }
}
