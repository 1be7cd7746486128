//! ToDI gesture encoding.
//!
//! A finalized key chord is reduced to a short "core string" (`H`, `L`, `<`,
//! `>`) and looked up in the fixed ToDI inventory. Downstep rewrites the
//! top-tone marker after lookup. Unknown core strings are rejected; rejection
//! is an expected user-input condition, not a fault.

use std::fmt::{Display, Formatter};

/// The keys that are meaningful to transcription.
///
/// Every other key may still drive transport or navigation commands, but the
/// encoder never sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    High,
    Low,
    LeftBoundary,
    RightBoundary,
    Downstep,
}

/// A completed chord had no entry in the ToDI inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidGesture {
    /// The core string that failed the lookup.
    pub core: String,
}

impl Display for InvalidGesture {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "no ToDI tone for key sequence '{}'", self.core)
    }
}

impl std::error::Error for InvalidGesture {}

/// Encode a finalized chord into a ToDI label.
///
/// `roles` is the chord's role sequence in first-press order. The high and
/// low tones contribute `H`/`L` in that order (once each), a right boundary
/// appends `>`, a left boundary prepends `<`, and the result is resolved
/// against the inventory. If a downstep was held, every `H*` in the resolved
/// template becomes `!H*`.
pub fn encode(roles: &[KeyRole]) -> Result<String, InvalidGesture> {
    let mut core = String::new();
    for role in roles {
        match role {
            KeyRole::High if !core.contains('H') => core.push('H'),
            KeyRole::Low if !core.contains('L') => core.push('L'),
            _ => {}
        }
    }

    if roles.contains(&KeyRole::RightBoundary) {
        core.push('>');
    }
    if roles.contains(&KeyRole::LeftBoundary) {
        core.insert(0, '<');
    }

    let template = lookup(&core).ok_or(InvalidGesture { core })?;

    if roles.contains(&KeyRole::Downstep) {
        Ok(template.replace("H*", "!H*"))
    } else {
        Ok(template.to_string())
    }
}

/// The ToDI inventory. Only these core strings are valid; in particular the
/// combined left-boundary forms stop at `<H` and `<L`.
fn lookup(core: &str) -> Option<&'static str> {
    let template = match core {
        "LH" => "L*H",
        "HL" => "H*L",
        "HL>" => "H*L L%",
        "LH>" => "L*H H%",
        "LHL" => "L*HL",
        "HLH" => "H*LH",
        "H>" => "H%",
        "L>" => "L%",
        "<H" => "%H",
        "<L" => "%L",
        ">" => "%",
        "H" => "H*",
        "L" => "L*",
        _ => return None,
    };
    Some(template)
}
