//! Rule configuration.
//!
//! The rules that differ most between Morris implementations are switches
//! here rather than hard-coded behavior. Defaults:
//!
//! | Setting         | Default                    |
//! |-----------------|----------------------------|
//! | variant         | Nine Men's Morris          |
//! | flying          | on                         |
//! | first player    | White                      |
//! | protect_mills   | on                         |
//! | multi_mill      | [`MultiMillCapture::Single`] |
//! | repeated_mill   | [`RepeatedMill::Deny`]     |
//! | draw_after      | off (no draws)             |

use std::num::NonZeroU16;

use crate::board::Side;
use crate::topology::Variant;

/// How many captures a move that closes several mills at once earns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MultiMillCapture {
    /// One capture, however many mills were closed.
    Single,
    /// One capture per closed mill.
    PerMill,
}

/// Whether re-forming the mill that earned the last capture earns another.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RepeatedMill {
    /// A side's spent mills grant nothing until replaced or broken by a capture.
    ///
    /// The memory is not limited to the next move: a spent mill that is
    /// opened and closed again any number of turns later still grants nothing.
    /// It is forgotten only when a different mill earns a capture or the
    /// opponent captures one of its pieces.
    Deny,
    /// Every formation counts.
    Allow,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rules {
    pub variant: Variant,
    /// Sides down to three pieces may move to any empty point.
    pub flying: bool,
    pub white_starts: bool,
    /// Pieces inside a formed mill cannot be captured while the owner has
    /// pieces outside mills.
    pub protect_mills: bool,
    pub multi_mill: MultiMillCapture,
    pub repeated_mill: RepeatedMill,
    /// Declare a draw after this many consecutive plies without a capture.
    pub draw_after: Option<NonZeroU16>,
}

impl Default for Rules {
    fn default() -> Self {
        Self::new(Variant::NineMen)
    }
}

impl Rules {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            flying: true,
            white_starts: true,
            protect_mills: true,
            multi_mill: MultiMillCapture::Single,
            repeated_mill: RepeatedMill::Deny,
            draw_after: None,
        }
    }

    pub fn with_flying(mut self, flying: bool) -> Self {
        self.flying = flying;
        self
    }

    pub fn with_white_starts(mut self, white_starts: bool) -> Self {
        self.white_starts = white_starts;
        self
    }

    pub fn with_protect_mills(mut self, protect: bool) -> Self {
        self.protect_mills = protect;
        self
    }

    pub fn with_multi_mill(mut self, policy: MultiMillCapture) -> Self {
        self.multi_mill = policy;
        self
    }

    pub fn with_repeated_mill(mut self, policy: RepeatedMill) -> Self {
        self.repeated_mill = policy;
        self
    }

    pub fn with_draw_after(mut self, plies: Option<NonZeroU16>) -> Self {
        self.draw_after = plies;
        self
    }

    pub fn first_player(&self) -> Side {
        if self.white_starts {
            Side::White
        } else {
            Side::Black
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let rules = Rules::default();
        assert_eq!(rules.variant, Variant::NineMen);
        assert!(rules.flying);
        assert!(rules.protect_mills);
        assert_eq!(rules.multi_mill, MultiMillCapture::Single);
        assert_eq!(rules.repeated_mill, RepeatedMill::Deny);
        assert_eq!(rules.draw_after, None);
        assert_eq!(rules.first_player(), Side::White);
    }

    #[test]
    fn test_builder() {
        let rules = Rules::new(Variant::SixMen)
            .with_white_starts(false)
            .with_draw_after(NonZeroU16::new(40));
        assert_eq!(rules.first_player(), Side::Black);
        assert_eq!(rules.draw_after.map(NonZeroU16::get), Some(40));
    }
}
