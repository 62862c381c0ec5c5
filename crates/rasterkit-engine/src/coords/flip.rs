/// Mirroring applied when sampling a sprite or texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Hash)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Flip {
    pub const NONE: Flip = Flip { horizontal: false, vertical: false };
    pub const HORIZONTAL: Flip = Flip { horizontal: true, vertical: false };
    pub const VERTICAL: Flip = Flip { horizontal: false, vertical: true };
    pub const BOTH: Flip = Flip { horizontal: true, vertical: true };
}
