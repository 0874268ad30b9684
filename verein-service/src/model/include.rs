//! Relation inclusion flags

/// Which associations a caller wants loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClubInclude {
    pub with_stadium: bool,
    pub with_players: bool,
}

impl ClubInclude {
    /// Scalar attributes only
    pub const NONE: Self = Self {
        with_stadium: false,
        with_players: false,
    };

    /// Default for single-club reads
    pub const STADIUM: Self = Self {
        with_stadium: true,
        with_players: false,
    };

    pub const ALL: Self = Self {
        with_stadium: true,
        with_players: true,
    };

    /// Resolve into the descriptor handed to the store
    pub const fn resolve(self) -> Relations {
        match (self.with_stadium, self.with_players) {
            (false, false) => Relations::None,
            (true, false) => Relations::Stadium,
            (false, true) => Relations::Players,
            (true, true) => Relations::StadiumAndPlayers,
        }
    }
}

/// Fixed relation set loaded by a store call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relations {
    None,
    Stadium,
    Players,
    StadiumAndPlayers,
}

impl Relations {
    pub const fn stadium(self) -> bool {
        matches!(self, Self::Stadium | Self::StadiumAndPlayers)
    }

    pub const fn players(self) -> bool {
        matches!(self, Self::Players | Self::StadiumAndPlayers)
    }
}
