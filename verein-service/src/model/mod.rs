//! Domain model
//!
//! [`Club`] is the persisted aggregate, [`ClubInput`] the raw write payload
//! shared by REST and GraphQL, and [`ClubInclude`] selects which relations a
//! read loads.

mod club;
mod include;
mod input;

pub use club::{
    Club, ClubCategory, ClubFields, ClubId, Keyword, NewClub, NewPlayer, Player, PreferredFoot,
    Stadium, UnknownLiteral,
};
pub use include::{ClubInclude, Relations};
pub use input::{ClubInput, PlayerInput, StadiumInput, MAX_CAPACITY, MIN_PLAYER_AGE};
