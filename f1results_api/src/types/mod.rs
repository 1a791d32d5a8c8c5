mod race_link;
pub use self::race_link::RaceLink;

mod race_result;
pub use self::race_result::RaceResult;
