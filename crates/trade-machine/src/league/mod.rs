// League data: player records, fantasy rosters, injury report.

pub mod injuries;
pub mod roster;
pub mod store;
