// Per-domain accessors
//
// Thin handles borrowed from a `Controller`. Each one builds a path, awaits
// a single dispatcher call (or a joined pair), and unwraps the named key the
// payload is nested under.

pub mod api;
pub mod diagnostics;
pub mod machine;
pub mod parsers;
pub mod programs;
pub mod provisioning;
pub mod restrictions;
pub mod stats;
pub mod watering;
pub mod zones;

pub use api::Api;
pub use diagnostics::Diagnostics;
pub use machine::Machine;
pub use parsers::Parsers;
pub use programs::Programs;
pub use provisioning::Provisioning;
pub use restrictions::Restrictions;
pub use stats::Stats;
pub use watering::Watering;
pub use zones::Zones;

use chrono::NaiveDate;

/// Days covered by log/history queries when the caller does not say.
pub const DEFAULT_HISTORY_DAYS: u32 = 2;

/// `YYYY-MM-DD`, defaulting to today in local time.
pub(crate) fn date_segment(date: Option<NaiveDate>) -> String {
    date.unwrap_or_else(|| chrono::Local::now().date_naive())
        .format("%Y-%m-%d")
        .to_string()
}
