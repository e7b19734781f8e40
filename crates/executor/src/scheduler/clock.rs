//! Wall-clock alignment helpers. All boundaries are whole minutes in UTC.

use chrono::{DateTime, SubsecRound, TimeDelta, Timelike, Utc};

pub fn truncate_to_second(t: DateTime<Utc>) -> DateTime<Utc> {
    t.trunc_subsecs(0)
}

pub fn truncate_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    truncate_to_second(t) - TimeDelta::seconds(t.second() as i64)
}

/// `t` itself when it already sits on a minute boundary, else the next one.
pub fn ceil_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    let floor = truncate_to_minute(t);
    if floor == t {
        floor
    } else {
        floor + TimeDelta::minutes(1)
    }
}

pub fn is_minute_boundary(t: DateTime<Utc>) -> bool {
    truncate_to_second(t).second() == 0
}
