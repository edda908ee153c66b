//! Time-prefixed GUIDs for uuid keys.
//!
//! The low bytes of a random v4 uuid are overwritten with the local date and
//! time so that keys generated close together sort close together on
//! SQL Server. This is only an ordering aid; uniqueness comes from the
//! remaining random bytes.

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};
use uuid::Uuid;

/// A new sequential GUID stamped with the current local time.
pub fn sequential_guid() -> Uuid {
    sequential_guid_at(Uuid::new_v4(), Local::now())
}

/// Stamps `random` with the given time.
pub fn sequential_guid_at<Tz: TimeZone>(random: Uuid, now: DateTime<Tz>) -> Uuid {
    let mut bytes = random.to_bytes_le();
    bytes[3] = now.year() as u8;
    bytes[2] = now.month() as u8;
    bytes[1] = now.day() as u8;
    bytes[0] = now.hour() as u8;
    bytes[5] = now.minute() as u8;
    bytes[4] = now.second() as u8;
    Uuid::from_bytes_le(bytes)
}
