//! Analysis over a station's observed and projected flooding days.
//!
//! Everything here is a pure function of already-loaded payloads: counting
//! observed flooding days, reshaping projection tables, finding the year of
//! inflection and deriving the numbers that feed narrative text.

pub mod narrative;
pub mod observed;
pub mod projection;
pub mod yoi;
