//! Output sinks for harvested records.
//!
//! Every crawl writes the full accumulated record list; sinks are snapshots,
//! not appenders. The JSON sink is the durable one (written after each
//! article, atomically), the CSV sink is a flat export written at the end.
//!
//! ## Sinks
//!
//! | Module    | Format | Written                         |
//! |-----------|--------|---------------------------------|
//! | [`json`]  | Pretty-printed JSON array | After every successful article |
//! | [`csv`]   | Spreadsheet-friendly CSV  | Once the crawl finishes        |

pub mod csv;
pub mod json;
