pub mod classify;
pub mod config;
pub mod dates;
pub mod fetch;
pub mod filter;
pub mod graph;
pub mod links;
pub mod parser;
pub mod payload;
pub mod query;
pub mod record;
pub mod table;
#[cfg(any(test, feature = "test-support"))]
pub mod test_helpers;

pub use classify::{Classifier, Palette, RowCategory, classify};
pub use config::Config;
pub use fetch::{FetchError, FetchReport, Fetcher, Source, SourceFailure};
pub use filter::{Interval, RowFilter, passes_date, passes_date_tree, passes_numeric};
pub use graph::WorkIndex;
pub use links::extract_id;
pub use parser::{ParseError, load_payload, parse_payload};
pub use payload::{ItemId, Link, Payload, RawItem};
pub use query::{process_payload, select_roots};
pub use record::{NormalizedRecord, map_item};
pub use table::Table;
