// Job intake: canonical records, normalization, ingestion, dedup, session buffers.
// Nothing in here renders output; see generation/ for covers and the summary.

pub mod dedup;
pub mod handlers;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod session;
pub mod spreadsheet;
