/// CSV export of the per-step info record.
pub mod export;
