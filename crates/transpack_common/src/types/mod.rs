pub mod module_id;
pub mod output_asset;
pub mod raw_idx;
pub mod source_span;
