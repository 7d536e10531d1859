//! Label sheets.
//!
//! # Data Flow
//! ```text
//! label type name ──▶ catalog.rs (geometry, layouts)
//!                         │
//! ID file / range ──▶ ids.rs ──▶ sheet.rs (cells, layout)
//!                                   → labels.txt + print command
//!                                   → LabelPdfRequest ──▶ client ──▶ labels.pdf
//! ```

pub mod catalog;
pub mod ids;
pub mod sheet;

pub use catalog::{find_label_type, LabelType, LABEL_TYPES};
pub use ids::{expand_id_range, format_id, parse_id_list, read_id_file, validate_id_format};
pub use sheet::{LabelSheet, LABEL_LIST_NAME, LABEL_PDF_NAME, PRINT_TOOL};
