mod image_name;
mod image_reference;
mod scan_report;

pub use image_name::sanitize_image_name;
pub use image_reference::{ImageReference, ImageReferenceError};
pub use scan_report::{ScanReport, ScanReportError, ScanReportMeta, ScanReportResults};
