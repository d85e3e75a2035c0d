mod file;

pub use file::{FilePatch, FileRecord, FileRow, Shareability};
