pub mod constants;
pub mod mime_sniff;
pub mod sanitize;
#[cfg(test)]
pub mod test_helpers;
pub mod types;
