/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// One mebibyte
pub const MIB: usize = 1024 * 1024;

/// Default upload cap (20 MiB)
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 20 * MIB;

/// Extra body allowance on top of the upload cap for multipart framing
pub const MULTIPART_OVERHEAD: usize = MIB;

/// Number of leading bytes inspected when sniffing a MIME type
pub const SNIFF_LEN: usize = 512;
