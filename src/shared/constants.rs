/// Header carrying the anonymous viewer id (a UUID chosen by the client)
pub const VIEWER_ID_HEADER: &str = "x-viewer-id";

/// SSE event name for full post lists
pub const POSTS_EVENT: &str = "posts";

/// SSE event name for marker diffs
pub const MARKERS_EVENT: &str = "markers";

/// Seconds between SSE keep-alive comments
pub const SSE_KEEP_ALIVE_SECS: u64 = 15;
