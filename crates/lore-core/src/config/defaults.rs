// Single source of truth for all default values.

// --- Search ---
pub const DEFAULT_EXACT_SCOPE: bool = true;
pub const DEFAULT_APPLY_SCOPE: bool = true;
pub const DEFAULT_MAX_KNOWLEDGE_MATCHES: usize = 50;
pub const DEFAULT_MAX_MESSAGE_MATCHES: usize = 25;
pub const DEFAULT_TRANSLATION_CACHE_CAPACITY: u64 = 256;

// --- Answer ---
pub const DEFAULT_MAX_CHARS_IN_BUDGET: usize = 16_384;
pub const DEFAULT_FAST_STOP: bool = true;
pub const DEFAULT_FALLBACK: bool = true;
pub const DEFAULT_INCLUDE_MESSAGES: bool = true;
pub const DEFAULT_CHUNKING: bool = true;
pub const DEFAULT_MAX_CHUNKS: usize = 8;
pub const DEFAULT_RAG_THRESHOLD: f32 = 0.25;

// --- Data frames ---
pub const DEFAULT_FRAME_READ_POOL_SIZE: usize = 4;
pub const DEFAULT_CURSOR_PAGE_SIZE: usize = 256;
pub const DEFAULT_FRAME_BUSY_TIMEOUT_MS: u32 = 5_000;

// --- Ingestion ---
pub const DEFAULT_INGEST_BATCH_SIZE: usize = 8;
pub const DEFAULT_INGEST_CONCURRENCY: usize = 4;
pub const DEFAULT_EXTRACTOR: &str = "default";

// --- Observability ---
pub const DEFAULT_LOG_FILTER: &str = "lore=info";
pub const DEFAULT_JSON_LOGS: bool = false;
