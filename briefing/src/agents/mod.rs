pub mod action;
pub mod citations;
pub mod llm;
pub mod reader;
pub mod retriever;
pub mod summarizer;

// Tool names, shared by the routes, the schema listing and metric labels.
pub const SEARCH_TOOL: &str = "search_web";
pub const FETCH_TOOL: &str = "fetch_readable";
pub const SUMMARIZE_TOOL: &str = "summarize_with_citations";
pub const SAVE_TOOL: &str = "save_markdown";
