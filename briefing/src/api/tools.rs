use serde::Serialize;
use serde_json::{json, Value};

use crate::agents::{FETCH_TOOL, SAVE_TOOL, SEARCH_TOOL, SUMMARIZE_TOOL};

#[derive(Debug, Serialize)]
pub struct ToolSchema {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

pub fn handle_list_tools() -> warp::reply::Json {
    warp::reply::json(&tool_schemas())
}

pub fn tool_schemas() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: SEARCH_TOOL,
            description: "Search the web for a given query and return top results",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search query" },
                    "k": { "type": "integer", "description": "Number of results to return", "default": 5 }
                },
                "required": ["query"]
            }),
        },
        ToolSchema {
            name: FETCH_TOOL,
            description: "Fetch a URL and extract the main readable content",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": { "type": "string", "description": "URL to fetch and extract content from" }
                },
                "required": ["url"]
            }),
        },
        ToolSchema {
            name: SUMMARIZE_TOOL,
            description: "Summarize documents into exactly 5 bullet points with inline citations",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "topic": { "type": "string", "description": "Topic being summarized" },
                    "docs": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "title": { "type": "string" },
                                "url": { "type": "string" },
                                "text": { "type": "string" }
                            }
                        },
                        "description": "Documents to summarize"
                    }
                },
                "required": ["topic", "docs"]
            }),
        },
        ToolSchema {
            name: SAVE_TOOL,
            description: "Save markdown content to a file",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filename": { "type": "string", "description": "Filename for the markdown file" },
                    "content": { "type": "string", "description": "Markdown content to save" }
                },
                "required": ["filename", "content"]
            }),
        },
    ]
}
