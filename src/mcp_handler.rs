use anyhow::Result;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::transport::stdio;
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use serde::{Deserialize, Serialize};

use crate::document_parser::{process_file, MediaType, Outcome};
use crate::result_view::{render, Locale};

/// Document statistics server that implements the MCP tool interface
#[derive(Clone)]
pub struct OfficeStats {
    locale: Locale,
    tool_router: ToolRouter<OfficeStats>,
}

/// Input for the get_document_stats tool
#[derive(Serialize, Deserialize, Debug, Default, schemars::JsonSchema)]
pub struct DocumentStatsInput {
    #[schemars(description = "Path to the document file")]
    pub file_path: Option<String>,
    #[schemars(
        description = "Declared media type of the file. Derived from the file extension when omitted"
    )]
    pub media_type: Option<String>,
}

/// Build the tool result contents for an outcome
pub fn outcome_contents(outcome: &Outcome, locale: Locale) -> Vec<Content> {
    let mut contents = vec![Content::text(render(outcome, locale))];

    if let Some(stats) = outcome.stats() {
        let stats_json = serde_json::to_string_pretty(stats)
            .unwrap_or_else(|_| "Error serializing statistics".to_string());
        contents.push(Content::text(format!("```json\n{}\n```", stats_json)));
    }

    contents
}

/// One line per supported format: extension and declared media type
pub fn supported_formats_listing() -> String {
    MediaType::ALL
        .iter()
        .map(|media_type| format!(".{}\t{}", media_type.extension(), media_type.mime()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[tool_router]
impl OfficeStats {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            tool_router: Self::tool_router(),
        }
    }

    /// Count pages, characters, words and images of a document
    #[tool(
        description = "Count pages, characters, words and images in a PDF, DOCX, XLSX or PPTX document"
    )]
    pub async fn get_document_stats(
        &self,
        Parameters(input): Parameters<DocumentStatsInput>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = process_file(input.file_path.as_deref(), input.media_type.as_deref()).await;
        let contents = outcome_contents(&outcome, self.locale);

        match outcome {
            Outcome::Stats(_) => Ok(CallToolResult::success(contents)),
            _ => Ok(CallToolResult::error(contents)),
        }
    }

    #[tool(description = "List the document formats and media types accepted by get_document_stats")]
    pub async fn list_supported_formats(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(
            supported_formats_listing(),
        )]))
    }
}

#[tool_handler]
impl ServerHandler for OfficeStats {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "This server counts pages, characters, words and images in office documents (PDF, DOCX, XLSX, PPTX).".to_string()
            ),
        }
    }
}

/// Set up the MCP server with our tools
pub async fn start_server(locale: Locale) -> Result<()> {
    let office_stats = OfficeStats::new(locale);

    // Serve the handler over stdin/stdout
    let server = office_stats.serve(stdio()).await?;

    let quit_reason = server.waiting().await?;
    log::info!("Server stopped: {:?}", quit_reason);

    Ok(())
}
