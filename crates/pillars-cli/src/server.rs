use pillars_core::{Chart, ChartError, analyze, export_profile, import_chart};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Clone)]
pub struct PillarsServer {
    tool_router: ToolRouter<Self>,
}

impl Default for PillarsServer {
    fn default() -> Self {
        Self::new()
    }
}

impl PillarsServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

// --- Tool parameter types ---

#[derive(Debug, Deserialize, JsonSchema)]
struct ChartRequest {
    /// Four pillars in year, month, day, hour order, each a stem-branch pair
    /// such as "甲子" or "jia-zi". Ignored when `pillars_json` is given.
    #[serde(default)]
    pillars: Vec<String>,
    /// Full wire chart with explicit hidden stems:
    /// `[{"stem": "甲", "branch": "子", "hideHeavenStems": [{"name": "癸", "level": "main"}]}, ...]`
    pillars_json: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct RelationsRequest {
    /// Four pillars in year, month, day, hour order
    pillars: Vec<String>,
}

fn invalid(e: ChartError) -> McpError {
    McpError::invalid_params(e.to_string(), None)
}

impl ChartRequest {
    fn into_chart(self) -> Result<Chart, ChartError> {
        match self.pillars_json {
            Some(wire) => import_chart(&wire.to_string()),
            None => Chart::from_tokens(&self.pillars),
        }
    }
}

#[tool_router]
impl PillarsServer {
    #[tool(
        description = "Analyze a Four Pillars chart. Returns per-element energy scores with derivation logs, percentages and levels, the balance index, stem and branch relations, day-master strength with useful and avoid elements, and a short diagnosis."
    )]
    async fn pillars_chart(
        &self,
        Parameters(req): Parameters<ChartRequest>,
    ) -> Result<CallToolResult, McpError> {
        let chart = req.into_chart().map_err(invalid)?;
        let profile = analyze(&chart);
        let json = export_profile(&chart, &profile)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        tracing::debug!(chart = %chart, "pillars_chart");
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(
        description = "List the stem and branch relations (combinations, clashes, harms, punishments, breaks) between the four pillars, with participant pillar indices 0-3."
    )]
    async fn pillars_relations(
        &self,
        Parameters(req): Parameters<RelationsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let chart = Chart::from_tokens(&req.pillars).map_err(invalid)?;
        let (stems, branches) = pillars_core::relations(&chart);
        let result = serde_json::json!({
            "chart": chart.to_string(),
            "stemRelations": stems,
            "branchRelations": branches,
        });
        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&result).unwrap_or_default(),
        )]))
    }
}

#[tool_handler]
impl ServerHandler for PillarsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Four Pillars five-element energy analysis.\n\n\
                 - pillars_chart: full profile for four pillars (year, month, day, hour). \
                   Pass `pillars` as stem-branch strings, or `pillars_json` to supply hidden stems.\n\
                 - pillars_relations: only the stem and branch relations.\n\n\
                 Pillar indices in relation output are 0 = year, 1 = month, 2 = day, 3 = hour."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
