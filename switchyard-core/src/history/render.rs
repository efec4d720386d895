//! Rendering summary markers into provider-bound prompt text
//!
//! A summary marker carries a message template with named placeholders plus
//! the data to substitute: the free-text summary, an abridged middle, and an
//! ordered list of trailing exchanges rendered verbatim in an XML-like
//! structure. Substitution is literal string replacement -- never regex --
//! and a placeholder missing from the template is simply left alone.

use crate::protocol::nodes::{
    ExchangeSource, HistorySummaryNode, RequestNode, RequestNodeKind, ResponseNode,
    ResponseNodeKind,
};

/// Render-ready view of one exchange, derived transiently and never persisted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExchangeRenderCtx {
    pub user_message: String,
    pub tool_results: Vec<RenderedToolResult>,
    pub thinking: String,
    pub response_text: String,
    pub tool_uses: Vec<RenderedToolUse>,
    pub has_response: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedToolResult {
    pub id: String,
    pub content: String,
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedToolUse {
    pub name: String,
    pub id: String,
    pub input: String,
}

/// Join lines, stripping each line's trailing newlines and dropping blanks.
pub fn normalize_joined_lines<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for raw in lines {
        let line = raw.as_ref().trim_end_matches('\n');
        if line.trim().is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line);
    }
    out
}

/// The per-exchange user message prefers text drawn from text nodes and
/// falls back to the plain request-message field only when none yield text.
pub fn extract_user_message_from_request_nodes(nodes: &[RequestNode], fallback: &str) -> String {
    let joined = normalize_joined_lines(nodes.iter().filter_map(|n| match &n.kind {
        RequestNodeKind::Text { content } => Some(content.as_str()),
        _ => None,
    }));
    if joined.trim().is_empty() {
        fallback.to_string()
    } else {
        joined
    }
}

pub fn build_exchange_render_ctx(exchange: &ExchangeSource) -> ExchangeRenderCtx {
    let tool_results: Vec<RenderedToolResult> = exchange
        .request_nodes
        .iter()
        .filter_map(|n| match &n.kind {
            RequestNodeKind::ToolResult(tr) if !tr.tool_use_id.trim().is_empty() => {
                Some(RenderedToolResult {
                    id: tr.tool_use_id.clone(),
                    content: tr.content.clone(),
                    is_error: tr.is_error,
                })
            }
            _ => None,
        })
        .collect();

    let thinking = normalize_joined_lines(exchange.response_nodes.iter().filter_map(
        |n| match &n.kind {
            ResponseNodeKind::Thinking { summary } if !summary.trim().is_empty() => {
                Some(summary.as_str())
            }
            _ => None,
        },
    ));

    let response_text = normalize_joined_lines(exchange.response_nodes.iter().filter_map(
        |n| match &n.kind {
            ResponseNodeKind::RawResponse { content } if !content.trim().is_empty() => {
                Some(content.as_str())
            }
            _ => None,
        },
    ));

    let tool_uses: Vec<RenderedToolUse> = exchange
        .response_nodes
        .iter()
        .filter_map(|n| match &n.kind {
            ResponseNodeKind::ToolUse(tu)
                if !tu.tool_use_id.trim().is_empty() && !tu.tool_name.trim().is_empty() =>
            {
                Some(RenderedToolUse {
                    name: tu.tool_name.clone(),
                    id: tu.tool_use_id.clone(),
                    input: tu.input_json.clone(),
                })
            }
            _ => None,
        })
        .collect();

    let has_response = !thinking.is_empty() || !response_text.is_empty() || !tool_uses.is_empty();

    ExchangeRenderCtx {
        user_message: extract_user_message_from_request_nodes(
            &exchange.request_nodes,
            &exchange.request_message,
        ),
        tool_results,
        thinking,
        response_text,
        tool_uses,
        has_response,
    }
}

/// Render one exchange in the fixed structure the summarizer's template
/// expects. The agent block is omitted entirely when the exchange carries
/// no thinking, response text, or tool use.
pub fn render_exchange_full(ctx: &ExchangeRenderCtx) -> String {
    let mut out: Vec<String> = Vec::new();
    out.push("<exchange>".to_string());
    out.push("  <user_request_or_tool_results>".to_string());
    let user_message = ctx.user_message.trim_end_matches('\n');
    if !user_message.trim().is_empty() {
        out.push(user_message.to_string());
    }
    for tr in &ctx.tool_results {
        let id = tr.id.trim();
        if id.is_empty() {
            continue;
        }
        out.push(format!(
            "    <tool_result tool_use_id=\"{}\" is_error=\"{}\">",
            id,
            if tr.is_error { "true" } else { "false" }
        ));
        let content = tr.content.trim_end_matches('\n');
        if !content.trim().is_empty() {
            out.push(content.to_string());
        }
        out.push("    </tool_result>".to_string());
    }
    out.push("  </user_request_or_tool_results>".to_string());
    if ctx.has_response {
        out.push("  <agent_response_or_tool_uses>".to_string());
        let thinking = ctx.thinking.trim_end_matches('\n');
        if !thinking.trim().is_empty() {
            out.push("    <thinking>".to_string());
            out.push(thinking.to_string());
            out.push("    </thinking>".to_string());
        }
        let response_text = ctx.response_text.trim_end_matches('\n');
        if !response_text.trim().is_empty() {
            out.push(response_text.to_string());
        }
        for tu in &ctx.tool_uses {
            let name = tu.name.trim();
            let id = tu.id.trim();
            if name.is_empty() || id.is_empty() {
                continue;
            }
            out.push(format!(
                "    <tool_use name=\"{}\" tool_use_id=\"{}\">",
                name, id
            ));
            let input = tu.input.trim_end_matches('\n');
            if !input.trim().is_empty() {
                out.push(input.to_string());
            }
            out.push("    </tool_use>".to_string());
        }
        out.push("  </agent_response_or_tool_uses>".to_string());
    }
    out.push("</exchange>".to_string());
    out.join("\n")
}

/// Literal, non-regex placeholder substitution. Placeholders absent from
/// the template are a no-op, not an error.
pub fn replace_placeholders(template: &str, replacements: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in replacements {
        if !out.contains(key) {
            continue;
        }
        out = out.replace(key, value);
    }
    out
}

/// Render a summary marker into flat text. `extra_tool_results` are tool
/// results that rode alongside the marker; they are appended as a synthetic
/// trailing exchange so their content is not lost. Returns `None` when the
/// marker carries no usable template.
pub fn render_history_summary(
    summary: &HistorySummaryNode,
    extra_tool_results: Vec<RequestNode>,
) -> Option<String> {
    if summary.message_template.trim().is_empty() {
        return None;
    }

    let mut history_end = summary.history_end.clone();
    if !extra_tool_results.is_empty() {
        history_end.push(ExchangeSource {
            request_message: String::new(),
            response_text: String::new(),
            request_nodes: extra_tool_results,
            response_nodes: Vec::<ResponseNode>::new(),
        });
    }

    let end_part_full = history_end
        .iter()
        .map(build_exchange_render_ctx)
        .map(|ctx| render_exchange_full(&ctx))
        .collect::<Vec<_>>()
        .join("\n");
    let abridged = summary.history_middle_abridged_text.clone();

    Some(replace_placeholders(
        &summary.message_template,
        &[
            ("{summary}", summary.summary_text.clone()),
            (
                "{summarization_request_id}",
                summary.summarization_request_id.clone(),
            ),
            (
                "{beginning_part_dropped_num_exchanges}",
                summary.history_beginning_dropped_num_exchanges.to_string(),
            ),
            ("{middle_part_abridged}", abridged.clone()),
            ("{end_part_full}", end_part_full),
            ("{abridged_history}", abridged),
        ],
    ))
}
