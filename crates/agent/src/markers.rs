//! Tool markers in model output.
//!
//! The model asks for a tool by writing `[TOOL: <name> <argument>]` anywhere
//! in its reply. The name is a word token; the argument is everything up to
//! the closing bracket, trimmed, and may be empty. Anything that does not fit
//! this grammar is prose and is left alone.

use labassist_core::tool::ToolRequest;
use regex_lite::Regex;
use std::sync::LazyLock;

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[TOOL:\s*(\w+)(?:\s+([^\]]*))?\]").expect("marker pattern is valid")
});

/// Every well-formed marker in `text`, left to right. Duplicates are kept.
pub fn extract_tool_requests(text: &str) -> Vec<ToolRequest> {
    MARKER_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str();
            let argument = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
            Some(ToolRequest::new(name, argument))
        })
        .collect()
}

/// The literal marker the model should emit for a tool.
pub fn marker_syntax(name: &str, placeholder: &str) -> String {
    if placeholder.is_empty() {
        format!("[TOOL: {name}]")
    } else {
        format!("[TOOL: {name} {placeholder}]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_marker_with_argument() {
        let requests = extract_tool_requests("[TOOL: ping 192.168.1.10]");
        assert_eq!(requests, vec![ToolRequest::new("ping", "192.168.1.10")]);
    }

    #[test]
    fn argument_is_optional() {
        let requests = extract_tool_requests("Let me look. [TOOL: check_server]");
        assert_eq!(requests, vec![ToolRequest::new("check_server", "")]);

        let spaced = extract_tool_requests("[TOOL: check_server   ]");
        assert_eq!(spaced, vec![ToolRequest::new("check_server", "")]);
    }

    #[test]
    fn multiple_markers_in_order_with_duplicates() {
        let text = "First [TOOL: ping nas.lan]\nthen [TOOL: check_server]\nand again [TOOL: ping nas.lan]";
        let requests = extract_tool_requests(text);
        assert_eq!(
            requests,
            vec![
                ToolRequest::new("ping", "nas.lan"),
                ToolRequest::new("check_server", ""),
                ToolRequest::new("ping", "nas.lan"),
            ]
        );
    }

    #[test]
    fn malformed_markers_are_prose() {
        assert!(extract_tool_requests("[TOOL: ]").is_empty());
        assert!(extract_tool_requests("[TOOL ping 10.0.0.1]").is_empty());
        assert!(extract_tool_requests("TOOL: ping 10.0.0.1").is_empty());
        assert!(extract_tool_requests("[tool: ping 10.0.0.1]").is_empty());
        assert!(extract_tool_requests("[TOOL: ping 10.0.0.1").is_empty());
        assert!(extract_tool_requests("no tools needed, the IP is 192.168.1.10").is_empty());
    }

    #[test]
    fn unknown_names_still_extracted() {
        let requests = extract_tool_requests("[TOOL: reboot now]");
        assert_eq!(requests, vec![ToolRequest::new("reboot", "now")]);
    }

    #[test]
    fn argument_is_kept_raw_for_validation() {
        let requests = extract_tool_requests("[TOOL: ping 10.0.0.1; rm -rf /]");
        assert_eq!(requests[0].argument, "10.0.0.1; rm -rf /");
    }

    #[test]
    fn syntax_rendering() {
        assert_eq!(marker_syntax("ping", "<host or IP>"), "[TOOL: ping <host or IP>]");
        assert_eq!(marker_syntax("check_server", ""), "[TOOL: check_server]");
    }
}
