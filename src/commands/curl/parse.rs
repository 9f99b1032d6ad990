/// Option parsing for curl command
///
/// Only tokens before the URL are options. An option's value is read from
/// the same token after its first space (`"-X POST"`), so `-X`, `-d` and
/// `-H` given as separate whitespace-split tokens carry no value.

use super::types::CurlRequest;

pub const USAGE: &str = "Usage: curl [options] <url>";
pub const MISSING_URL: &str = "curl: missing URL";

/// Everything after the first space inside an option token.
fn inline_value(option: &str) -> Option<&str> {
    option.split_once(' ').map(|(_, value)| value).filter(|v| !v.is_empty())
}

fn parse_header_str(header: &str) -> Option<(String, String)> {
    let (name, value) = header.split_once(':')?;
    let (name, value) = (name.trim(), value.trim());
    if name.is_empty() || value.is_empty() {
        return None;
    }
    Some((name.to_string(), value.to_string()))
}

/// Parse curl command-line arguments
pub fn parse_request(args: &[String]) -> Result<CurlRequest, String> {
    if args.is_empty() {
        return Err(USAGE.to_string());
    }
    let url_index = args.iter().position(|arg| !arg.starts_with('-')).ok_or_else(|| MISSING_URL.to_string())?;
    let options = &args[..url_index];

    let method = options
        .iter()
        .find(|opt| opt.starts_with("-X"))
        .and_then(|opt| opt.split(' ').nth(1))
        .filter(|m| !m.is_empty())
        .unwrap_or("GET")
        .to_string();
    let data = options.iter().find(|opt| opt.starts_with("-d")).and_then(|opt| inline_value(opt));
    let headers = options
        .iter()
        .filter(|opt| opt.starts_with("-H"))
        .filter_map(|opt| inline_value(opt))
        .filter_map(parse_header_str)
        .collect();

    Ok(CurlRequest {
        url: args[url_index].clone(),
        body: if method == "POST" { data.map(str::to_string) } else { None },
        method,
        headers,
        include_headers: options.iter().any(|opt| opt == "-i"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_url_only() {
        let request = parse_request(&args(&["https://example.com"])).unwrap();
        assert_eq!(request.url, "https://example.com");
        assert_eq!(request.method, "GET");
        assert!(request.body.is_none());
        assert!(!request.include_headers);
    }

    #[test]
    fn test_usage_and_missing_url() {
        assert_eq!(parse_request(&[]).unwrap_err(), USAGE);
        assert_eq!(parse_request(&args(&["-i"])).unwrap_err(), MISSING_URL);
    }

    #[test]
    fn test_inline_option_values() {
        let request = parse_request(&args(&[
            "-X POST",
            "-d a=1 b=2",
            "-H Content-Type: text/plain",
            "-H Broken",
            "-i",
            "https://example.com/post",
        ]))
        .unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.body.as_deref(), Some("a=1 b=2"));
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.headers.get("Content-Type").map(String::as_str), Some("text/plain"));
        assert!(request.include_headers);
    }

    #[test]
    fn test_body_only_for_post() {
        let request = parse_request(&args(&["-X PUT", "-d x", "https://example.com"])).unwrap();
        assert_eq!(request.method, "PUT");
        assert!(request.body.is_none());
    }

    #[test]
    fn test_split_tokens_carry_no_value() {
        // "-X" and "POST" as separate tokens: POST becomes the URL
        let request = parse_request(&args(&["-X", "POST", "https://example.com"])).unwrap();
        assert_eq!(request.url, "POST");
        assert_eq!(request.method, "GET");
    }

    #[test]
    fn test_options_after_url_are_ignored() {
        let request = parse_request(&args(&["https://example.com", "-i"])).unwrap();
        assert!(!request.include_headers);
    }
}
