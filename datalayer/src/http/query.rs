/// 解析查询字符串为有序键值对 / Parse a query string into ordered pairs
///
/// `+` 视为空格，无法解码的片段原样保留；空键被忽略
/// `+` is a space, undecodable parts are kept verbatim, empty keys are dropped
pub fn parse_query_pairs(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let (k, v) = part.split_once('=').unwrap_or((part, ""));
            let key = decode(k);
            if key.is_empty() {
                return None;
            }
            Some((key, decode(v)))
        })
        .collect()
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_pairs() {
        let pairs = parse_query_pairs("?name=ann+lee&age=10..20&id%5B%5D=1&id%5B%5D=2&&=x&flag");
        assert_eq!(
            pairs,
            vec![
                ("name".to_string(), "ann lee".to_string()),
                ("age".to_string(), "10..20".to_string()),
                ("id[]".to_string(), "1".to_string()),
                ("id[]".to_string(), "2".to_string()),
                ("flag".to_string(), "".to_string()),
            ]
        );
    }

    #[test]
    fn test_percent_decoding() {
        let pairs = parse_query_pairs("name=%25jo%25&sort=-created_at");
        assert_eq!(pairs[0].1, "%jo%");
        assert_eq!(pairs[1].1, "-created_at");
    }
}
