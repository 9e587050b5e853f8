pub const DEFAULT_PER_PAGE: u64 = 50;
pub const MAX_PER_PAGE: u64 = 500;
/// 页码上限：任何 per_page 下偏移量都不超过 `i64::MAX`
/// Page cap: keeps the offset within `i64::MAX` for any allowed per_page
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PER_PAGE;

/// `Link` 头（first/last/next/prev）/ `Link` header with first/last/next/prev
///
/// 已知总数且已在末页时不输出 next / `next` is omitted on the last known page
pub fn build_link_header(base_url: &str, page: u64, per_page: u64, total: Option<u64>) -> String {
    let mut links: Vec<String> = Vec::new();
    let page = page.max(1);
    let last = total.map(|t| {
        if per_page == 0 {
            1
        } else {
            t.div_ceil(per_page).max(1)
        }
    });

    links.push(format!("<{}?page=1&per_page={}>; rel=\"first\"", base_url, per_page));
    if let Some(l) = last {
        links.push(format!("<{}?page={}&per_page={}>; rel=\"last\"", base_url, l, per_page));
    }
    if last.map_or(true, |l| page < l) {
        links.push(format!(
            "<{}?page={}&per_page={}>; rel=\"next\"",
            base_url,
            page.saturating_add(1),
            per_page
        ));
    }
    if page > 1 {
        links.push(format!(
            "<{}?page={}&per_page={}>; rel=\"prev\"",
            base_url,
            page - 1,
            per_page
        ));
    }
    links.join(", ")
}

/// 从查询参数中读取分页（默认第 1 页、每页 50，上限 500；页码不超过 `MAX_PAGE`）
/// Read `page`/`per_page` from query pairs (defaults 1 and 50, capped at 500; page capped at `MAX_PAGE`)
pub fn page_params(pairs: &[(String, String)]) -> (u64, u64) {
    let lookup = |name: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == name)
            .and_then(|(_, v)| v.trim().parse::<u64>().ok())
    };
    let page = lookup("page").filter(|p| *p > 0).unwrap_or(1).min(MAX_PAGE);
    let per_page = lookup("per_page")
        .filter(|p| *p > 0)
        .unwrap_or(DEFAULT_PER_PAGE)
        .min(MAX_PER_PAGE);
    (page, per_page)
}
